//! Type-safe wrappers for DUPR identifiers.

pub mod ids;

pub use ids::{ClubId, MatchId, PlayerId};
