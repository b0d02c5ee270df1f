//! DUPR player and match cache
//!
//! Pulls pickleball players and match histories from the DUPR API, keeps them
//! in a local SQLite cache and exports them to Excel.
//!
//! ## Features
//!
//! - **Pagination**: offset/limit walks that keep partial results on failure
//! - **Normalization**: one canonical shape for players, matches and teams
//!   whatever the endpoint returned
//! - **Reconciliation**: insert-or-merge by DUPR id, with thin records for
//!   players only seen inside a match
//! - **Rating backfill**: re-fetch players that have no doubles rating
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use duprly::{dupr::DuprClient, storage::DuprDatabase, sync::SyncContext, ClubId};
//! use duprly::dupr::{Credentials, DuprApi};
//!
//! # async fn example() -> duprly::Result<()> {
//! let mut client = DuprClient::new("https://api.dupr.gg", "v1.0")?;
//! client
//!     .authenticate(&Credentials {
//!         username: "me@example.com".to_string(),
//!         password: "secret".to_string(),
//!     })
//!     .await?;
//!
//! let mut db = DuprDatabase::new()?;
//! let report = SyncContext::new(&mut client, &mut db)
//!     .sync_club(ClubId::new(1234))
//!     .await?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! ```bash
//! export DUPR_USERNAME=me@example.com
//! export DUPR_PASSWORD=secret
//! export DUPR_CLUB_ID=1234
//! ```

pub mod cli;
pub mod commands;
pub mod core;
pub mod dupr;
pub mod error;
pub mod export;
pub mod logging;
pub mod reconcile;
pub mod storage;
pub mod sync;

// Re-export commonly used types
pub use cli::types::{ClubId, MatchId, PlayerId};
pub use error::{DuprError, Result};
