//! Core utilities for the DUPR cache CLI
//!
//! - `cache`: token file persistence under the user cache directory
//! - `config`: environment / `.env` configuration
//! - `filters`: request bodies for the paged endpoints

pub mod cache;
pub mod config;
pub mod filters;

pub use cache::{load_token, save_token, token_path};
pub use config::Config;
pub use filters::{HistoryQuery, MembersQuery};
