//! Command implementations for the duprly CLI

pub mod backfill;
pub mod common;
pub mod get_data;
pub mod players;
pub mod stats;
pub mod write_excel;


pub use common::CommandContext;
