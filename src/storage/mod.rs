//! Storage layer for the DUPR cache
//!
//! This module provides a clean abstraction over the SQLite database,
//! organized into logical components:
//! - `models`: Data structures
//! - `schema`: Database connection, schema and transaction scopes
//! - `queries`: Lookups by external id, upserts and selections

pub mod models;
pub mod queries;
pub mod schema;


use crate::cli::types::{MatchId, PlayerId};
use crate::error::Result;

// Re-export the main types and database struct for easy access
pub use models::*;
pub use schema::DuprDatabase;

/// The local cache as the reconciler sees it: queryable by external id.
pub trait LocalStore {
    fn find_player(&self, player_id: PlayerId) -> Result<Option<Player>>;

    /// Insert or update in place; never creates a second row for an id.
    fn upsert_player(&mut self, player: &Player) -> Result<Player>;

    /// Insert a thin record only if the id is unseen. Returns true on insert.
    fn insert_thin_player(&mut self, player: &Player) -> Result<bool>;

    fn find_match(&self, match_id: MatchId) -> Result<Option<Match>>;

    fn insert_match(&mut self, record: &Match) -> Result<()>;

    fn select_players(&self, filter: PlayerFilter) -> Result<Vec<Player>>;

    fn remove_player(&mut self, player_id: PlayerId) -> Result<bool>;

    /// Run `f` as one transactional scope.
    fn in_scope<T, F>(&mut self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T>;
}

impl LocalStore for DuprDatabase {
    fn find_player(&self, player_id: PlayerId) -> Result<Option<Player>> {
        DuprDatabase::find_player(self, player_id)
    }

    fn upsert_player(&mut self, player: &Player) -> Result<Player> {
        DuprDatabase::upsert_player(self, player)
    }

    fn insert_thin_player(&mut self, player: &Player) -> Result<bool> {
        DuprDatabase::insert_thin_player(self, player)
    }

    fn find_match(&self, match_id: MatchId) -> Result<Option<Match>> {
        DuprDatabase::find_match(self, match_id)
    }

    fn insert_match(&mut self, record: &Match) -> Result<()> {
        DuprDatabase::insert_match(self, record)
    }

    fn select_players(&self, filter: PlayerFilter) -> Result<Vec<Player>> {
        DuprDatabase::select_players(self, filter)
    }

    fn remove_player(&mut self, player_id: PlayerId) -> Result<bool> {
        DuprDatabase::remove_player(self, player_id)
    }

    fn in_scope<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        DuprDatabase::in_scope(self, f)
    }
}
