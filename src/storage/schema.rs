//! Database schema and connection management

use crate::core::cache::cache_base_dir;
use crate::error::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Database connection manager for the DUPR cache
pub struct DuprDatabase {
    pub(crate) conn: Connection,
}

impl DuprDatabase {
    /// Open the database at the default cache location
    pub fn new() -> Result<Self> {
        Self::open(&Self::default_path())
    }

    /// Open (or create) a database file and ensure tables exist
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        debug!(path = %db_path.display(), "opening database");
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    /// In-memory database, used by tests
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON")?;
        let mut db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Get the path to the database file
    pub fn default_path() -> PathBuf {
        cache_base_dir().join("dupr.sqlite")
    }

    /// Initialize the database schema
    pub(crate) fn initialize_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS players (
                player_id INTEGER PRIMARY KEY,
                dupr_code TEXT,
                full_name TEXT NOT NULL,
                first_name TEXT,
                last_name TEXT,
                gender TEXT,
                age INTEGER,
                email TEXT,
                phone TEXT,
                image_url TEXT,
                is_thin INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS ratings (
                player_id INTEGER PRIMARY KEY,
                singles REAL,
                singles_verified REAL,
                singles_provisional INTEGER NOT NULL DEFAULT 0,
                doubles REAL,
                doubles_verified REAL,
                doubles_provisional INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (player_id) REFERENCES players(player_id) ON DELETE CASCADE
            );

            CREATE TABLE IF NOT EXISTS matches (
                match_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                event_date TEXT NOT NULL,
                format TEXT NOT NULL,
                source TEXT,
                match_type TEXT,
                confirmed INTEGER,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS match_teams (
                team_id INTEGER PRIMARY KEY AUTOINCREMENT,
                match_id INTEGER NOT NULL,
                team_index INTEGER NOT NULL,
                game1 INTEGER,
                game2 INTEGER,
                game3 INTEGER,
                is_winner INTEGER NOT NULL,
                UNIQUE (match_id, team_index),
                FOREIGN KEY (match_id) REFERENCES matches(match_id)
            );

            -- player_id is the external id; no foreign key so a cache-removed
            -- player does not rewrite match history.
            CREATE TABLE IF NOT EXISTS match_team_players (
                team_id INTEGER NOT NULL,
                slot INTEGER NOT NULL,
                player_id INTEGER NOT NULL,
                PRIMARY KEY (team_id, slot),
                FOREIGN KEY (team_id) REFERENCES match_teams(team_id)
            );

            CREATE INDEX IF NOT EXISTS idx_ratings_doubles_null
             ON ratings(player_id) WHERE doubles IS NULL;

            CREATE INDEX IF NOT EXISTS idx_team_players_player
             ON match_team_players(player_id);",
        )?;

        Ok(())
    }

    /// Run `f` inside one transaction: committed on success, rolled back on error.
    pub fn in_scope<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK") {
                    tracing::error!(error = %rollback, "rollback failed");
                }
                Err(e)
            }
        }
    }
}
