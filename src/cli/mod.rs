//! CLI argument definitions and parsing.

pub mod types;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use types::{ClubId, PlayerId};

#[derive(Debug, Parser)]
#[clap(name = "duprly", about = "Cache DUPR pickleball players and matches locally")]
pub struct Duprly {
    /// Debug-level logging (overridden by `RUST_LOG`).
    #[clap(long, short, global = true)]
    pub verbose: bool,

    /// SQLite cache file (or set `DUPR_DB_PATH`).
    #[clap(long, global = true)]
    pub db: Option<PathBuf>,

    /// Keep a stored rating when an update reports it as not rated.
    #[clap(long, global = true)]
    pub keep_known_ratings: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch all club members and their match histories into the cache.
    GetData {
        /// Club ID (or set `DUPR_CLUB_ID` env var).
        #[clap(long, short)]
        club_id: Option<ClubId>,

        /// Do not re-fetch players left without a doubles rating.
        #[clap(long)]
        skip_backfill: bool,
    },

    /// Fetch one player from DUPR unless already cached.
    AddPlayer { id: PlayerId },

    /// Show a cached player.
    GetPlayer {
        id: PlayerId,

        /// Output as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },

    /// Fetch a player and their match history from DUPR without caching.
    QueryPlayer { id: PlayerId },

    /// Remove a player from the cache. Match history is kept.
    DeletePlayer { id: PlayerId },

    /// Re-fetch every cached player that has no doubles rating.
    Backfill,

    /// Export the cache to an Excel workbook.
    WriteExcel {
        #[clap(long, short, default_value = "dupr.xlsx")]
        output: PathBuf,
    },

    /// Print row counts of the cache.
    Stats {
        /// Output as JSON instead of text lines.
        #[clap(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_get_data() {
        let cli = Duprly::parse_from(["duprly", "get-data", "--club-id", "5"]);
        match cli.command {
            Commands::GetData {
                club_id,
                skip_backfill,
            } => {
                assert_eq!(club_id, Some(ClubId::new(5)));
                assert!(!skip_backfill);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Duprly::parse_from(["duprly", "backfill", "-v", "--db", "/tmp/x.sqlite"]);
        assert!(cli.verbose);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.sqlite")));
        assert!(matches!(cli.command, Commands::Backfill));
    }

    #[test]
    fn test_player_id_argument() {
        let cli = Duprly::parse_from(["duprly", "delete-player", "42"]);
        assert!(matches!(cli.command, Commands::DeletePlayer { id } if id == PlayerId::new(42)));
        assert!(Duprly::try_parse_from(["duprly", "add-player", "abc"]).is_err());
    }

    #[test]
    fn test_write_excel_default_output() {
        let cli = Duprly::parse_from(["duprly", "write-excel"]);
        match cli.command {
            Commands::WriteExcel { output } => assert_eq!(output, PathBuf::from("dupr.xlsx")),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
