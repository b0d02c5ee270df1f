//! Data models for the storage layer

use crate::cli::types::{MatchId, PlayerId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Singles and doubles ratings of a player.
///
/// `None` means "not rated" and is never conflated with `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub singles: Option<f64>,
    pub singles_verified: Option<f64>,
    pub singles_provisional: bool,
    pub doubles: Option<f64>,
    pub doubles_verified: Option<f64>,
    pub doubles_provisional: bool,
}

impl Rating {
    pub fn singles_display(&self) -> String {
        Self::display_value(self.singles, self.singles_verified, self.singles_provisional)
    }

    pub fn doubles_display(&self) -> String {
        Self::display_value(self.doubles, self.doubles_verified, self.doubles_provisional)
    }

    /// Provisional ratings are starred; settled ones prefer the verified value.
    pub fn display_value(value: Option<f64>, verified: Option<f64>, provisional: bool) -> String {
        if provisional {
            return match value {
                Some(v) => format!("{}*", v),
                None => "NR".to_string(),
            };
        }
        match verified.or(value) {
            Some(v) => v.to_string(),
            None => "NR".to_string(),
        }
    }

    pub fn is_unrated(&self) -> bool {
        self.singles.is_none() && self.doubles.is_none()
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.doubles_display(), self.singles_display())
    }
}

/// Player information stored in the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: PlayerId,
    /// Alphanumeric short code DUPR shows to users (`duprId`).
    pub dupr_code: Option<String>,
    pub full_name: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<u32>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub rating: Rating,
    /// Created from a match payload only; awaiting a full player fetch.
    pub is_thin: bool,
}

impl Player {
    /// Minimal record built from the fields a match payload embeds.
    pub fn thin(player_id: PlayerId, full_name: impl Into<String>, dupr_code: Option<String>) -> Self {
        Self {
            player_id,
            dupr_code,
            full_name: full_name.into(),
            first_name: None,
            last_name: None,
            gender: None,
            age: None,
            email: None,
            phone: None,
            image_url: None,
            rating: Rating::default(),
            is_thin: true,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {} {}", self.full_name, self.rating)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchFormat {
    Singles,
    Doubles,
}

impl MatchFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchFormat::Singles => "SINGLES",
            MatchFormat::Doubles => "DOUBLES",
        }
    }

    pub fn players_per_team(&self) -> usize {
        match self {
            MatchFormat::Singles => 1,
            MatchFormat::Doubles => 2,
        }
    }
}

impl fmt::Display for MatchFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SINGLES" => Ok(MatchFormat::Singles),
            "DOUBLES" => Ok(MatchFormat::Doubles),
            other => Err(format!("unknown match format '{}'", other)),
        }
    }
}

/// One side of a match. Membership is fixed once the match is stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    /// Game-by-game score; unplayed games are `None`.
    pub games: [Option<i32>; 3],
    pub is_winner: bool,
    pub players: Vec<PlayerId>,
}

/// A recorded match with exactly two teams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub match_id: MatchId,
    pub name: String,
    pub event_date: NaiveDate,
    pub format: MatchFormat,
    pub source: Option<String>,
    pub match_type: Option<String>,
    pub confirmed: Option<bool>,
    pub teams: Vec<Team>,
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Match {} on {}", self.name, self.event_date)
    }
}

/// Which stored players a selection should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerFilter {
    All,
    /// Doubles rating is NULL: likely only ever seen inside a match payload.
    MissingDoubles,
    Thin,
}

/// Row counts of the cache tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub players: u64,
    pub thin_players: u64,
    pub matches: u64,
    pub teams: u64,
}
