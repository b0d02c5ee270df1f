//! Turns raw DUPR JSON payloads into canonical records.
//!
//! The API is inconsistent between endpoints:
//! - ratings arrive flat (`singles`, `doubles`, ...) from the player endpoint
//!   but nested under `ratings` from the club member listing
//! - ratings are decimal strings, numbers, or the token `"NR"`
//! - players carry a numeric `id` and an alphanumeric `duprId`
//!
//! Everything downstream of this module only sees [`Player`] and
//! [`NormalizedMatch`].

use crate::cli::types::{MatchId, PlayerId};
use crate::error::NormalizationError;
use crate::storage::{Match, MatchFormat, Player, Rating, Team};
use chrono::NaiveDate;
use serde_json::{Map, Value};


type Normalized<T> = std::result::Result<T, NormalizationError>;

/// Upstream token for "not rated".
pub const NOT_RATED: &str = "NR";

/// A match plus the thin player records embedded in its teams, in team order.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMatch {
    pub record: Match,
    pub players: Vec<Player>,
}

/// Normalize a full player payload (player endpoint or club member listing).
pub fn normalize_player(raw: &Value) -> Normalized<Player> {
    let obj = as_object(raw, "$")?;
    let flat = flatten_ratings(obj);

    let player_id = player_id(&flat, raw)?;
    let rating = Rating {
        singles: rating_field(&flat, "singles", raw)?,
        singles_verified: rating_field(&flat, "singlesVerified", raw)?,
        singles_provisional: bool_field(&flat, "singlesProvisional"),
        doubles: rating_field(&flat, "doubles", raw)?,
        doubles_verified: rating_field(&flat, "doublesVerified", raw)?,
        doubles_provisional: bool_field(&flat, "doublesProvisional"),
    };

    Ok(Player {
        player_id,
        dupr_code: dupr_code(&flat),
        full_name: display_name(&flat),
        first_name: str_field(&flat, "firstName"),
        last_name: str_field(&flat, "lastName"),
        gender: str_field(&flat, "gender"),
        age: flat.get("age").and_then(as_u64).and_then(|a| u32::try_from(a).ok()),
        email: str_field(&flat, "email"),
        phone: str_field(&flat, "phone"),
        image_url: str_field(&flat, "imageUrl"),
        rating,
        is_thin: false,
    })
}

/// Normalize a player object embedded in a match team into a thin record.
///
/// Only the id, name and short code are kept.
pub fn normalize_embedded_player(raw: &Value) -> Normalized<Player> {
    let obj = as_object(raw, "$")?;
    Ok(Player::thin(
        player_id(obj, raw)?,
        display_name(obj),
        dupr_code(obj),
    ))
}

/// Normalize one entry of a match history.
pub fn normalize_match(raw: &Value) -> Normalized<NormalizedMatch> {
    let obj = as_object(raw, "$")?;

    let match_id = match id_field(obj, "matchId", raw)? {
        Some(id) => id,
        None => id_field(obj, "id", raw)?
            .ok_or_else(|| NormalizationError::new("matchId", "missing", raw))?,
    };

    let event_date = match obj.get("eventDate") {
        Some(Value::String(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| {
            NormalizationError::new("eventDate", format!("'{}' is not a calendar date: {}", s, e), raw)
        })?,
        Some(Value::Null) | None => {
            return Err(NormalizationError::new("eventDate", "missing", raw));
        }
        Some(other) => {
            return Err(NormalizationError::new(
                "eventDate",
                format!("expected a date string, got {}", other),
                raw,
            ));
        }
    };

    let raw_teams = match obj.get("teams") {
        Some(Value::Array(teams)) if teams.len() == 2 => teams,
        Some(Value::Array(teams)) => {
            return Err(NormalizationError::new(
                "teams",
                format!("expected exactly 2 teams, got {}", teams.len()),
                raw,
            ));
        }
        _ => return Err(NormalizationError::new("teams", "missing", raw)),
    };

    let declared_format = match str_field(obj, "eventFormat") {
        Some(s) => Some(
            s.parse::<MatchFormat>()
                .map_err(|reason| NormalizationError::new("eventFormat", reason, raw))?,
        ),
        None => None,
    };

    let mut teams = Vec::with_capacity(2);
    let mut players = Vec::new();
    for (index, raw_team) in raw_teams.iter().enumerate() {
        let path = format!("teams[{}]", index);
        let (team, team_players) =
            normalize_team(raw_team, declared_format).map_err(|e| e.within(&path))?;
        teams.push(team);
        players.extend(team_players);
    }

    let format = declared_format.unwrap_or_else(|| {
        if teams.iter().any(|t| t.players.len() > 1) {
            MatchFormat::Doubles
        } else {
            MatchFormat::Singles
        }
    });

    Ok(NormalizedMatch {
        record: Match {
            match_id: MatchId::new(match_id),
            name: match_name(obj),
            event_date,
            format,
            source: str_field(obj, "matchSource"),
            match_type: str_field(obj, "matchType"),
            confirmed: obj.get("confirmed").and_then(Value::as_bool),
            teams,
        },
        players,
    })
}

fn normalize_team(raw: &Value, format: Option<MatchFormat>) -> Normalized<(Team, Vec<Player>)> {
    let obj = as_object(raw, "$")?;

    let first = match obj.get("player1") {
        Some(p @ Value::Object(_)) => normalize_embedded_player(p).map_err(|e| e.within("player1"))?,
        _ => return Err(NormalizationError::new("player1", "missing", raw)),
    };
    let second = match obj.get("player2") {
        Some(p @ Value::Object(_)) => {
            if format.is_some_and(|f| f.players_per_team() < 2) {
                return Err(NormalizationError::new(
                    "player2",
                    "second player in a singles match",
                    raw,
                ));
            }
            Some(normalize_embedded_player(p).map_err(|e| e.within("player2"))?)
        }
        Some(Value::Null) | None => None,
        Some(other) => {
            return Err(NormalizationError::new(
                "player2",
                format!("expected an object, got {}", other),
                raw,
            ));
        }
    };

    let mut players = vec![first];
    players.extend(second);

    let team = Team {
        games: [
            game_score(obj, "game1"),
            game_score(obj, "game2"),
            game_score(obj, "game3"),
        ],
        is_winner: bool_field(obj, "winner"),
        players: players.iter().map(|p| p.player_id).collect(),
    };
    Ok((team, players))
}

/// Parse one rating value: `"NR"`, null or missing is absent; other strings
/// must be decimals.
pub fn parse_rating(value: Option<&Value>) -> std::result::Result<Option<f64>, String> {
    let rating = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.trim() == NOT_RATED => return Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{}' is not a rating", s))?,
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| format!("'{}' is not a rating", n))?,
        Some(other) => return Err(format!("expected a rating, got {}", other)),
    };

    if rating.is_finite() {
        Ok(Some(rating))
    } else {
        Err(format!("'{}' is not a finite rating", rating))
    }
}

/// Merge a nested `ratings` object into the top level; nested values win, nulls included.
fn flatten_ratings(obj: &Map<String, Value>) -> Map<String, Value> {
    let mut flat = obj.clone();
    if let Some(Value::Object(nested)) = flat.remove("ratings") {
        for (key, value) in nested {
            flat.insert(key, value);
        }
    }
    flat
}

fn player_id(obj: &Map<String, Value>, raw: &Value) -> Normalized<PlayerId> {
    if let Some(id) = id_field(obj, "id", raw)? {
        return Ok(PlayerId::new(id));
    }
    // Some listings only carry `duprId`, occasionally in numeric form.
    match obj.get("duprId").and_then(as_u64) {
        Some(id) => Ok(PlayerId::new(id)),
        None => Err(NormalizationError::new("id", "missing", raw)),
    }
}

fn dupr_code(obj: &Map<String, Value>) -> Option<String> {
    str_field(obj, "duprId")
}

fn display_name(obj: &Map<String, Value>) -> String {
    if let Some(full) = str_field(obj, "fullName") {
        return full;
    }
    let parts: Vec<String> = ["firstName", "lastName"]
        .iter()
        .filter_map(|k| str_field(obj, k))
        .collect();
    parts.join(" ")
}

fn match_name(obj: &Map<String, Value>) -> String {
    let nested = |outer: &str| {
        obj.get(outer)
            .and_then(Value::as_object)
            .and_then(|o| str_field(o, "name"))
    };

    str_field(obj, "eventName")
        .or_else(|| str_field(obj, "leagueName"))
        .or_else(|| nested("league"))
        .or_else(|| str_field(obj, "tournamentName"))
        .or_else(|| nested("tournament"))
        .unwrap_or_default()
}

fn rating_field(obj: &Map<String, Value>, key: &str, raw: &Value) -> Normalized<Option<f64>> {
    parse_rating(obj.get(key)).map_err(|reason| NormalizationError::new(key, reason, raw))
}

/// Numeric id as a JSON number or numeric string. Missing or null is `None`.
fn id_field(obj: &Map<String, Value>, key: &str, raw: &Value) -> Normalized<Option<u64>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => as_u64(v)
            .map(Some)
            .ok_or_else(|| NormalizationError::new(key, format!("{} is not a numeric id", v), raw)),
    }
}

fn as_object<'a>(raw: &'a Value, path: &str) -> Normalized<&'a Map<String, Value>> {
    raw.as_object()
        .ok_or_else(|| NormalizationError::new(path, "expected a JSON object", raw))
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Non-empty, trimmed string value.
fn str_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn bool_field(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Upstream marks unplayed games with negative scores.
fn game_score(obj: &Map<String, Value>, key: &str) -> Option<i32> {
    let score = match obj.get(key)? {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    if score < 0 {
        None
    } else {
        i32::try_from(score).ok()
    }
}
