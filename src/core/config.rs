//! Runtime configuration from the environment and an optional `.env` file.

use crate::cli::types::ClubId;
use crate::dupr::Credentials;
use crate::error::{DuprError, Result};
use std::path::PathBuf;
use tracing::debug;

use super::cache::token_path;

pub const USERNAME_ENV_VAR: &str = "DUPR_USERNAME";
pub const PASSWORD_ENV_VAR: &str = "DUPR_PASSWORD";
pub const CLUB_ID_ENV_VAR: &str = "DUPR_CLUB_ID";
pub const API_URL_ENV_VAR: &str = "DUPR_API_URL";
pub const DB_PATH_ENV_VAR: &str = "DUPR_DB_PATH";

pub const DEFAULT_API_URL: &str = "https://api.dupr.gg";
pub const DEFAULT_API_VERSION: &str = "v1.0";

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub api_version: String,
    pub credentials: Option<Credentials>,
    pub club_id: Option<ClubId>,
    pub db_path: Option<PathBuf>,
    pub token_path: PathBuf,
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let credentials = match (get(USERNAME_ENV_VAR), get(PASSWORD_ENV_VAR)) {
            (Some(username), Some(password)) => Some(Credentials { username, password }),
            _ => None,
        };
        let club_id = get(CLUB_ID_ENV_VAR)
            .map(|s| s.parse::<ClubId>())
            .transpose()?;

        Ok(Self {
            api_url: get(API_URL_ENV_VAR).unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_version: DEFAULT_API_VERSION.to_string(),
            credentials,
            club_id,
            db_path: get(DB_PATH_ENV_VAR).map(PathBuf::from),
            token_path: token_path(),
        })
    }

    /// Command-line value wins over the environment.
    pub fn resolve_club_id(&self, club_id: Option<ClubId>) -> Result<ClubId> {
        club_id.or(self.club_id).ok_or_else(|| DuprError::MissingConfig {
            what: "Club ID".to_string(),
            env_var: CLUB_ID_ENV_VAR.to_string(),
        })
    }
}
