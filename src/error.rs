//! Error types for the DUPR cache CLI

use thiserror::Error;


pub type Result<T> = std::result::Result<T, DuprError>;

/// Longest raw payload excerpt kept on a [`NormalizationError`].
const PAYLOAD_EXCERPT_LEN: usize = 512;

#[derive(Error, Debug)]
pub enum DuprError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("DUPR API returned {status} for {endpoint}")]
    Transport { status: u16, endpoint: String },

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error("{what} not provided and {env_var} environment variable not set")]
    MissingConfig { what: String, env_var: String },

    #[error("Failed to parse id: {0}")]
    InvalidId(#[from] std::num::ParseIntError),

    #[error("Not authenticated: no access token and no credentials available")]
    NotAuthenticated,

    #[error("Login failed with status {status}")]
    LoginFailed { status: u16 },

    #[error("Player not found: {id}")]
    PlayerNotFound { id: String },

    #[error("Cache error: {message}")]
    Cache { message: String },
}

impl DuprError {
    /// HTTP-style status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            DuprError::Transport { status, .. } | DuprError::LoginFailed { status } => {
                Some(*status)
            }
            DuprError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// A raw upstream payload that could not be turned into a canonical record.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("invalid field `{field}`: {reason}")]
pub struct NormalizationError {
    /// Path of the offending field, e.g. `teams[1].player1.id`.
    pub field: String,
    pub reason: String,
    /// Excerpt of the raw JSON payload, kept for logging.
    pub payload: String,
}

impl NormalizationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>, raw: &serde_json::Value) -> Self {
        let mut payload = raw.to_string();
        if payload.len() > PAYLOAD_EXCERPT_LEN {
            let mut cut = PAYLOAD_EXCERPT_LEN;
            while !payload.is_char_boundary(cut) {
                cut -= 1;
            }
            payload.truncate(cut);
            payload.push('…');
        }
        Self {
            field: field.into(),
            reason: reason.into(),
            payload,
        }
    }

    /// Prefix the field path with the enclosing object's path.
    pub fn within(mut self, parent: &str) -> Self {
        self.field = format!("{}.{}", parent, self.field);
        self
    }
}
