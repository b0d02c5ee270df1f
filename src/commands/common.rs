//! Shared setup for command handlers.

use std::path::PathBuf;

use tracing::debug;

use crate::{
    core::config::{Config, PASSWORD_ENV_VAR, USERNAME_ENV_VAR},
    dupr::{DuprApi, DuprClient},
    error::DuprError,
    reconcile::NullRatingPolicy,
    storage::DuprDatabase,
    Result,
};

/// Context containing the resources every command needs.
pub struct CommandContext {
    pub config: Config,
    pub db: DuprDatabase,
    pub policy: NullRatingPolicy,
}

impl CommandContext {
    /// Open the cache database; `db_path` overrides the configured location.
    pub fn new(config: Config, db_path: Option<PathBuf>, policy: NullRatingPolicy) -> Result<Self> {
        let db = open_database(db_path.or_else(|| config.db_path.clone()))?;
        Ok(Self { config, db, policy })
    }

    /// Build an authenticated client.
    ///
    /// A saved token is enough when no credentials are configured.
    pub async fn connect(&self) -> Result<DuprClient> {
        let mut client = DuprClient::from_config(&self.config)?;
        match &self.config.credentials {
            Some(credentials) => client.authenticate(credentials).await?,
            None if client.has_token() => debug!("no credentials configured, using saved token"),
            None => return Err(missing_credentials()),
        }
        Ok(client)
    }
}

pub fn open_database(path: Option<PathBuf>) -> Result<DuprDatabase> {
    match path {
        Some(path) => DuprDatabase::open(&path),
        None => DuprDatabase::new(),
    }
}

fn missing_credentials() -> DuprError {
    DuprError::MissingConfig {
        what: "DUPR login".to_string(),
        env_var: format!("{} and {}", USERNAME_ENV_VAR, PASSWORD_ENV_VAR),
    }
}
