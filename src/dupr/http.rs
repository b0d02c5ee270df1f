//! reqwest transport for the DUPR API.
//!
//! The client owns the bearer token: it loads a saved token on startup,
//! logs in when asked to authenticate without one, and on a 401/403 logs in
//! again once with the stored credentials and replays the request.

use super::types::{Envelope, LoginResult, Page};
use super::{Credentials, DuprApi, Endpoint};
use crate::core::{cache, config::Config};
use crate::error::{DuprError, Result};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::{debug, info, warn};

#[cfg(test)]
mod tests;

pub struct DuprClient {
    http: Client,
    base_url: String,
    version: String,
    token: Option<String>,
    credentials: Option<Credentials>,
    token_path: Option<PathBuf>,
}

impl DuprClient {
    pub fn new(base_url: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("duprly/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            version: version.into(),
            token: None,
            credentials: None,
            token_path: None,
        })
    }

    /// Client configured from [`Config`], with any saved token loaded.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut client = Self::new(&config.api_url, &config.api_version)?
            .with_token_path(config.token_path.clone());
        client.credentials = config.credentials.clone();
        Ok(client)
    }

    /// Persist tokens at `path`, loading one from there if present.
    pub fn with_token_path(mut self, path: PathBuf) -> Self {
        if let Some(token) = cache::load_token(&path) {
            debug!(path = %path.display(), "loaded saved access token");
            self.token = Some(token);
        }
        self.token_path = Some(path);
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Always log in, replacing any current token.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<()> {
        info!(user = %credentials.username, "logging in to DUPR");
        let body = json!({
            "email": credentials.username,
            "password": credentials.password,
        });
        let response = self
            .http
            .post(self.url(&format!("/auth/{}/login/", self.version)))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "login response");
        if !status.is_success() {
            return Err(DuprError::LoginFailed {
                status: status.as_u16(),
            });
        }

        let login: Envelope<LoginResult> = response.json().await?;
        self.token = Some(login.result.access_token);
        self.credentials = Some(credentials.clone());
        self.save_token();
        Ok(())
    }

    fn save_token(&self) {
        if let (Some(path), Some(token)) = (&self.token_path, &self.token) {
            if let Err(e) = cache::save_token(path, token) {
                warn!(path = %path.display(), error = %e, "could not save access token");
            }
        }
    }

    /// The logged-in user's own profile.
    pub async fn get_profile(&mut self) -> Result<Value> {
        self.fetch_single(&Endpoint::Profile)
            .await?
            .ok_or_else(|| DuprError::Transport {
                status: StatusCode::NOT_FOUND.as_u16(),
                endpoint: Endpoint::Profile.path(&self.version),
            })
    }

    async fn send_once(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Response> {
        let token = self.token.as_deref().ok_or(DuprError::NotAuthenticated)?;
        let mut request = self
            .http
            .request(method.clone(), self.url(path))
            .bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(%method, path, "DUPR request");
        let response = request.send().await?;
        debug!(status = response.status().as_u16(), path, "DUPR response");
        Ok(response)
    }

    /// Send with a single transparent re-login on an authorization failure.
    async fn send(&mut self, method: Method, path: &str, body: Option<&Value>) -> Result<Response> {
        let response = self.send_once(method.clone(), path, body).await?;
        if !is_auth_failure(response.status()) {
            return Ok(response);
        }

        let Some(credentials) = self.credentials.clone() else {
            return Ok(response);
        };
        warn!(status = response.status().as_u16(), path, "authorization rejected, logging in again");
        self.login(&credentials).await?;
        self.send_once(method, path, body).await
    }

    async fn result_of(&self, response: Response, path: &str) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            return Err(DuprError::Transport {
                status: status.as_u16(),
                endpoint: path.to_string(),
            });
        }
        let envelope: Envelope<Value> = response.json().await?;
        Ok(envelope.result)
    }
}

fn is_auth_failure(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

impl DuprApi for DuprClient {
    /// Reuse a saved token when there is one, otherwise log in.
    async fn authenticate(&mut self, credentials: &Credentials) -> Result<()> {
        self.credentials = Some(credentials.clone());
        if self.token.is_some() {
            debug!("using saved access token");
            return Ok(());
        }
        self.login(credentials).await
    }

    async fn fetch_page(&mut self, endpoint: &Endpoint, offset: u64, limit: u64) -> Result<Page> {
        let path = endpoint.path(&self.version);
        let response = match endpoint.page_body(offset, limit) {
            Some(body) => self.send(Method::POST, &path, Some(&body)).await?,
            None => {
                let paged = format!("{}?limit={}&offset={}", path, limit, offset);
                self.send(Method::GET, &paged, None).await?
            }
        };
        let result = self.result_of(response, &path).await?;
        Ok(serde_json::from_value(result)?)
    }

    async fn fetch_single(&mut self, endpoint: &Endpoint) -> Result<Option<Value>> {
        let path = endpoint.path(&self.version);
        let response = self.send(Method::GET, &path, None).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(path, "not found upstream");
            return Ok(None);
        }
        self.result_of(response, &path).await.map(Some)
    }
}
