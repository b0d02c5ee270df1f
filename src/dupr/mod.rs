//! DUPR API access: transport, pagination and record normalization.

pub mod http;
pub mod normalize;
pub mod paging;
pub mod types;

use crate::cli::types::{ClubId, PlayerId};
use crate::core::filters::{HistoryQuery, MembersQuery};
use crate::Result;
use serde_json::Value;
use std::fmt;

pub use http::DuprClient;
pub use paging::{fetch_all, EndpointPages, PageSource, Paged, Paginator};
pub use types::Page;

/// Login for the single account the cache is built from.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The DUPR resources this tool reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Profile,
    Player(PlayerId),
    ClubMembers(ClubId),
    MatchHistory(PlayerId),
}

impl Endpoint {
    pub fn path(&self, version: &str) -> String {
        match self {
            Endpoint::Profile => format!("/user/{}/profile/", version),
            Endpoint::Player(id) => format!("/player/{}/{}", version, id),
            Endpoint::ClubMembers(club) => format!("/club/{}/members/{}/all", club, version),
            Endpoint::MatchHistory(id) => format!("/player/{}/{}/history", version, id),
        }
    }

    /// JSON body carrying the paging window, for the paged POST endpoints.
    pub fn page_body(&self, offset: u64, limit: u64) -> Option<Value> {
        let body = match self {
            Endpoint::ClubMembers(_) => serde_json::to_value(MembersQuery::new(offset, limit)),
            Endpoint::MatchHistory(_) => serde_json::to_value(HistoryQuery::new(offset, limit)),
            Endpoint::Profile | Endpoint::Player(_) => return None,
        };
        body.ok()
    }
}

/// Upstream API as the sync layer sees it.
///
/// Implementations own token handling; callers only see payloads or errors.
#[allow(async_fn_in_trait)]
pub trait DuprApi {
    async fn authenticate(&mut self, credentials: &Credentials) -> Result<()>;

    async fn fetch_page(&mut self, endpoint: &Endpoint, offset: u64, limit: u64) -> Result<Page>;

    /// `Ok(None)` when the resource does not exist upstream.
    async fn fetch_single(&mut self, endpoint: &Endpoint) -> Result<Option<Value>>;
}
