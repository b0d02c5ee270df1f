//! Request bodies for DUPR's paged POST endpoints.
//!
//! The club-member and match-history endpoints take their paging window and
//! search/sort options in a JSON body rather than the query string.

use serde::Serialize;
use serde_json::{Map, Value};

/// Body for `POST /club/{club}/members/{version}/all`.
///
/// # Examples
///
/// ```rust
/// use duprly::core::filters::MembersQuery;
///
/// let body = serde_json::to_value(MembersQuery::new(20, 40)).unwrap();
/// assert_eq!(body["query"], "*");
/// assert_eq!(body["offset"], 20);
/// ```
#[derive(Debug, Serialize)]
pub struct MembersQuery {
    pub exclude: Vec<u64>,
    pub limit: u64,
    pub offset: u64,
    pub query: String,
}

impl MembersQuery {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            exclude: Vec::new(),
            limit,
            offset,
            query: "*".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SortSpec {
    pub order: String,
    pub parameter: String,
}

/// Body for `POST /player/{version}/{id}/history`, newest matches first.
#[derive(Debug, Serialize)]
pub struct HistoryQuery {
    pub filters: Map<String, Value>,
    pub sort: SortSpec,
    pub limit: u64,
    pub offset: u64,
}

impl HistoryQuery {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self {
            filters: Map::new(),
            sort: SortSpec {
                order: "DESC".to_string(),
                parameter: "MATCH_DATE".to_string(),
            },
            limit,
            offset,
        }
    }
}
