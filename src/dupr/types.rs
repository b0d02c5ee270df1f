//! Wire shapes of DUPR API responses.
//!
//! Only the envelopes are typed; record payloads stay as `serde_json::Value`
//! until the normalizer turns them into canonical records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every successful response wraps its payload in `{"result": ...}`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub result: T,
}

/// One page of an offset/limit paged endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub hits: Vec<Value>,
    pub offset: u64,
    pub limit: u64,
    pub total: u64,
}

impl Page {
    /// Offset of the following page, or `None` once `total` is reached.
    ///
    /// A zero `limit` would never advance, so it also ends pagination.
    pub fn next_offset(&self) -> Option<u64> {
        if self.limit == 0 {
            return None;
        }
        let next = self.offset + self.limit;
        (next < self.total).then_some(next)
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginResult {
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_envelope_deserialization() {
        let raw = json!({
            "status": "SUCCESS",
            "result": {
                "offset": 0,
                "limit": 20,
                "total": 55,
                "hits": [{"id": 1}, {"id": 2}]
            }
        });

        let envelope: Envelope<Page> = serde_json::from_value(raw).unwrap();
        assert_eq!(envelope.result.hits.len(), 2);
        assert_eq!(envelope.result.next_offset(), Some(20));
    }

    #[test]
    fn test_next_offset_last_page() {
        let page = Page {
            hits: Vec::new(),
            offset: 40,
            limit: 20,
            total: 55,
        };
        assert_eq!(page.next_offset(), None);
    }

    #[test]
    fn test_next_offset_exact_boundary() {
        let page = Page {
            hits: Vec::new(),
            offset: 20,
            limit: 20,
            total: 40,
        };
        assert_eq!(page.next_offset(), None);
    }

    #[test]
    fn test_next_offset_empty_and_zero_limit() {
        assert_eq!(Page::default().next_offset(), None);
        let stuck = Page {
            hits: Vec::new(),
            offset: 0,
            limit: 0,
            total: 10,
        };
        assert_eq!(stuck.next_offset(), None);
    }

    #[test]
    fn test_missing_hits_defaults_to_empty() {
        let page: Page =
            serde_json::from_value(json!({"offset": 0, "limit": 10, "total": 0})).unwrap();
        assert!(page.hits.is_empty());
    }

    #[test]
    fn test_login_result() {
        let login: Envelope<LoginResult> =
            serde_json::from_value(json!({"result": {"accessToken": "tok", "refreshToken": "r"}}))
                .unwrap();
        assert_eq!(login.result.access_token, "tok");
    }
}
