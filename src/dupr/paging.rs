//! Offset/limit pagination over DUPR's paged endpoints.
//!
//! A [`Paginator`] always starts at offset 0 and asks its [`PageSource`] for
//! the next window until `offset + limit >= total`. Pages are handed out one at
//! a time; [`fetch_all`] drains them into a single ordered list.
//!
//! A transport error ends pagination. [`Paged`] keeps the items gathered
//! before the failure alongside the error so callers can still reconcile them.

use super::{types::Page, DuprApi, Endpoint};
use crate::error::{DuprError, Result};
use serde_json::Value;
use tracing::{debug, warn};


/// Page size used for DUPR requests.
pub const DEFAULT_PAGE_LIMIT: u64 = 20;

/// Anything that can return the page starting at a given offset.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch_page(&mut self, offset: u64) -> Result<Page>;
}

impl<T: PageSource> PageSource for &mut T {
    async fn fetch_page(&mut self, offset: u64) -> Result<Page> {
        (**self).fetch_page(offset).await
    }
}

/// Lazy page-by-page walk over a [`PageSource`].
pub struct Paginator<S> {
    source: S,
    next_offset: Option<u64>,
    fetches: usize,
}

impl<S: PageSource> Paginator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            next_offset: Some(0),
            fetches: 0,
        }
    }

    /// Fetch the next page's items; `None` once the source is exhausted or failed.
    pub async fn next_page(&mut self) -> Option<Result<Vec<Value>>> {
        let offset = self.next_offset?;
        self.fetches += 1;

        match self.source.fetch_page(offset).await {
            Ok(page) => {
                debug!(
                    offset = page.offset,
                    limit = page.limit,
                    total = page.total,
                    hits = page.hits.len(),
                    "page fetched"
                );
                self.next_offset = page.next_offset();
                Some(Ok(page.hits))
            }
            Err(e) => {
                self.next_offset = None;
                Some(Err(e))
            }
        }
    }

    /// Number of fetches issued so far.
    pub fn fetches(&self) -> usize {
        self.fetches
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

/// Result of draining a paginator.
#[derive(Debug)]
pub struct Paged {
    /// Items from every page fetched successfully, in page order.
    pub items: Vec<Value>,
    /// The error that cut pagination short, if any.
    pub error: Option<DuprError>,
    pub fetches: usize,
}

impl Paged {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Discard partial data and surface the error, if there was one.
    pub fn into_result(self) -> Result<Vec<Value>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.items),
        }
    }
}

/// Walk every page of `source` from offset 0.
pub async fn fetch_all<S: PageSource>(source: S) -> Paged {
    let mut paginator = Paginator::new(source);
    let mut items = Vec::new();
    let mut error = None;

    while let Some(page) = paginator.next_page().await {
        match page {
            Ok(hits) => items.extend(hits),
            Err(e) => {
                warn!(error = %e, kept = items.len(), "pagination aborted");
                error = Some(e);
            }
        }
    }

    Paged {
        items,
        error,
        fetches: paginator.fetches(),
    }
}

/// Adapts one [`Endpoint`] of a [`DuprApi`] into a [`PageSource`].
pub struct EndpointPages<'a, A> {
    api: &'a mut A,
    endpoint: Endpoint,
    limit: u64,
}

impl<'a, A: DuprApi> EndpointPages<'a, A> {
    pub fn new(api: &'a mut A, endpoint: Endpoint) -> Self {
        Self::with_limit(api, endpoint, DEFAULT_PAGE_LIMIT)
    }

    pub fn with_limit(api: &'a mut A, endpoint: Endpoint, limit: u64) -> Self {
        Self {
            api,
            endpoint,
            limit,
        }
    }
}

impl<A: DuprApi> PageSource for EndpointPages<'_, A> {
    async fn fetch_page(&mut self, offset: u64) -> Result<Page> {
        self.api.fetch_page(&self.endpoint, offset, self.limit).await
    }
}
