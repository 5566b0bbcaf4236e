//! Request-side pagination flow.
//!
//! The first request for a resource answers with a bounded prefix and, when
//! the sequence is longer than that, a cursor to the rest. Follow-up requests
//! hand the cursor back and get the next slice.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{DEFAULT_MAX_PAGE_SIZE, PaginateCache};
use crate::Error;
use crate::cache::{CacheDb, PageStore};
use crate::prefix::PrefixCapture;

/// Continuation reference for the next slice of a cached generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PageCursor {
    /// Token of the cached generation.
    pub token: String,
    /// Index of the first element of the page.
    pub offset: u64,
    /// Page size.
    pub count: u64,
    /// Number of elements in the generation.
    pub total: u64,
}

impl PageCursor {
    /// Cursor for the page after this one, if any.
    pub fn advance(&self) -> Option<Self> {
        let offset = self.offset.saturating_add(self.count);
        (self.count > 0 && offset < self.total).then(|| Self { offset, ..self.clone() })
    }
}

/// Response to the first request for a resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirstPage<T> {
    pub items: Vec<T>,
    /// Total element count, absent when the sequence could not be cached.
    pub total: Option<u64>,
    pub next: Option<PageCursor>,
}

/// A follow-up page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<PageCursor>,
}

/// Drives the prefix-then-cache flow on top of a [`PaginateCache`].
#[derive(Clone)]
pub struct Paginator<S = CacheDb> {
    cache: PaginateCache<S>,
    max_page_size: usize,
}

impl<S: PageStore> Paginator<S> {
    pub fn new(cache: PaginateCache<S>) -> Self {
        Self { cache, max_page_size: DEFAULT_MAX_PAGE_SIZE }
    }

    /// Cap the page size of first pages and of cursors handed back by clients.
    pub fn with_max_page_size(self, max_page_size: usize) -> Self {
        Self { max_page_size: max_page_size.max(1), ..self }
    }

    pub fn cache(&self) -> &PaginateCache<S> {
        &self.cache
    }

    /// Answer the first request for `url` from `source`.
    ///
    /// The first `page_size` elements are returned directly. The whole
    /// sequence, prefix included, is cached for follow-up pages. If caching
    /// fails the prefix is still returned, without a total or a cursor.
    /// `page_size` is clamped to `1..=max_page_size`.
    pub async fn first_page<I>(&self, url: &str, source: I, page_size: usize) -> FirstPage<I::Item>
    where
        I: IntoIterator,
        I::Item: Serialize + Clone,
    {
        let page_size = page_size.clamp(1, self.max_page_size);
        let (items, replay) = PrefixCapture::wrap(source, page_size);

        match self.cache.store(url, replay).await {
            Ok(stored) => {
                let first = PageCursor { token: stored.token, offset: 0, count: page_size as u64, total: stored.count };
                FirstPage { items, total: Some(stored.count), next: first.advance() }
            }
            Err(err) => {
                tracing::warn!(url, error = %err, "serving first page without continuation");
                FirstPage { items, total: None, next: None }
            }
        }
    }

    /// Fetch the page a cursor points at.
    ///
    /// A page that comes back short (the generation expired or was cleared)
    /// ends the pagination.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the cursor asks for more than
    /// `max_page_size` elements.
    pub async fn page<T>(&self, url: &str, cursor: &PageCursor) -> Result<Page<T>, Error>
    where
        T: DeserializeOwned,
    {
        if cursor.count > self.max_page_size as u64 {
            return Err(Error::InvalidInput(format!(
                "cursor count {} exceeds the maximum page size {}",
                cursor.count, self.max_page_size
            )));
        }
        let items: Vec<T> = self.cache.get(url, &cursor.token, cursor.offset, cursor.count).await?;
        let next = if items.len() as u64 == cursor.count { cursor.advance() } else { None };
        Ok(Page { items, next })
    }
}
