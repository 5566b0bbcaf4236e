//! Token-addressed, TTL-bounded page cache.
//!
//! A `store` call persists one generation of a sequence under a fresh random
//! token; later `get` calls slice it by offset and count. Generations are
//! never modified, only dropped whole by `cleanup` (age) or `clear`.

mod session;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::Error;
use crate::cache::hash::url_hash;
use crate::cache::{CacheDb, CacheEntry, PageStore};
use crate::source::{SecureRandom, SystemClock, TimeSource, TokenGenerator};

pub use session::{FirstPage, Page, PageCursor, Paginator};

/// Age after which a generation becomes eligible for cleanup.
pub const DEFAULT_TTL_SECS: u64 = 3600;

/// Length of generated tokens.
pub const DEFAULT_TOKEN_LENGTH: usize = 32;

/// Rows buffered before each write to the page store.
pub const DEFAULT_INSERT_BATCH_SIZE: usize = 128;

/// Largest page a [`Paginator`] hands out or accepts in a cursor.
pub const DEFAULT_MAX_PAGE_SIZE: usize = 1000;

/// Tunables for a [`PaginateCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub ttl_secs: u64,
    pub token_length: usize,
    pub insert_batch_size: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            token_length: DEFAULT_TOKEN_LENGTH,
            insert_batch_size: DEFAULT_INSERT_BATCH_SIZE,
        }
    }
}

/// Result of a successful `store`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredGeneration {
    pub token: String,
    pub count: u64,
}

/// Persists sequences page-addressably and serves slices of them back.
///
/// Clones share the same store, clock, and token source.
#[derive(Clone)]
pub struct PaginateCache<S = CacheDb> {
    store: S,
    clock: Arc<dyn TimeSource>,
    tokens: Arc<dyn TokenGenerator>,
    settings: CacheSettings,
}

impl<S: PageStore> PaginateCache<S> {
    /// Cache using the system clock and the secure token generator.
    pub fn new(store: S, settings: CacheSettings) -> Self {
        Self::with_sources(store, Arc::new(SystemClock), Arc::new(SecureRandom), settings)
    }

    /// Cache with explicit time and token sources.
    pub fn with_sources(
        store: S, clock: Arc<dyn TimeSource>, tokens: Arc<dyn TokenGenerator>, settings: CacheSettings,
    ) -> Self {
        Self { store, clock, tokens, settings }
    }

    /// How long a generation stays retrievable.
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.settings.ttl_secs)
    }

    /// Settings this cache was built with.
    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// Persist every element of `items` under a new token.
    ///
    /// Elements are encoded and written as they are drawn, so memory use is
    /// bounded by the insert batch size rather than the sequence length. All
    /// rows of one generation share the insert time read at the start.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encode`] if an element cannot be encoded and
    /// [`Error::Database`] if a write fails. Either way the rows already
    /// written for the new token are deleted before the error is returned.
    pub async fn store<I>(&self, url: &str, items: I) -> Result<StoredGeneration, Error>
    where
        I: IntoIterator,
        I::Item: Serialize,
    {
        let url_hash = url_hash(url);
        let token = self.tokens.generate(self.settings.token_length);
        let insert_time = self.clock.now();

        match self.write_generation(&url_hash, &token, insert_time, items).await {
            Ok(count) => {
                tracing::debug!(url, count, "stored page cache generation");
                Ok(StoredGeneration { token, count })
            }
            Err(err) => {
                tracing::warn!(url, error = %err, "page cache store failed, dropping partial generation");
                if let Err(cleanup_err) = self.store.delete_generation(&url_hash, &token).await {
                    tracing::warn!(url, error = %cleanup_err, "partial generation left to expire");
                }
                Err(err)
            }
        }
    }

    async fn write_generation<I>(&self, url_hash: &str, token: &str, insert_time: i64, items: I) -> Result<u64, Error>
    where
        I: IntoIterator,
        I::Item: Serialize,
    {
        let batch_size = self.settings.insert_batch_size.max(1);
        let mut batch = Vec::with_capacity(batch_size);
        let mut count = 0u64;

        for item in items {
            let value = serde_json::to_string(&item).map_err(|source| Error::Encode { index: count, source })?;
            batch.push(CacheEntry {
                url_hash: url_hash.to_string(),
                token: token.to_string(),
                index: count,
                insert_time,
                value,
            });
            count += 1;

            if batch.len() == batch_size {
                let full = std::mem::replace(&mut batch, Vec::with_capacity(batch_size));
                self.store.insert_many(full).await?;
            }
        }

        if !batch.is_empty() {
            self.store.insert_many(batch).await?;
        }
        Ok(count)
    }

    /// Read up to `count` elements of a generation starting at `offset`.
    ///
    /// An unknown URL or token, an expired generation, or an offset past the
    /// end all yield an empty page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if any row in the page cannot be decoded;
    /// no partial page is returned in that case.
    pub async fn get<T>(&self, url: &str, token: &str, offset: u64, count: u64) -> Result<Vec<T>, Error>
    where
        T: DeserializeOwned,
    {
        let end = offset.saturating_add(count);
        let values = self.store.select_range(&url_hash(url), token, offset, end).await?;
        tracing::debug!(url, offset, requested = count, returned = values.len(), "page cache read");

        values
            .iter()
            .zip(offset..)
            .map(|(value, index)| serde_json::from_str(value).map_err(|source| Error::Decode { index, source }))
            .collect()
    }

    /// Delete every generation older than the TTL. Returns rows deleted.
    pub async fn cleanup(&self) -> Result<u64, Error> {
        let ttl = i64::try_from(self.settings.ttl_secs).unwrap_or(i64::MAX);
        let cutoff = self.clock.now().saturating_sub(ttl);
        let deleted = self.store.delete_older_than(cutoff).await?;
        if deleted > 0 {
            tracing::info!(deleted, cutoff, "expired page cache entries");
        }
        Ok(deleted)
    }

    /// Delete every generation regardless of age. Returns rows deleted.
    pub async fn clear(&self) -> Result<u64, Error> {
        let deleted = self.store.delete_all().await?;
        tracing::info!(deleted, "cleared page cache");
        Ok(deleted)
    }
}


#[cfg(test)]
mod tests {
    use serde::Serializer;
    use serde::ser::Error as _;

    use super::testing::{FakeClock, FlakyStore, cache_at};
    use super::*;

    const T0: i64 = 1_700_000_000;

    async fn memory_cache() -> (PaginateCache, Arc<FakeClock>) {
        let clock = FakeClock::at(T0);
        let db = CacheDb::open_in_memory().await.unwrap();
        (cache_at(db, clock.clone(), CacheSettings::default()), clock)
    }

    /// Serializes as its number, except 3 which refuses.
    struct Flaky(u32);

    impl Serialize for Flaky {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if self.0 == 3 {
                return Err(S::Error::custom("item 3 cannot be encoded"));
            }
            serializer.serialize_u32(self.0)
        }
    }

    #[tokio::test]
    async fn test_store_then_get_pages() {
        let (cache, _) = memory_cache().await;
        let stored = cache.store("/x", ["a", "b", "c", "d", "e"]).await.unwrap();
        assert_eq!(stored.count, 5);

        let page: Vec<String> = cache.get("/x", &stored.token, 1, 2).await.unwrap();
        assert_eq!(page, vec!["b", "c"]);

        let tail: Vec<String> = cache.get("/x", &stored.token, 4, 10).await.unwrap();
        assert_eq!(tail, vec!["e"]);

        let wrong: Vec<String> = cache.get("/x", "wrong-token", 0, 5).await.unwrap();
        assert!(wrong.is_empty());
    }

    #[tokio::test]
    async fn test_full_roundtrip_preserves_order() {
        let (cache, _) = memory_cache().await;
        let items: Vec<serde_json::Value> = (0..300)
            .map(|i| serde_json::json!({ "name": format!("file-{i}"), "size": i * 10, "dir": i % 7 == 0 }))
            .collect();

        let stored = cache.store("/files", items.clone()).await.unwrap();
        let all: Vec<serde_json::Value> = cache.get("/files", &stored.token, 0, stored.count).await.unwrap();
        assert_eq!(all, items);
    }

    #[tokio::test]
    async fn test_get_past_end_and_zero_count() {
        let (cache, _) = memory_cache().await;
        let stored = cache.store("/x", 0..5).await.unwrap();

        let past: Vec<u32> = cache.get("/x", &stored.token, 5, 3).await.unwrap();
        assert!(past.is_empty());
        let none: Vec<u32> = cache.get("/x", &stored.token, 0, 0).await.unwrap();
        assert!(none.is_empty());
        let huge: Vec<u32> = cache.get("/x", &stored.token, 2, u64::MAX).await.unwrap();
        assert_eq!(huge, vec![2, 3, 4]);
    }

    #[tokio::test]
    async fn test_get_is_scoped_to_url() {
        let (cache, _) = memory_cache().await;
        let stored = cache.store("/x", ["a"]).await.unwrap();
        let other: Vec<String> = cache.get("/y", &stored.token, 0, 1).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn test_empty_sequence_stores_nothing() {
        let (cache, _) = memory_cache().await;
        let stored = cache.store("/empty", Vec::<String>::new()).await.unwrap();
        assert_eq!(stored.count, 0);
        let page: Vec<String> = cache.get("/empty", &stored.token, 0, 10).await.unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_two_generations_do_not_intersect() {
        let (cache, _) = memory_cache().await;
        let first = cache.store("/x", ["a1", "a2"]).await.unwrap();
        let second = cache.store("/x", ["b1", "b2", "b3"]).await.unwrap();
        assert_ne!(first.token, second.token);

        let a: Vec<String> = cache.get("/x", &first.token, 0, 10).await.unwrap();
        let b: Vec<String> = cache.get("/x", &second.token, 0, 10).await.unwrap();
        assert_eq!(a, vec!["a1", "a2"]);
        assert_eq!(b, vec!["b1", "b2", "b3"]);
    }

    #[tokio::test]
    async fn test_concurrent_stores_same_url() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = PaginateCache::new(db, CacheSettings { insert_batch_size: 3, ..Default::default() });

        let (left, right) = tokio::join!(cache.store("/x", 0..50), cache.store("/x", 100..140));
        let (left, right) = (left.unwrap(), right.unwrap());
        assert_eq!(left.token.len(), DEFAULT_TOKEN_LENGTH);
        assert_ne!(left.token, right.token);

        let l: Vec<u32> = cache.get("/x", &left.token, 0, 100).await.unwrap();
        let r: Vec<u32> = cache.get("/x", &right.token, 0, 100).await.unwrap();
        assert_eq!(l, (0..50).collect::<Vec<_>>());
        assert_eq!(r, (100..140).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_store_writes_in_bounded_batches() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let store = FlakyStore::new(db);
        let cache = cache_at(store, FakeClock::at(T0), CacheSettings { insert_batch_size: 4, ..Default::default() });

        let stored = cache.store("/x", 0..10).await.unwrap();
        assert_eq!(stored.count, 10);
        assert_eq!(*cache.store.batches.lock().unwrap(), vec![4, 4, 2]);
    }

    #[tokio::test]
    async fn test_store_skips_empty_trailing_batch() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let store = FlakyStore::new(db);
        let cache = cache_at(store, FakeClock::at(T0), CacheSettings { insert_batch_size: 4, ..Default::default() });

        assert_eq!(cache.store("/x", 0..8).await.unwrap().count, 8);
        assert_eq!(*cache.store.batches.lock().unwrap(), vec![4, 4]);

        assert_eq!(cache.store("/empty", 0..0).await.unwrap().count, 0);
        assert_eq!(*cache.store.batches.lock().unwrap(), vec![4, 4]);
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_expired() {
        let (cache, clock) = memory_cache().await;
        let old = cache.store("/x", ["old"]).await.unwrap();

        clock.set(T0 + 1800);
        let recent = cache.store("/x", ["recent"]).await.unwrap();

        // old was inserted exactly TTL ago: not yet strictly older than the cutoff
        clock.set(T0 + 3600);
        assert_eq!(cache.cleanup().await.unwrap(), 0);

        clock.set(T0 + 3601);
        assert_eq!(cache.cleanup().await.unwrap(), 1);
        assert_eq!(cache.cleanup().await.unwrap(), 0);

        let gone: Vec<String> = cache.get("/x", &old.token, 0, 1).await.unwrap();
        let kept: Vec<String> = cache.get("/x", &recent.token, 0, 1).await.unwrap();
        assert!(gone.is_empty());
        assert_eq!(kept, vec!["recent"]);
    }

    #[tokio::test]
    async fn test_cleanup_honours_configured_ttl() {
        let clock = FakeClock::at(T0);
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = cache_at(db, clock.clone(), CacheSettings { ttl_secs: 60, ..Default::default() });
        assert_eq!(cache.ttl(), Duration::from_secs(60));

        cache.store("/x", [1, 2, 3]).await.unwrap();
        clock.set(T0 + 61);
        assert_eq!(cache.cleanup().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let (cache, _) = memory_cache().await;
        let a = cache.store("/x", ["a"]).await.unwrap();
        let b = cache.store("/y", ["b", "c"]).await.unwrap();

        assert_eq!(cache.clear().await.unwrap(), 3);

        let x: Vec<String> = cache.get("/x", &a.token, 0, 10).await.unwrap();
        let y: Vec<String> = cache.get("/y", &b.token, 0, 10).await.unwrap();
        assert!(x.is_empty() && y.is_empty());
    }

    #[tokio::test]
    async fn test_get_racing_clear_sees_all_or_nothing() {
        let (cache, _) = memory_cache().await;
        let stored = cache.store("/x", 0..2000).await.unwrap();

        let (page, cleared) = tokio::join!(cache.get::<u32>("/x", &stored.token, 0, 2000), cache.clear());
        let page = page.unwrap();
        assert_eq!(cleared.unwrap(), 2000);
        assert!(page.is_empty() || page == (0..2000).collect::<Vec<_>>(), "torn page of {} rows", page.len());
    }

    #[tokio::test]
    async fn test_get_racing_cleanup_sees_all_or_nothing() {
        let (cache, clock) = memory_cache().await;
        let stored = cache.store("/x", 0..2000).await.unwrap();
        clock.set(T0 + DEFAULT_TTL_SECS as i64 + 1);

        let (page, expired) = tokio::join!(cache.get::<u32>("/x", &stored.token, 0, 2000), cache.cleanup());
        let page = page.unwrap();
        assert_eq!(expired.unwrap(), 2000);
        assert!(page.is_empty() || page == (0..2000).collect::<Vec<_>>(), "torn page of {} rows", page.len());
    }

    #[tokio::test]
    async fn test_unencodable_item_fails_store_and_drops_rows() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let cache = cache_at(db, FakeClock::at(T0), CacheSettings { insert_batch_size: 2, ..Default::default() });

        let result = cache.store("/x", (0..6).map(Flaky)).await;
        assert!(matches!(result, Err(Error::Encode { index: 3, .. })));

        // batch [0, 1] reached the store before the failure
        let leftover: Vec<u32> = cache.get("/x", "tok-0", 0, 10).await.unwrap();
        assert!(leftover.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_propagates_and_drops_rows() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let store = FlakyStore { fail_on_batch: Some(1), ..FlakyStore::new(db) };
        let cache = cache_at(store, FakeClock::at(T0), CacheSettings { insert_batch_size: 2, ..Default::default() });

        let result = cache.store("/x", 0..10).await;
        assert!(matches!(result, Err(Error::Database(_))));

        let leftover: Vec<u32> = cache.get("/x", "tok-0", 0, 10).await.unwrap();
        assert!(leftover.is_empty());
    }

    #[tokio::test]
    async fn test_failed_compensation_still_reports_original_error() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let store = FlakyStore { fail_on_batch: Some(1), fail_delete: true, ..FlakyStore::new(db) };
        let cache = cache_at(store, FakeClock::at(T0), CacheSettings { insert_batch_size: 2, ..Default::default() });

        let result = cache.store("/x", 0..10).await;
        assert!(matches!(result, Err(Error::Database(_))));

        // partial rows stay until they expire
        let leftover: Vec<u32> = cache.get("/x", "tok-0", 0, 10).await.unwrap();
        assert_eq!(leftover, vec![0, 1]);
    }

    #[tokio::test]
    async fn test_undecodable_row_fails_whole_page() {
        let (cache, _) = memory_cache().await;
        let stored = cache.store("/x", ["a", "b"]).await.unwrap();
        cache
            .store
            .insert(CacheEntry {
                url_hash: url_hash("/x"),
                token: stored.token.clone(),
                index: 2,
                insert_time: T0,
                value: "{not json".to_string(),
            })
            .await
            .unwrap();

        let result = cache.get::<String>("/x", &stored.token, 0, 10).await;
        assert!(matches!(result, Err(Error::Decode { index: 2, .. })));

        let clean: Vec<String> = cache.get("/x", &stored.token, 0, 2).await.unwrap();
        assert_eq!(clean, vec!["a", "b"]);
    }
}
