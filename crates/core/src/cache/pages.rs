//! Page rows and the storage seam the paginate cache writes through.
//!
//! Rows are append-only. The only ways a row disappears are whole-generation
//! deletes: by age, by a full clear, or by dropping a generation whose store
//! failed partway through.

use super::connection::CacheDb;
use crate::Error;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;

/// One persisted element of a cached generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub url_hash: String,
    pub token: String,
    pub index: u64,
    pub insert_time: i64,
    /// JSON encoding of the element.
    pub value: String,
}

/// Key-ordered persisted table of cache entries.
///
/// Implementations must keep individual inserts isolated so that two
/// generations written concurrently never interleave within one group.
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Append a single row.
    async fn insert(&self, row: CacheEntry) -> Result<(), Error>;

    /// Append a batch of rows in order.
    async fn insert_many(&self, rows: Vec<CacheEntry>) -> Result<(), Error> {
        for row in rows {
            self.insert(row).await?;
        }
        Ok(())
    }

    /// Values of the rows in `(url_hash, token)` with index in `[lo, hi)`, ordered by index.
    async fn select_range(&self, url_hash: &str, token: &str, lo: u64, hi: u64) -> Result<Vec<String>, Error>;

    /// Delete every row inserted strictly before `cutoff` (epoch seconds).
    async fn delete_older_than(&self, cutoff: i64) -> Result<u64, Error>;

    /// Delete every row of one generation.
    async fn delete_generation(&self, url_hash: &str, token: &str) -> Result<u64, Error>;

    /// Delete every row.
    async fn delete_all(&self) -> Result<u64, Error>;
}

/// SQLite stores indexes as signed integers; anything past `i64::MAX` is unreachable anyway.
fn sql_index(index: u64) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

#[async_trait]
impl PageStore for CacheDb {
    async fn insert(&self, row: CacheEntry) -> Result<(), Error> {
        self.insert_many(vec![row]).await
    }

    /// Writes the whole batch in one transaction; a failure leaves none of it behind.
    async fn insert_many(&self, rows: Vec<CacheEntry>) -> Result<(), Error> {
        if rows.is_empty() {
            return Ok(());
        }

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare_cached(
                        "INSERT INTO page_cache (url_hash, token, result_index, result_value, insert_time)
                        VALUES (?1, ?2, ?3, ?4, ?5)",
                    )?;
                    for row in &rows {
                        stmt.execute(params![row.url_hash, row.token, sql_index(row.index), row.value, row.insert_time])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn select_range(&self, url_hash: &str, token: &str, lo: u64, hi: u64) -> Result<Vec<String>, Error> {
        if lo >= hi {
            return Ok(Vec::new());
        }

        let url_hash = url_hash.to_string();
        let token = token.to_string();
        let (lo, hi) = (sql_index(lo), sql_index(hi));

        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare_cached(
                    "SELECT result_value FROM page_cache
                    WHERE url_hash = ?1 AND token = ?2
                    AND result_index >= ?3 AND result_index < ?4
                    ORDER BY result_index ASC",
                )?;

                let values = stmt
                    .query_map(params![url_hash, token, lo, hi], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(values)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_older_than(&self, cutoff: i64) -> Result<u64, Error> {
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM page_cache WHERE insert_time < ?1", params![cutoff])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_generation(&self, url_hash: &str, token: &str) -> Result<u64, Error> {
        let url_hash = url_hash.to_string();
        let token = token.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute(
                    "DELETE FROM page_cache WHERE url_hash = ?1 AND token = ?2",
                    params![url_hash, token],
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    async fn delete_all(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM page_cache", [])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
