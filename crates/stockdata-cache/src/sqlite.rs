//! SQLite-based cache implementation.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;
use stockdata_core::{CacheStore, Result, StockDataError};
use tracing::{debug, instrument};

/// SQLite-based cache for stock data payloads.
///
/// This cache stores entries in a SQLite database file, providing
/// persistence across application restarts. Expiry timestamps are stored
/// as Unix epoch seconds; `INSERT OR REPLACE` keeps per-key overwrites
/// atomic.
#[derive(Debug)]
pub struct SqliteCache {
    conn: Mutex<Connection>,
}

impl SqliteCache {
    /// Create a new SQLite cache at the given path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or schema creation fails.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path).map_err(|e| StockDataError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory SQLite cache.
    ///
    /// Useful for testing; data is lost when the cache is dropped.
    ///
    /// # Errors
    /// Returns an error if schema creation fails.
    pub fn in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| StockDataError::Cache(e.to_string()))?;
        let cache = Self {
            conn: Mutex::new(conn),
        };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StockDataError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS cache_entries (
                cache_key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                expires_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|e| StockDataError::Cache(e.to_string()))?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cache_entries_expires_at
             ON cache_entries(expires_at)",
            [],
        )
        .map_err(|e| StockDataError::Cache(e.to_string()))?;

        debug!("SQLite cache schema initialized");
        Ok(())
    }
}

#[async_trait]
impl CacheStore for SqliteCache {
    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Utc::now().timestamp();

        let conn = self
            .conn
            .lock()
            .map_err(|e| StockDataError::Cache(e.to_string()))?;

        let result = conn
            .query_row(
                "SELECT value FROM cache_entries
                 WHERE cache_key = ?1 AND expires_at > ?2",
                params![key, now],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| StockDataError::Cache(e.to_string()))?;

        match &result {
            Some(_) => debug!("Cache hit"),
            None => debug!("Cache miss"),
        }
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn get_stale(&self, key: &str) -> Result<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StockDataError::Cache(e.to_string()))?;

        conn.query_row(
            "SELECT value FROM cache_entries WHERE cache_key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| StockDataError::Cache(e.to_string()))
    }

    #[instrument(skip(self, value))]
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let expires_at = Utc::now()
            .timestamp()
            .saturating_add(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX));

        let conn = self
            .conn
            .lock()
            .map_err(|e| StockDataError::Cache(e.to_string()))?;

        conn.execute(
            "INSERT OR REPLACE INTO cache_entries (cache_key, value, expires_at)
             VALUES (?1, ?2, ?3)",
            params![key, value, expires_at],
        )
        .map_err(|e| StockDataError::Cache(e.to_string()))?;

        debug!("Cached {} bytes", value.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self) -> Result<usize> {
        let now = Utc::now().timestamp();

        let conn = self
            .conn
            .lock()
            .map_err(|e| StockDataError::Cache(e.to_string()))?;

        let deleted = conn
            .execute(
                "DELETE FROM cache_entries WHERE expires_at <= ?1",
                params![now],
            )
            .map_err(|e| StockDataError::Cache(e.to_string()))?;

        if deleted > 0 {
            debug!("Invalidated {} expired cache entries", deleted);
        }
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| StockDataError::Cache(e.to_string()))?;

        conn.execute("DELETE FROM cache_entries", [])
            .map_err(|e| StockDataError::Cache(e.to_string()))?;

        debug!("Cleared all cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_sqlite_cache_initialization() {
        let cache = SqliteCache::in_memory();
        assert!(cache.is_ok());
    }

    #[tokio::test]
    async fn test_sqlite_cache_roundtrip() {
        let cache = SqliteCache::in_memory().unwrap();

        // Initially no data
        assert!(cache.get("OVERVIEW_AAPL").await.unwrap().is_none());

        cache
            .put("OVERVIEW_AAPL", r#"{"symbol":"AAPL"}"#, TTL)
            .await
            .unwrap();

        let result = cache.get("OVERVIEW_AAPL").await.unwrap();
        assert_eq!(result.as_deref(), Some(r#"{"symbol":"AAPL"}"#));
    }

    #[tokio::test]
    async fn test_sqlite_cache_expired_row_is_logical_miss() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.put("SEARCH_ibm", "[]", Duration::ZERO).await.unwrap();

        // The row still exists physically but reads behave as a miss.
        assert!(cache.get("SEARCH_ibm").await.unwrap().is_none());
        assert_eq!(
            cache.get_stale("SEARCH_ibm").await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_sqlite_cache_overwrite_is_atomic_per_key() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.put("OVERVIEW_IBM", "old", TTL).await.unwrap();
        cache.put("OVERVIEW_IBM", "new", TTL).await.unwrap();

        assert_eq!(
            cache.get("OVERVIEW_IBM").await.unwrap().as_deref(),
            Some("new")
        );
    }

    #[tokio::test]
    async fn test_sqlite_cache_invalidate_stale_reaps_only_expired() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.put("fresh", "a", TTL).await.unwrap();
        cache.put("stale", "b", Duration::ZERO).await.unwrap();

        let removed = cache.invalidate_stale().await.unwrap();
        assert_eq!(removed, 1);
        assert!(cache.get_stale("stale").await.unwrap().is_none());
        assert!(cache.get("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_sqlite_cache_clear() {
        let cache = SqliteCache::in_memory().unwrap();
        cache.put("SEARCH_ibm", "[]", TTL).await.unwrap();

        cache.clear().await.unwrap();

        assert!(cache.get_stale("SEARCH_ibm").await.unwrap().is_none());
    }
}
