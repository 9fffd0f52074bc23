//! Cache trait for storing fetched stock data.
//!
//! This module defines the [`CacheStore`] trait, a key-value store with
//! per-entry expiration. Values are opaque serialized payloads; the cache
//! layer never interprets them.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Trait for caching serialized stock data payloads.
///
/// Implementations can store data in various backends (SQLite, in-memory,
/// etc.) to avoid repeated API calls. Expiration is passive: an expired
/// entry is a logical miss on [`get`](Self::get) whether or not the backing
/// row still physically exists, and backends may reap expired rows at their
/// own pace via [`invalidate_stale`](Self::invalidate_stale).
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Retrieves the cached value for `key`.
    ///
    /// Returns `Ok(Some(value))` only while the entry has not expired;
    /// an expired or absent entry yields `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Retrieves the cached value for `key` even past its expiry, as long
    /// as the row still physically exists.
    ///
    /// Exists solely to support an explicit stale-on-error fallback;
    /// ordinary reads go through [`get`](Self::get).
    async fn get_stale(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, expiring `ttl` from now.
    ///
    /// Atomically overwrites any existing entry for the same key; readers
    /// never observe a partial write.
    async fn put(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Removes entries whose expiry has passed.
    ///
    /// Returns the number of entries removed.
    async fn invalidate_stale(&self) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
