//! No-op cache implementation.

use async_trait::async_trait;
use std::time::Duration;
use stockdata_core::{CacheStore, Result};
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// All reads return `Ok(None)` and all writes return `Ok(())`. Useful for
/// disabling caching or testing code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CacheStore for NoopCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        trace!("NoopCache: get called, returning None");
        Ok(None)
    }

    async fn get_stale(&self, _key: &str) -> Result<Option<String>> {
        trace!("NoopCache: get_stale called, returning None");
        Ok(None)
    }

    async fn put(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<()> {
        trace!("NoopCache: put called, doing nothing");
        Ok(())
    }

    async fn invalidate_stale(&self) -> Result<usize> {
        trace!("NoopCache: invalidate_stale called, returning 0");
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopCache: clear called, doing nothing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_cache_get_returns_none() {
        let cache = NoopCache::new();
        cache
            .put("OVERVIEW_AAPL", "{}", Duration::from_secs(3600))
            .await
            .unwrap();

        assert!(cache.get("OVERVIEW_AAPL").await.unwrap().is_none());
        assert!(cache.get_stale("OVERVIEW_AAPL").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_noop_cache_management() {
        let cache = NoopCache::new();

        assert_eq!(cache.invalidate_stale().await.unwrap(), 0);
        assert!(cache.clear().await.is_ok());
    }

    #[test]
    fn test_noop_cache_is_copy() {
        let cache1 = NoopCache::new();
        let cache2 = cache1; // Copy
        let _cache3 = cache2; // Still works because Copy
    }
}
