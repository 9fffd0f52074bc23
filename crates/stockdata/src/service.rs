//! Read-through caching over an upstream stock data provider.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use stockdata_core::{
    CacheStore, OverviewRecord, Result, SearchResult, StockProvider, Symbol,
};

/// Default entry lifetime for cached search and overview payloads.
///
/// One hour, by convention; the upstream provides no cache-control metadata
/// to derive a lifetime from.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Read-through cache over a [`CacheStore`].
///
/// On a hit the cached value is returned as-is, with no upstream
/// revalidation. On a miss the supplied fetch operation runs, its result is
/// stored under the key with the given TTL, and returned. Fetch failures
/// propagate to the caller and are never cached; cache backend failures are
/// absorbed here (a failed read degrades to a miss, a failed write to a
/// logged no-op) and never reach the caller.
pub struct ReadThroughCache {
    store: Arc<dyn CacheStore>,
    serve_stale: bool,
    dedup: bool,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl std::fmt::Debug for ReadThroughCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadThroughCache")
            .field("serve_stale", &self.serve_stale)
            .field("dedup", &self.dedup)
            .finish()
    }
}

impl ReadThroughCache {
    /// Create a new read-through cache over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            serve_stale: false,
            dedup: false,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Serve the last cached value, even past its expiry, when a fresh
    /// fetch fails. Every stale serve is logged.
    #[must_use]
    pub fn with_stale_fallback(mut self) -> Self {
        self.serve_stale = true;
        self
    }

    /// Collapse concurrent misses for the same key into a single upstream
    /// call. Without this, concurrent misses race benignly and the last
    /// write wins.
    #[must_use]
    pub fn with_inflight_dedup(mut self) -> Self {
        self.dedup = true;
        self
    }

    /// Return the cached value for `key` if fresh, otherwise run `fetch`,
    /// store its result under `key` with `ttl`, and return it.
    pub async fn read_through<T, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.lookup(key).await {
            return Ok(value);
        }

        if self.dedup {
            let lock = self.key_lock(key).await;
            let guard = lock.lock().await;
            // Another caller may have populated the entry while we waited.
            let result = match self.lookup(key).await {
                Some(value) => Ok(value),
                None => self.fetch_and_store(key, ttl, fetch).await,
            };
            drop(guard);
            drop(lock);
            self.release_key_lock(key).await;
            result
        } else {
            self.fetch_and_store(key, ttl, fetch).await
        }
    }

    async fn fetch_and_store<T, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        debug!(key, "Cache miss, fetching upstream");
        match fetch().await {
            Ok(value) => {
                match serde_json::to_string(&value) {
                    Ok(raw) => {
                        if let Err(e) = self.store.put(key, &raw, ttl).await {
                            warn!(key, error = %e, "Failed to cache fetched value");
                        }
                    }
                    Err(e) => warn!(key, error = %e, "Failed to serialize value for caching"),
                }
                Ok(value)
            }
            Err(e) => {
                if self.serve_stale {
                    if let Some(value) = self.stale_lookup(key).await {
                        warn!(key, error = %e, "Serving stale data after fetch failure");
                        return Ok(value);
                    }
                }
                Err(e)
            }
        }
    }

    /// Fresh read; cache errors and undeserializable entries degrade to a miss.
    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let cached = match self.store.get(key).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed, treating as miss");
                None
            }
        };
        let raw = cached?;

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "Undeserializable cache entry, treating as miss");
                None
            }
        }
    }

    async fn stale_lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get_stale(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "Stale cache read failed");
                return None;
            }
        };
        serde_json::from_str(&raw).ok()
    }

    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        inflight.entry(key.to_string()).or_default().clone()
    }

    async fn release_key_lock(&self, key: &str) {
        let mut inflight = self.inflight.lock().await;
        if let Some(lock) = inflight.get(key) {
            // Last holder out removes the slot; the map stays bounded by
            // keys with in-flight fetches.
            if Arc::strong_count(lock) == 1 {
                inflight.remove(key);
            }
        }
    }
}

/// High-level cached access to stock search and company overview data.
///
/// Composes an upstream [`StockProvider`] with a [`ReadThroughCache`];
/// cache keys are derived from the request type and its normalized
/// parameters, and both operations share one TTL.
pub struct StockService {
    provider: Arc<dyn StockProvider>,
    cache: ReadThroughCache,
    ttl: Duration,
}

impl std::fmt::Debug for StockService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockService")
            .field("provider", &self.provider.name())
            .field("cache", &self.cache)
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl StockService {
    /// Create a new service over the given provider and cache store.
    #[must_use]
    pub fn new(provider: Arc<dyn StockProvider>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            provider,
            cache: ReadThroughCache::new(store),
            ttl: DEFAULT_TTL,
        }
    }

    /// Override the entry lifetime applied to both operations.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Enable the stale-on-error fallback (see
    /// [`ReadThroughCache::with_stale_fallback`]).
    #[must_use]
    pub fn with_stale_fallback(mut self) -> Self {
        self.cache = self.cache.with_stale_fallback();
        self
    }

    /// Enable in-flight request deduplication (see
    /// [`ReadThroughCache::with_inflight_dedup`]).
    #[must_use]
    pub fn with_inflight_dedup(mut self) -> Self {
        self.cache = self.cache.with_inflight_dedup();
        self
    }

    /// Search for symbols matching `query`, serving from cache when fresh.
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let key = search_cache_key(query);
        self.cache
            .read_through(&key, self.ttl, || self.provider.search(query))
            .await
    }

    /// Fetch the company overview for `symbol`, serving from cache when fresh.
    pub async fn overview(&self, symbol: &Symbol) -> Result<OverviewRecord> {
        let key = overview_cache_key(symbol);
        self.cache
            .read_through(&key, self.ttl, || self.provider.overview(symbol))
            .await
    }
}

/// Cache key for a search request. Queries differing only in case or
/// surrounding whitespace share an entry.
fn search_cache_key(query: &str) -> String {
    format!("SEARCH_{}", query.trim().to_lowercase())
}

/// Cache key for an overview request. The symbol is already uppercased.
fn overview_cache_key(symbol: &Symbol) -> String {
    format!("OVERVIEW_{symbol}")
}
