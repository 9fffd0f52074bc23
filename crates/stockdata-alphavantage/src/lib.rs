#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockdata-rs/stockdata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Alpha Vantage data provider.
//!
//! This crate implements the `stockdata-core` provider trait for the
//! [Alpha Vantage](https://www.alphavantage.co/) API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use stockdata_alphavantage::AlphaVantageClient;
//! use stockdata_core::{ApiCredentials, StockProvider, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AlphaVantageClient::new(ApiCredentials::from_env("ALPHA_VANTAGE_API_KEY"));
//!
//!     let matches = client.search("tesco").await?;
//!     let overview = client.overview(&Symbol::new("IBM")).await?;
//!
//!     Ok(())
//! }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use stockdata_core::{
    ApiCredentials, OverviewRecord, Result, SearchResult, StockDataError, StockProvider, Symbol,
};

/// Response normalization for Alpha Vantage payloads.
pub mod normalize;

pub use normalize::{normalize_overview, normalize_search};

/// Base URL for the Alpha Vantage API.
const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co";

/// Bound on upstream request latency; a timeout surfaces as a transport error.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider name used in errors and logging.
const PROVIDER_NAME: &str = "Alpha Vantage";

/// Alpha Vantage data provider.
///
/// Provides access to:
/// - Symbol search (`SYMBOL_SEARCH`)
/// - Company overview with fundamentals (`OVERVIEW`)
///
/// Each call performs exactly one upstream request; there is no retry.
/// Degraded-service signals embedded in 200 responses (error messages,
/// demo-key and quota notices) are classified as failures, never passed
/// through as data.
pub struct AlphaVantageClient {
    client: reqwest::Client,
    credentials: ApiCredentials,
    base_url: String,
}

impl fmt::Debug for AlphaVantageClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlphaVantageClient")
            .field("base_url", &self.base_url)
            .field("credentials", &"[REDACTED]")
            .finish()
    }
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client with the given credentials.
    #[must_use]
    pub fn new(credentials: ApiCredentials) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            credentials,
            base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
        }
    }

    /// Create a new Alpha Vantage client with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, credentials: ApiCredentials) -> Self {
        Self {
            client,
            credentials,
            base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
        }
    }

    /// Override the API base URL (primarily for tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Issue a single GET for the named API function and parse the JSON body.
    ///
    /// One attempt per invocation; callers own any retry policy.
    async fn fetch(&self, function: &str, params: &[(&str, &str)]) -> Result<Value> {
        let api_key = self.credentials.api_key().await?;
        let url = format!("{}/query", self.base_url);
        tracing::debug!(function, "Alpha Vantage request");

        let response = self
            .client
            .get(&url)
            .query(&[("function", function)])
            .query(params)
            .query(&[("apikey", api_key)])
            .send()
            .await
            .map_err(|e| StockDataError::Transport(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(StockDataError::RateLimited {
                provider: PROVIDER_NAME.to_string(),
                retry_after: None,
            });
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(StockDataError::Transport(format!("HTTP {status}: {text}")));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| StockDataError::Transport(e.to_string()))?;

        classify_degraded(&payload)?;
        Ok(payload)
    }

    /// Fetch the raw payload for a symbol search.
    pub async fn search_raw(&self, keywords: &str) -> Result<Value> {
        self.fetch("SYMBOL_SEARCH", &[("keywords", keywords)]).await
    }

    /// Fetch the raw payload for a company overview.
    pub async fn overview_raw(&self, symbol: &Symbol) -> Result<Value> {
        let payload = self.fetch("OVERVIEW", &[("symbol", symbol.as_str())]).await?;

        // Alpha Vantage answers an unknown symbol with an empty object.
        if payload.as_object().is_some_and(serde_json::Map::is_empty) {
            return Err(StockDataError::Upstream(format!(
                "empty overview response for {symbol}"
            )));
        }
        Ok(payload)
    }
}

#[async_trait]
impl StockProvider for AlphaVantageClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let payload = self.search_raw(query).await?;
        normalize_search(&payload)
    }

    async fn overview(&self, symbol: &Symbol) -> Result<OverviewRecord> {
        let payload = self.overview_raw(symbol).await?;
        normalize_overview(&payload)
    }
}

/// Classify degraded-service signals embedded in an otherwise-200 response.
///
/// - `"Error Message"` is the upstream's structured error (unknown symbol,
///   bad parameters).
/// - `"Note"` is its classic throttle notice.
/// - `"Information"` mentioning the demo key or request quotas is a
///   rate-limit signal; any other `"Information"` body is still a failure,
///   not data.
fn classify_degraded(payload: &Value) -> Result<()> {
    if let Some(message) = payload.get("Error Message").and_then(Value::as_str) {
        return Err(StockDataError::Upstream(message.to_string()));
    }

    if let Some(note) = payload.get("Note").and_then(Value::as_str) {
        tracing::debug!(note, "Upstream throttle notice");
        return Err(StockDataError::RateLimited {
            provider: PROVIDER_NAME.to_string(),
            retry_after: None,
        });
    }

    if let Some(info) = payload.get("Information").and_then(Value::as_str) {
        let lowered = info.to_lowercase();
        if lowered.contains("demo")
            || lowered.contains("rate limit")
            || lowered.contains("requests per")
        {
            return Err(StockDataError::RateLimited {
                provider: PROVIDER_NAME.to_string(),
                retry_after: None,
            });
        }
        return Err(StockDataError::Upstream(info.to_string()));
    }

    Ok(())
}
