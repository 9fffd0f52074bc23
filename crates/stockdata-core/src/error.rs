//! Error types for stock data operations.
//!
//! This module defines [`StockDataError`] which covers all error cases that
//! can occur when fetching, normalizing, or caching stock data.

use thiserror::Error;

/// Errors that can occur during stock data operations.
#[derive(Error, Debug)]
pub enum StockDataError {
    /// Network-related errors (connection failures, timeouts, non-2xx responses).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The upstream provider signaled quota exhaustion or demo-key throttling.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying, when the provider gave one.
        retry_after: Option<std::time::Duration>,
    },

    /// The upstream provider returned a structured error payload
    /// (e.g. an unknown symbol or an explicit error message).
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Normalization rejected the payload as malformed or incomplete.
    /// The message carries field-level detail.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error reading from or writing to the cache backend.
    #[error("Cache error: {0}")]
    Cache(String),

    /// API credentials are missing or could not be resolved.
    #[error("API key not configured: {0}")]
    NotConfigured(String),
}

/// Result type alias using [`StockDataError`].
pub type Result<T> = std::result::Result<T, StockDataError>;
