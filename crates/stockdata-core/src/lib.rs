#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockdata-rs/stockdata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for cached stock data access.
//!
//! This crate provides the foundational abstractions:
//!
//! - [`StockProvider`](provider::StockProvider) - Upstream fetch + normalize seam
//! - [`CacheStore`](cache::CacheStore) - Key-value cache with per-entry expiration
//! - [`StockDataError`](error::StockDataError) - Error taxonomy
//! - [`ApiCredentials`](config::ApiCredentials) - Resolve-once credential handling

/// Cache trait for storing fetched data.
pub mod cache;
/// API credential configuration.
pub mod config;
/// Error types for stock data operations.
pub mod error;
/// Provider trait for fetching stock data.
pub mod provider;
/// Core data types (Symbol, SearchResult, OverviewRecord).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::CacheStore;
pub use config::{ApiCredentials, KeySource};
pub use error::{Result, StockDataError};
pub use provider::StockProvider;
pub use types::{AnalystRating, OverviewRecord, SearchResult, Symbol};
