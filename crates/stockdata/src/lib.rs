#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockdata-rs/stockdata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Cached stock search and company overview data.
//!
//! This crate provides a read-through cache over an upstream stock data
//! provider. It re-exports core types, the cache implementations, and the
//! Alpha Vantage client, and provides [`StockService`] as the high-level
//! entry point.
//!
//! # Features
//!
//! - `cache-sqlite` - SQLite-based persistent caching (default)
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stockdata::{AlphaVantageClient, ApiCredentials, InMemoryCache, StockService};
//!
//! #[tokio::main]
//! async fn main() -> stockdata::Result<()> {
//!     let provider = AlphaVantageClient::new(ApiCredentials::from_env("ALPHA_VANTAGE_API_KEY"));
//!     let service = StockService::new(Arc::new(provider), Arc::new(InMemoryCache::new()));
//!
//!     let matches = service.search("tesco").await?;
//!     println!("{} matches", matches.len());
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use stockdata_core::*;

// Cache implementations
#[cfg(feature = "cache-sqlite")]
pub use stockdata_cache::SqliteCache;
pub use stockdata_cache::{InMemoryCache, NoopCache};

// Provider
pub use stockdata_alphavantage::{AlphaVantageClient, normalize_overview, normalize_search};

mod service;
pub use service::{DEFAULT_TTL, ReadThroughCache, StockService};
