//! Provider trait for fetching stock data.
//!
//! This module defines [`StockProvider`], the seam between the cached
//! service layer and a concrete upstream API client.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{OverviewRecord, SearchResult, Symbol},
};

/// Trait for fetching and normalizing stock data from an upstream provider.
///
/// Implementations perform a single request per invocation and surface
/// transport, rate-limit, and upstream failures as classified errors;
/// retry policy is the caller's concern.
#[async_trait]
pub trait StockProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Alpha Vantage").
    fn name(&self) -> &str;

    /// Searches for symbols matching `query`.
    ///
    /// Returns matches sorted by relevance score descending; a query with
    /// no matches yields an empty list, not an error.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>>;

    /// Fetches the company overview for `symbol`.
    async fn overview(&self, symbol: &Symbol) -> Result<OverviewRecord>;
}
