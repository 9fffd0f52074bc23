//! Core data types for stock search and company overview data.
//!
//! This module defines the canonical record shapes:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`SearchResult`] - A single symbol search match
//! - [`OverviewRecord`] - Company overview with fundamentals
//! - [`AnalystRating`] - Analyst recommendation counts

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A single match from a symbol search.
///
/// Search results are always ordered by [`match_score`](Self::match_score)
/// descending; ties preserve the upstream order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The matched trading symbol.
    pub symbol: Symbol,
    /// Company name for the match.
    pub name: String,
    /// Relevance score in `[0, 1]`; used only for ordering.
    pub match_score: f64,
}

impl SearchResult {
    /// Creates a new search result.
    #[must_use]
    pub fn new(symbol: Symbol, name: impl Into<String>, match_score: f64) -> Self {
        Self {
            symbol,
            name: name.into(),
            match_score,
        }
    }
}

/// Analyst recommendation counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalystRating {
    /// Number of strong-buy recommendations.
    pub strong_buy: u32,
    /// Number of buy recommendations.
    pub buy: u32,
    /// Number of hold recommendations.
    pub hold: u32,
    /// Number of sell recommendations.
    pub sell: u32,
    /// Number of strong-sell recommendations.
    pub strong_sell: u32,
}

/// Company overview with fundamentals.
///
/// Identity fields are always present; every numeric field is `None` when the
/// upstream did not report it or reported an unparsable value, so consumers
/// can distinguish "not reported" from "reported as zero".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewRecord {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Company name.
    pub name: String,
    /// Business sector.
    pub sector: String,
    /// Industry within the sector.
    pub industry: String,
    /// Business description.
    pub description: Option<String>,

    // Valuation
    /// Market capitalization.
    pub market_cap: Option<f64>,
    /// 52-week high price.
    pub high_52week: Option<f64>,
    /// 52-week low price.
    pub low_52week: Option<f64>,
    /// Price-to-earnings ratio.
    pub pe_ratio: Option<f64>,
    /// Dividend yield.
    pub dividend_yield: Option<f64>,
    /// Earnings per share.
    pub eps: Option<f64>,
    /// Trailing twelve-month revenue.
    pub revenue: Option<f64>,
    /// Net profit margin.
    pub profit_margin: Option<f64>,
    /// Mean analyst target price.
    pub analyst_target_price: Option<f64>,
    /// Beta coefficient.
    pub beta: Option<f64>,

    // Quote-level fields, present only when the payload carries them
    /// Trading volume.
    pub volume: Option<f64>,
    /// Opening price.
    pub open: Option<f64>,
    /// Session high price.
    pub high: Option<f64>,
    /// Session low price.
    pub low: Option<f64>,
    /// Closing price.
    pub close: Option<f64>,
    /// Most recent trading day.
    pub latest_trading_day: Option<NaiveDate>,

    /// Analyst recommendation counts, when the payload carries a complete block.
    pub analyst_rating: Option<AnalystRating>,

    /// When this record was normalized; freshness display only, not cache policy.
    pub last_updated: DateTime<Utc>,
}

impl OverviewRecord {
    /// Creates a new overview record with the required identity fields.
    ///
    /// All optional fields start as `None` and `last_updated` is set to now.
    #[must_use]
    pub fn new(
        symbol: Symbol,
        name: impl Into<String>,
        sector: impl Into<String>,
        industry: impl Into<String>,
    ) -> Self {
        Self {
            symbol,
            name: name.into(),
            sector: sector.into(),
            industry: industry.into(),
            last_updated: Utc::now(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_uppercases() {
        let symbol = Symbol::new("aapl");
        assert_eq!(symbol.as_str(), "AAPL");
        assert_eq!(symbol.to_string(), "AAPL");
    }

    #[test]
    fn test_symbol_from_str() {
        let symbol: Symbol = "msft".parse().unwrap();
        assert_eq!(symbol, Symbol::new("MSFT"));
    }

    #[test]
    fn test_overview_record_new_leaves_numerics_unset() {
        let record = OverviewRecord::new(Symbol::new("IBM"), "IBM", "Technology", "IT Services");
        assert_eq!(record.market_cap, None);
        assert_eq!(record.pe_ratio, None);
        assert_eq!(record.analyst_rating, None);
        assert!(record.description.is_none());
    }

    #[test]
    fn test_overview_record_serde_roundtrip() {
        let mut record =
            OverviewRecord::new(Symbol::new("IBM"), "IBM", "Technology", "IT Services");
        record.market_cap = Some(1.2e11);
        record.analyst_rating = Some(AnalystRating {
            strong_buy: 4,
            buy: 8,
            hold: 5,
            sell: 1,
            strong_sell: 0,
        });

        let json = serde_json::to_string(&record).unwrap();
        let back: OverviewRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
