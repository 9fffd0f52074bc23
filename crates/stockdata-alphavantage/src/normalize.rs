//! Validation and reshaping of raw Alpha Vantage payloads into canonical
//! record types.
//!
//! Overview normalization is lenient: only the identity fields (`Symbol`,
//! `Name`, `Sector`, `Industry`) are required, and every numeric field is
//! independently optional. Missing or unparsable values become `None`, so
//! consumers can distinguish "not reported" from "reported as zero".

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde_json::{Map, Value};
use stockdata_core::{
    AnalystRating, OverviewRecord, Result, SearchResult, StockDataError, Symbol,
};
use tracing::{debug, warn};

/// Identity fields every overview payload must carry.
const REQUIRED_OVERVIEW_FIELDS: &[&str] = &["Symbol", "Name", "Sector", "Industry"];

/// Normalize a raw symbol-search payload into an ordered result list.
///
/// Reads the `bestMatches` list and maps the provider's positional field
/// labels to canonical fields. A match with a missing or unparsable score
/// is dropped rather than defaulted to zero, which would corrupt the sort
/// order. Results are sorted by score descending; ties preserve upstream
/// order. A payload with no match list yields an empty list.
pub fn normalize_search(payload: &Value) -> Result<Vec<SearchResult>> {
    let Some(matches) = payload.get("bestMatches").and_then(Value::as_array) else {
        debug!("No match list in search response");
        return Ok(Vec::new());
    };

    let mut results: Vec<SearchResult> = matches
        .iter()
        .filter_map(|entry| {
            let symbol = entry
                .get("1. symbol")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())?;
            let name = entry.get("2. name").and_then(Value::as_str)?;
            let raw_score = entry.get("9. matchScore").and_then(Value::as_str)?;

            let score = match raw_score.trim().parse::<f64>() {
                Ok(score) if score.is_finite() => score,
                _ => {
                    warn!(symbol, score = raw_score, "Dropping match with unparsable score");
                    return None;
                }
            };

            Some(SearchResult::new(Symbol::new(symbol), name, score))
        })
        .collect();

    // Stable sort keeps upstream order for equal scores.
    results.sort_by(|a, b| {
        b.match_score
            .partial_cmp(&a.match_score)
            .unwrap_or(Ordering::Equal)
    });

    Ok(results)
}

/// Normalize a raw company-overview payload into an [`OverviewRecord`].
///
/// # Errors
/// Returns [`StockDataError::Validation`] if the payload is not a JSON
/// object or any identity field is missing; the error names the missing
/// field(s).
pub fn normalize_overview(payload: &Value) -> Result<OverviewRecord> {
    let Some(object) = payload.as_object() else {
        return Err(StockDataError::Validation(
            "expected a JSON object".to_string(),
        ));
    };

    let missing: Vec<&str> = REQUIRED_OVERVIEW_FIELDS
        .iter()
        .copied()
        .filter(|field| {
            object
                .get(*field)
                .and_then(Value::as_str)
                .is_none_or(str::is_empty)
        })
        .collect();
    if !missing.is_empty() {
        return Err(StockDataError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    let field = |name: &str| object.get(name).and_then(Value::as_str).unwrap_or_default();

    let mut record = OverviewRecord::new(
        Symbol::new(field("Symbol")),
        field("Name"),
        field("Sector"),
        field("Industry"),
    );

    record.description = text_field(object, "Description");

    record.market_cap = parse_number(object, "MarketCapitalization");
    record.high_52week = parse_number(object, "52WeekHigh");
    record.low_52week = parse_number(object, "52WeekLow");
    record.pe_ratio = parse_number(object, "PERatio");
    record.dividend_yield = parse_number(object, "DividendYield");
    record.eps = parse_number(object, "EPS");
    record.revenue = parse_number(object, "RevenueTTM");
    record.profit_margin = parse_number(object, "ProfitMargin");
    record.analyst_target_price = parse_number(object, "AnalystTargetPrice");
    record.beta = parse_number(object, "Beta");

    record.volume = parse_number(object, "Volume");
    record.open = parse_number(object, "Open");
    record.high = parse_number(object, "High");
    record.low = parse_number(object, "Low");
    record.close = parse_number(object, "Close");
    record.latest_trading_day = date_field(object, "LatestTradingDay");

    record.analyst_rating = parse_analyst_rating(object);

    Ok(record)
}

/// Read an optional text field, treating the provider's `"None"` marker and
/// empty strings as absent.
fn text_field(object: &Map<String, Value>, name: &str) -> Option<String> {
    object
        .get(name)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty() && *s != "None")
        .map(str::to_string)
}

/// Parse an optional numeric field.
///
/// Absent fields are quietly `None`; present-but-unparsable values (the
/// provider reports missing numerics as `"None"` or `"-"`) are logged and
/// become `None` instead of zero.
fn parse_number(object: &Map<String, Value>, name: &str) -> Option<f64> {
    let raw = match object.get(name) {
        Some(Value::Number(n)) => return n.as_f64(),
        Some(Value::String(s)) => s.as_str(),
        _ => return None,
    };

    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => {
            warn!(field = name, value = raw, "Invalid numeric value for field");
            None
        }
    }
}

/// Parse an optional date field in the provider's `YYYY-MM-DD` format.
fn date_field(object: &Map<String, Value>, name: &str) -> Option<NaiveDate> {
    let raw = object.get(name).and_then(Value::as_str)?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            warn!(field = name, value = raw, "Invalid date value for field");
            None
        }
    }
}

/// Parse the analyst rating block.
///
/// The record is all-or-nothing: `Some` only when all five counts parse as
/// non-negative integers. Partial blocks are logged and dropped rather than
/// padded with zero counts.
fn parse_analyst_rating(object: &Map<String, Value>) -> Option<AnalystRating> {
    let count = |name: &str| -> Option<u32> {
        match object.get(name)? {
            Value::String(s) => s.trim().parse::<u32>().ok(),
            Value::Number(n) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
            _ => None,
        }
    };

    let fields = [
        "AnalystRatingStrongBuy",
        "AnalystRatingBuy",
        "AnalystRatingHold",
        "AnalystRatingSell",
        "AnalystRatingStrongSell",
    ];
    let counts: Vec<Option<u32>> = fields.iter().map(|name| count(name)).collect();

    if counts.iter().all(Option::is_some) {
        Some(AnalystRating {
            strong_buy: counts[0].unwrap_or_default(),
            buy: counts[1].unwrap_or_default(),
            hold: counts[2].unwrap_or_default(),
            sell: counts[3].unwrap_or_default(),
            strong_sell: counts[4].unwrap_or_default(),
        })
    } else {
        if counts.iter().any(Option::is_some) {
            warn!("Incomplete analyst rating block, dropping");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search_match(symbol: &str, name: &str, score: &str) -> Value {
        json!({
            "1. symbol": symbol,
            "2. name": name,
            "9. matchScore": score
        })
    }

    fn overview_payload() -> Value {
        json!({
            "Symbol": "IBM",
            "Name": "International Business Machines",
            "Sector": "TECHNOLOGY",
            "Industry": "COMPUTER & OFFICE EQUIPMENT",
            "Description": "IBM is an American multinational technology company.",
            "MarketCapitalization": "168177549312",
            "52WeekHigh": "200.94",
            "52WeekLow": "130.68",
            "PERatio": "22.61",
            "DividendYield": "0.0363",
            "EPS": "8.23",
            "RevenueTTM": "61860001792",
            "ProfitMargin": "0.123",
            "AnalystTargetPrice": "181.31",
            "Beta": "0.716",
            "AnalystRatingStrongBuy": "4",
            "AnalystRatingBuy": "5",
            "AnalystRatingHold": "9",
            "AnalystRatingSell": "1",
            "AnalystRatingStrongSell": "0"
        })
    }

    #[test]
    fn test_search_sorted_by_score_descending_with_stable_ties() {
        let payload = json!({
            "bestMatches": [
                search_match("AAA", "Alpha", "0.5"),
                search_match("BBB", "Bravo", "0.9"),
                search_match("CCC", "Charlie", "0.9")
            ]
        });

        let results = normalize_search(&payload).unwrap();
        let symbols: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
        // Equal scores keep upstream order: BBB before CCC.
        assert_eq!(symbols, vec!["BBB", "CCC", "AAA"]);
    }

    #[test]
    fn test_search_drops_unparsable_score() {
        let payload = json!({
            "bestMatches": [
                search_match("AAA", "Alpha", "not-a-number"),
                search_match("BBB", "Bravo", "0.9")
            ]
        });

        let results = normalize_search(&payload).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].symbol.as_str(), "BBB");
    }

    #[test]
    fn test_search_without_match_list_is_empty() {
        let results = normalize_search(&json!({})).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_overview_full_payload() {
        let record = normalize_overview(&overview_payload()).unwrap();

        assert_eq!(record.symbol, Symbol::new("IBM"));
        assert_eq!(record.sector, "TECHNOLOGY");
        assert_eq!(record.market_cap, Some(168_177_549_312.0));
        assert_eq!(record.pe_ratio, Some(22.61));
        assert_eq!(
            record.analyst_rating,
            Some(AnalystRating {
                strong_buy: 4,
                buy: 5,
                hold: 9,
                sell: 1,
                strong_sell: 0
            })
        );
    }

    #[test]
    fn test_overview_missing_sector_is_rejected() {
        let mut payload = overview_payload();
        payload.as_object_mut().unwrap().remove("Sector");

        let err = normalize_overview(&payload).unwrap_err();
        match err {
            StockDataError::Validation(message) => {
                assert!(message.contains("Sector"), "error should name the field");
            }
            other => panic!("expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_overview_non_object_is_rejected() {
        let err = normalize_overview(&json!("not an object")).unwrap_err();
        assert!(matches!(err, StockDataError::Validation(_)));
    }

    #[test]
    fn test_overview_unparsable_numeric_becomes_none_not_zero() {
        let mut payload = overview_payload();
        payload
            .as_object_mut()
            .unwrap()
            .insert("PERatio".to_string(), json!("None"));

        let record = normalize_overview(&payload).unwrap();
        assert_eq!(record.pe_ratio, None);
        // Other numerics are unaffected.
        assert_eq!(record.eps, Some(8.23));
    }

    #[test]
    fn test_overview_absent_quote_fields_are_none() {
        let record = normalize_overview(&overview_payload()).unwrap();
        assert_eq!(record.volume, None);
        assert_eq!(record.close, None);
        assert_eq!(record.latest_trading_day, None);
    }

    #[test]
    fn test_overview_partial_analyst_rating_is_dropped() {
        let mut payload = overview_payload();
        payload
            .as_object_mut()
            .unwrap()
            .remove("AnalystRatingHold");

        let record = normalize_overview(&payload).unwrap();
        assert_eq!(record.analyst_rating, None);
    }

    #[test]
    fn test_overview_none_description_is_absent() {
        let mut payload = overview_payload();
        payload
            .as_object_mut()
            .unwrap()
            .insert("Description".to_string(), json!("None"));

        let record = normalize_overview(&payload).unwrap();
        assert!(record.description.is_none());
    }

    #[test]
    fn test_overview_latest_trading_day_parses() {
        let mut payload = overview_payload();
        payload
            .as_object_mut()
            .unwrap()
            .insert("LatestTradingDay".to_string(), json!("2025-06-24"));

        let record = normalize_overview(&payload).unwrap();
        assert_eq!(
            record.latest_trading_day,
            NaiveDate::from_ymd_opt(2025, 6, 24)
        );
    }
}
