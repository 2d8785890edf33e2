//! Polygon.io adapter.
//!
//! Polygon serves aggregate bars through a range endpoint with compact field
//! names ({t, o, h, l, c, v}) and millisecond timestamps. Each bar is
//! deserialized individually so a malformed entry drops only that bar;
//! errors arrive as 200 responses with `status: "ERROR"`.

use chrono::{DateTime, Months, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration as StdDuration;
use tracing::{debug, warn};

use super::{ProviderError, HTTP_TIMEOUT_SECS};
use crate::constants::PRICE_DECIMALS;
use crate::models::{Bar, Series, Timeframe};
use crate::utils::round_to;

const BASE_URL: &str = "https://api.polygon.io";

/// How far back the range request reaches.
const RANGE_MONTHS: u32 = 3;

/// Map a timeframe to Polygon's (multiplier, timespan) pair. Timeframes
/// without a native mapping fall back to daily aggregates.
fn range_params(timeframe: Timeframe) -> (u32, &'static str) {
    match timeframe {
        Timeframe::Minute1 => (1, "minute"),
        Timeframe::Minute5 => (5, "minute"),
        Timeframe::Minute15 => (15, "minute"),
        Timeframe::Hour1 => (1, "hour"),
        Timeframe::Week1 => (1, "week"),
        Timeframe::Month1 => (1, "month"),
        Timeframe::Day1 | Timeframe::Hour4 => (1, "day"),
    }
}

#[derive(Debug, Deserialize)]
struct AggregateResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    /// Kept as raw values so one malformed bar drops only that bar, not the
    /// whole series.
    #[serde(default)]
    results: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct AggregateBar {
    /// Bar start, Unix milliseconds.
    t: i64,
    o: f64,
    h: f64,
    l: f64,
    c: f64,
    #[serde(default)]
    v: f64,
}

/// Polygon.io HTTP client.
pub struct PolygonClient {
    client: Client,
    api_key: String,
}

impl PolygonClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    /// Fetch and normalize one series covering the trailing three months.
    pub async fn fetch_series(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> Result<Series, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingApiKey("Polygon.io"));
        }

        let (multiplier, timespan) = range_params(timeframe);
        let from = (now - Months::new(RANGE_MONTHS)).format("%Y-%m-%d");
        let to = now.format("%Y-%m-%d");
        let url = format!(
            "{}/v2/aggs/ticker/{}/range/{}/{}/{}/{}?adjusted=true&sort=asc&limit=1000&apikey={}",
            BASE_URL, symbol, multiplier, timespan, from, to, self.api_key
        );

        debug!(symbol, timeframe = %timeframe, "fetching Polygon series");
        let response = self.client.get(&url).send().await?;
        let payload: Value = response.json().await?;

        parse_response(payload, symbol, timeframe, now)
    }
}

/// Normalize a raw Polygon payload into a [`Series`].
pub fn parse_response(
    payload: Value,
    symbol: &str,
    timeframe: Timeframe,
    now: DateTime<Utc>,
) -> Result<Series, ProviderError> {
    let response: AggregateResponse = serde_json::from_value(payload)?;

    if response.status.as_deref() == Some("ERROR") {
        let message = response
            .error
            .unwrap_or_else(|| "Polygon API error".to_string());
        return Err(ProviderError::InvalidResponse(message));
    }

    let results = match response.results {
        Some(results) if !results.is_empty() => results,
        _ => return Err(ProviderError::NoData(symbol.to_string())),
    };

    let mut bars = Vec::with_capacity(results.len());
    for raw in results {
        let agg: AggregateBar = match serde_json::from_value(raw) {
            Ok(agg) => agg,
            Err(e) => {
                warn!(symbol, error = %e, "skipping malformed aggregate bar");
                continue;
            }
        };
        let Some(time) = DateTime::from_timestamp_millis(agg.t) else {
            warn!(symbol, ms = agg.t, "skipping bar with out-of-range timestamp");
            continue;
        };
        bars.push(Bar::new(
            time,
            round_to(agg.o, PRICE_DECIMALS),
            round_to(agg.h, PRICE_DECIMALS),
            round_to(agg.l, PRICE_DECIMALS),
            round_to(agg.c, PRICE_DECIMALS),
            agg.v.max(0.0) as u64,
        ));
    }

    if bars.is_empty() {
        return Err(ProviderError::NoData(symbol.to_string()));
    }

    Series::from_bars(symbol, timeframe, bars, now)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn aggregates_payload() -> Value {
        json!({
            "ticker": "AAPL",
            "status": "OK",
            "resultsCount": 2,
            "results": [
                { "t": 1704153600000_i64, "o": 187.149, "h": 188.44, "l": 183.885, "c": 185.64, "v": 82488700.0 },
                { "t": 1704240000000_i64, "o": 184.995, "h": 186.40, "l": 183.90, "c": 184.25, "v": 58414500.0 }
            ]
        })
    }

    #[test]
    fn parses_aggregates_with_millisecond_times_and_rounding() {
        let series =
            parse_response(aggregates_payload(), "AAPL", Timeframe::Day1, Utc::now()).unwrap();
        assert_eq!(series.bars.len(), 2);
        // 1704153600000 ms is 1704153600 s.
        assert_eq!(series.bars[0].time.timestamp(), 1_704_153_600);
        // 187.149 rounds to 2 decimals.
        assert_eq!(series.bars[0].open, 187.15);
        assert_eq!(series.current_price, 184.25);
    }

    #[test]
    fn error_status_surfaces_the_api_message() {
        let payload = json!({ "status": "ERROR", "error": "Unknown API Key" });
        let err = parse_response(payload, "AAPL", Timeframe::Day1, Utc::now()).unwrap_err();
        match err {
            ProviderError::InvalidResponse(message) => assert_eq!(message, "Unknown API Key"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_results_map_to_no_data() {
        for payload in [
            json!({ "status": "OK", "results": [] }),
            json!({ "status": "OK" }),
        ] {
            let err = parse_response(payload, "ZZZZ", Timeframe::Day1, Utc::now()).unwrap_err();
            assert!(matches!(err, ProviderError::NoData(_)));
        }
    }

    #[test]
    fn malformed_bars_are_skipped_without_dropping_the_series() {
        let payload = json!({
            "status": "OK",
            "results": [
                { "t": 1704153600000_i64, "o": 187.15, "h": 188.44, "l": 183.89, "c": 185.64, "v": 1000.0 },
                { "t": 1704240000000_i64, "o": "bad", "h": 186.40, "l": 183.90, "c": 184.25, "v": 1000.0 },
                { "t": 1704326400000_i64, "o": null, "h": 186.40, "l": 183.90, "c": 184.25, "v": 1000.0 }
            ]
        });
        let series = parse_response(payload, "AAPL", Timeframe::Day1, Utc::now()).unwrap();
        assert_eq!(series.bars.len(), 1);
        assert_eq!(series.bars[0].close, 185.64);
    }

    #[test]
    fn all_bars_malformed_is_no_data() {
        let payload = json!({
            "status": "OK",
            "results": [
                { "t": 1704240000000_i64, "o": "bad", "h": 186.40, "l": 183.90, "c": 184.25, "v": 1000.0 }
            ]
        });
        let err = parse_response(payload, "AAPL", Timeframe::Day1, Utc::now()).unwrap_err();
        assert!(matches!(err, ProviderError::NoData(_)));
    }

    #[test]
    fn out_of_range_timestamps_are_skipped() {
        let payload = json!({
            "status": "OK",
            "results": [
                { "t": 1704153600000_i64, "o": 187.15, "h": 188.44, "l": 183.89, "c": 185.64, "v": 1000.0 },
                { "t": i64::MAX, "o": 187.15, "h": 188.44, "l": 183.89, "c": 185.64, "v": 1000.0 }
            ]
        });
        let series = parse_response(payload, "AAPL", Timeframe::Day1, Utc::now()).unwrap();
        assert_eq!(series.bars.len(), 1);
    }

    #[test]
    fn missing_volume_defaults_to_zero() {
        let payload = json!({
            "status": "OK",
            "results": [
                { "t": 1704153600000_i64, "o": 187.15, "h": 188.44, "l": 183.89, "c": 185.64 }
            ]
        });
        let series = parse_response(payload, "AAPL", Timeframe::Day1, Utc::now()).unwrap();
        assert_eq!(series.bars[0].volume, 0);
    }
}
