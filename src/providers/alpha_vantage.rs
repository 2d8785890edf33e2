//! Alpha Vantage adapter.
//!
//! Alpha Vantage returns OHLC bars as date-keyed JSON maps under a top-level
//! key whose exact name varies by endpoint ("Time Series (Daily)",
//! "Time Series (5min)", ...). Errors come back as 200 responses with an
//! "Error Message", "Note", or "Information" field, so response handling is
//! defensive throughout: the payload is probed as `serde_json::Value` before
//! any bar parsing happens.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration as StdDuration;
use tracing::{debug, warn};

use super::{ProviderError, HTTP_TIMEOUT_SECS};
use crate::models::{Bar, Series, Timeframe};

const BASE_URL: &str = "https://www.alphavantage.co/query";

/// Map a timeframe to the Alpha Vantage query function. Timeframes without a
/// native endpoint fall back to the daily series.
fn function_query(timeframe: Timeframe) -> &'static str {
    match timeframe {
        Timeframe::Minute1 => "function=TIME_SERIES_INTRADAY&interval=1min",
        Timeframe::Minute5 => "function=TIME_SERIES_INTRADAY&interval=5min",
        Timeframe::Minute15 => "function=TIME_SERIES_INTRADAY&interval=15min",
        Timeframe::Hour1 => "function=TIME_SERIES_INTRADAY&interval=60min",
        Timeframe::Week1 => "function=TIME_SERIES_WEEKLY",
        Timeframe::Month1 => "function=TIME_SERIES_MONTHLY",
        Timeframe::Day1 | Timeframe::Hour4 => "function=TIME_SERIES_DAILY",
    }
}

/// Alpha Vantage HTTP client.
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(StdDuration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            api_key: api_key.into(),
        })
    }

    /// Fetch and normalize one series. `now` stamps the series metadata.
    pub async fn fetch_series(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> Result<Series, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingApiKey("Alpha Vantage"));
        }

        let url = format!(
            "{}?{}&symbol={}&apikey={}&outputsize=compact",
            BASE_URL,
            function_query(timeframe),
            symbol,
            self.api_key
        );

        debug!(symbol, timeframe = %timeframe, "fetching Alpha Vantage series");
        let response = self.client.get(&url).send().await?;
        let payload: Value = response.json().await?;

        parse_response(&payload, symbol, timeframe, now)
    }
}

/// Normalize a raw Alpha Vantage payload into a [`Series`].
///
/// Kept separate from the HTTP path so it can be exercised against fixture
/// payloads without a network.
pub fn parse_response(
    payload: &Value,
    symbol: &str,
    timeframe: Timeframe,
    now: DateTime<Utc>,
) -> Result<Series, ProviderError> {
    if payload.get("Error Message").is_some() {
        return Err(ProviderError::InvalidSymbol(symbol.to_string()));
    }
    if let Some(note) = payload.get("Note").and_then(Value::as_str) {
        return Err(ProviderError::RateLimit(note.to_string()));
    }
    if let Some(info) = payload.get("Information").and_then(Value::as_str) {
        return Err(ProviderError::RateLimit(info.to_string()));
    }

    let object = payload
        .as_object()
        .ok_or_else(|| ProviderError::InvalidResponse("payload is not an object".to_string()))?;

    let time_series = object
        .iter()
        .find(|(key, _)| key.contains("Time Series"))
        .and_then(|(_, value)| value.as_object())
        .ok_or_else(|| {
            ProviderError::InvalidResponse("no time series data found".to_string())
        })?;

    // Date keys arrive newest-first; sort so bars are chronological.
    let mut dates: Vec<&String> = time_series.keys().collect();
    dates.sort();

    let mut bars = Vec::with_capacity(dates.len());
    for date in dates {
        let Some(entry) = time_series[date].as_object() else {
            continue;
        };
        let Some(time) = parse_timestamp(date) else {
            warn!(symbol, date = %date, "skipping bar with unparseable timestamp");
            continue;
        };

        let open = field_f64(entry, "1. open");
        let high = field_f64(entry, "2. high");
        let low = field_f64(entry, "3. low");
        let close = field_f64(entry, "4. close");
        let (Some(open), Some(high), Some(low), Some(close)) = (open, high, low, close) else {
            warn!(symbol, date = %date, "skipping bar with missing OHLC fields");
            continue;
        };

        // Daily payloads use "5. volume"; adjusted variants use "6. volume".
        let volume = field_f64(entry, "5. volume")
            .or_else(|| field_f64(entry, "6. volume"))
            .unwrap_or(0.0) as u64;

        bars.push(Bar::new(time, open, high, low, close, volume));
    }

    if bars.is_empty() {
        return Err(ProviderError::NoData(symbol.to_string()));
    }

    Series::from_bars(symbol, timeframe, bars, now)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

/// Numeric fields come back as JSON strings ("150.25").
fn field_f64(entry: &serde_json::Map<String, Value>, key: &str) -> Option<f64> {
    entry.get(key)?.as_str()?.parse().ok()
}

/// Daily endpoints key bars by date, intraday ones by date-time.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn daily_payload() -> Value {
        json!({
            "Meta Data": { "2. Symbol": "AAPL" },
            "Time Series (Daily)": {
                "2024-01-03": {
                    "1. open": "185.00", "2. high": "186.40",
                    "3. low": "183.90", "4. close": "184.25",
                    "5. volume": "58414500"
                },
                "2024-01-02": {
                    "1. open": "187.15", "2. high": "188.44",
                    "3. low": "183.89", "4. close": "185.64",
                    "5. volume": "82488700"
                }
            }
        })
    }

    #[test]
    fn parses_daily_payload_in_chronological_order() {
        let series =
            parse_response(&daily_payload(), "AAPL", Timeframe::Day1, Utc::now()).unwrap();
        assert_eq!(series.bars.len(), 2);
        assert!(series.bars[0].time < series.bars[1].time);
        assert_eq!(series.bars[0].close, 185.64);
        assert_eq!(series.current_price, 184.25);
        assert_eq!(series.volume, 58_414_500);
    }

    #[test]
    fn error_message_maps_to_invalid_symbol() {
        let payload = json!({ "Error Message": "Invalid API call." });
        let err = parse_response(&payload, "NOPE", Timeframe::Day1, Utc::now()).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidSymbol(s) if s == "NOPE"));
    }

    #[test]
    fn note_and_information_map_to_rate_limit() {
        for key in ["Note", "Information"] {
            let payload = json!({ key: "Thank you for using Alpha Vantage!" });
            let err = parse_response(&payload, "AAPL", Timeframe::Day1, Utc::now()).unwrap_err();
            assert!(matches!(err, ProviderError::RateLimit(_)));
        }
    }

    #[test]
    fn missing_time_series_is_invalid_response() {
        let payload = json!({ "Meta Data": {} });
        let err = parse_response(&payload, "AAPL", Timeframe::Day1, Utc::now()).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn malformed_bars_are_skipped() {
        let payload = json!({
            "Time Series (Daily)": {
                "2024-01-02": {
                    "1. open": "187.15", "2. high": "188.44",
                    "3. low": "183.89", "4. close": "185.64",
                    "5. volume": "82488700"
                },
                "2024-01-03": {
                    "1. open": "not-a-number", "2. high": "186.40",
                    "3. low": "183.90", "4. close": "184.25",
                    "5. volume": "58414500"
                }
            }
        });
        let series = parse_response(&payload, "AAPL", Timeframe::Day1, Utc::now()).unwrap();
        assert_eq!(series.bars.len(), 1);
    }

    #[test]
    fn all_bars_malformed_is_no_data() {
        let payload = json!({
            "Time Series (Daily)": {
                "2024-01-03": { "1. open": "x" }
            }
        });
        let err = parse_response(&payload, "AAPL", Timeframe::Day1, Utc::now()).unwrap_err();
        assert!(matches!(err, ProviderError::NoData(_)));
    }

    #[test]
    fn intraday_timestamps_are_parsed() {
        let payload = json!({
            "Time Series (5min)": {
                "2024-01-03 15:55:00": {
                    "1. open": "185.00", "2. high": "186.40",
                    "3. low": "183.90", "4. close": "184.25",
                    "5. volume": "120000"
                }
            }
        });
        let series =
            parse_response(&payload, "AAPL", Timeframe::Minute5, Utc::now()).unwrap();
        assert_eq!(series.bars.len(), 1);
    }

    #[test]
    fn empty_api_key_is_rejected_before_any_request() {
        let client = AlphaVantageClient::new("").unwrap();
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let err = rt
            .block_on(client.fetch_series("AAPL", Timeframe::Day1, Utc::now()))
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingApiKey(_)));
    }
}
