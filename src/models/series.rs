use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::SUMMARY_WINDOW_BARS;
use crate::error::{AppError, Result};
use crate::models::{Bar, Timeframe};

/// A normalized OHLCV series for one (symbol, timeframe) pair, plus the
/// summary fields every data source computes the same way.
///
/// A series is created fresh on every fetch and never mutated afterwards;
/// the next fetch for the same key supersedes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub bars: Vec<Bar>,

    /// Last bar's close.
    pub current_price: f64,

    /// Last close minus previous close (0 for a single-bar series).
    pub change: f64,

    /// `change / previous close * 100` (0 if the previous close is 0).
    pub change_percent: f64,

    /// Last bar's volume.
    pub volume: u64,

    /// Max high over the trailing summary window. The window is the last 24
    /// bars, not 24 hours; the field keeps the dashboard's historical name.
    pub high_24h: f64,

    /// Min low over the trailing summary window (same caveat as `high_24h`).
    pub low_24h: f64,

    /// Wall-clock time of the fetch, not of the data.
    #[serde(with = "chrono::serde::ts_seconds")]
    pub last_update: DateTime<Utc>,
}

impl Series {
    /// Build a series from parsed bars and compute the derived summary
    /// fields with the shared last-two-bars formulas.
    ///
    /// Bars must be in strictly increasing time order; duplicate or
    /// out-of-order timestamps are rejected.
    pub fn from_bars(
        symbol: &str,
        timeframe: Timeframe,
        bars: Vec<Bar>,
        fetched_at: DateTime<Utc>,
    ) -> Result<Series> {
        let last = bars
            .last()
            .ok_or_else(|| AppError::InvalidInput(format!("no bars for {symbol}")))?;

        if bars.windows(2).any(|pair| pair[0].time >= pair[1].time) {
            return Err(AppError::InvalidInput(format!(
                "bars for {symbol} are not in strictly increasing time order"
            )));
        }
        let previous = bars.len().checked_sub(2).map(|i| &bars[i]);

        let change = previous.map_or(0.0, |prev| last.close - prev.close);
        let change_percent = match previous {
            Some(prev) if prev.close != 0.0 => change / prev.close * 100.0,
            _ => 0.0,
        };

        let window_start = bars.len().saturating_sub(SUMMARY_WINDOW_BARS);
        let window = &bars[window_start..];
        let high_24h = window.iter().map(|b| b.high).fold(f64::MIN, f64::max);
        let low_24h = window.iter().map(|b| b.low).fold(f64::MAX, f64::min);

        Ok(Series {
            symbol: symbol.to_string(),
            timeframe,
            current_price: last.close,
            change,
            change_percent,
            volume: last.volume,
            high_24h,
            low_24h,
            last_update: fetched_at,
            bars,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(ts: i64, close: f64) -> Bar {
        let time = Utc.timestamp_opt(ts, 0).unwrap();
        Bar::new(time, close, close + 1.0, close - 1.0, close, 1_000)
    }

    #[test]
    fn summary_uses_last_two_bars() {
        let bars = vec![bar(0, 100.0), bar(60, 104.0)];
        let series = Series::from_bars("AAPL", Timeframe::Day1, bars, Utc::now()).unwrap();

        assert_eq!(series.current_price, 104.0);
        assert!((series.change - 4.0).abs() < 1e-9);
        assert!((series.change_percent - 4.0).abs() < 1e-9);
        assert_eq!(series.volume, 1_000);
    }

    #[test]
    fn single_bar_has_zero_change() {
        let series = Series::from_bars("AAPL", Timeframe::Day1, vec![bar(0, 50.0)], Utc::now()).unwrap();
        assert_eq!(series.change, 0.0);
        assert_eq!(series.change_percent, 0.0);
    }

    #[test]
    fn zero_previous_close_yields_zero_percent() {
        let bars = vec![bar(0, 0.0), bar(60, 5.0)];
        let series = Series::from_bars("X", Timeframe::Day1, bars, Utc::now()).unwrap();
        assert!((series.change - 5.0).abs() < 1e-9);
        assert_eq!(series.change_percent, 0.0);
    }

    // The "24h" summary window is the last 24 bars by count, regardless of
    // the timeframe. On daily bars below, that is 24 days, not 24 hours.
    #[test]
    fn high_low_window_is_last_24_bars_not_24_hours() {
        let mut bars = Vec::new();
        // Bar 0 has a spike that must fall outside the 24-bar window.
        bars.push(Bar::new(
            Utc.timestamp_opt(0, 0).unwrap(),
            100.0,
            999.0,
            1.0,
            100.0,
            10,
        ));
        for i in 1..=24 {
            bars.push(bar(i as i64 * 86_400, 100.0 + i as f64));
        }

        let series = Series::from_bars("AAPL", Timeframe::Day1, bars, Utc::now()).unwrap();
        assert!((series.high_24h - 125.0).abs() < 1e-9); // last close 124 + 1
        assert!((series.low_24h - 100.0).abs() < 1e-9); // first windowed close 101 - 1
    }

    #[test]
    fn empty_bars_is_an_error() {
        assert!(Series::from_bars("AAPL", Timeframe::Day1, Vec::new(), Utc::now()).is_err());
    }

    #[test]
    fn unsorted_or_duplicate_times_are_rejected() {
        let out_of_order = vec![bar(60, 100.0), bar(0, 101.0)];
        assert!(Series::from_bars("AAPL", Timeframe::Day1, out_of_order, Utc::now()).is_err());

        let duplicated = vec![bar(60, 100.0), bar(60, 101.0)];
        assert!(Series::from_bars("AAPL", Timeframe::Day1, duplicated, Utc::now()).is_err());
    }
}
