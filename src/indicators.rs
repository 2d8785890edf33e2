//! Technical indicator engine.
//!
//! Pure functions from a bar sequence to derived overlay series. The engine
//! never fails: an unrecognized indicator id or an input shorter than the
//! requested period yields `None`, and the caller decides whether to skip
//! or render a placeholder.
//!
//! Every overlay's points are a subsequence of the input time axis. Values
//! are rounded to the source data's quoting granularity before being
//! returned: 2 decimals for price-scale indicators, 4 for MACD.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_VWAP_VOLUME, LEVEL_STRENGTH_CAP, LEVEL_TOLERANCE_RATIO, MACD_DECIMALS, PRICE_DECIMALS,
};
use crate::models::{Bar, IndicatorOverlay, OverlayPoint};
use crate::utils::round_to;

/// Compute the overlay(s) for an indicator id.
///
/// Single-line indicators return a one-element vec; Bollinger Bands return
/// upper/middle/lower and MACD returns line/signal/histogram. Unknown ids
/// and insufficient data return `None`.
pub fn compute(bars: &[Bar], indicator_id: &str) -> Option<Vec<IndicatorOverlay>> {
    if bars.is_empty() {
        return None;
    }

    match indicator_id {
        "sma20" => sma(bars, 20, "#ff6b6b", "SMA(20)").map(|o| vec![o]),
        "sma50" => sma(bars, 50, "#4ecdc4", "SMA(50)").map(|o| vec![o]),
        "ema12" => ema(bars, 12, "#45b7d1", "EMA(12)").map(|o| vec![o]),
        "ema26" => ema(bars, 26, "#f39c12", "EMA(26)").map(|o| vec![o]),
        "bb" => bollinger_bands(bars, 20, 2.0),
        "rsi" => rsi(bars, 14).map(|o| vec![o]),
        "macd" => macd(bars, 12, 26, 9),
        "vwap" => vwap(bars).map(|o| vec![o]),
        _ => None,
    }
}

/// Simple moving average: arithmetic mean of the last `period` closes, one
/// point per input index `>= period - 1`.
fn sma(bars: &[Bar], period: usize, color: &str, name: &str) -> Option<IndicatorOverlay> {
    if period == 0 || bars.len() < period {
        return None;
    }

    let mut data = Vec::with_capacity(bars.len() - period + 1);
    for i in (period - 1)..bars.len() {
        let window = &bars[i + 1 - period..=i];
        let avg = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
        data.push(OverlayPoint {
            time: bars[i].time,
            value: round_to(avg, PRICE_DECIMALS),
        });
    }

    Some(IndicatorOverlay::new(name, color, data))
}

/// Raw EMA values over a slice, seeded with the SMA of the first `period`
/// entries; one value per input index `>= period - 1`, unrounded.
fn ema_values(values: &[f64], period: usize) -> Option<Vec<f64>> {
    if period == 0 || values.len() < period {
        return None;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let seed = values[..period].iter().sum::<f64>() / period as f64;

    let mut out = Vec::with_capacity(values.len() - period + 1);
    let mut ema = seed;
    out.push(ema);
    for &value in &values[period..] {
        ema = value * multiplier + ema * (1.0 - multiplier);
        out.push(ema);
    }

    Some(out)
}

fn ema(bars: &[Bar], period: usize, color: &str, name: &str) -> Option<IndicatorOverlay> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = ema_values(&closes, period)?;

    let data = values
        .iter()
        .enumerate()
        .map(|(i, &value)| OverlayPoint {
            time: bars[period - 1 + i].time,
            value: round_to(value, PRICE_DECIMALS),
        })
        .collect();

    Some(IndicatorOverlay::new(name, color, data))
}

/// Bollinger Bands: middle = SMA(period), upper/lower = middle +/- k times
/// the population standard deviation of the same window.
fn bollinger_bands(bars: &[Bar], period: usize, k: f64) -> Option<Vec<IndicatorOverlay>> {
    if period == 0 || bars.len() < period {
        return None;
    }

    let count = bars.len() - period + 1;
    let mut upper = Vec::with_capacity(count);
    let mut middle = Vec::with_capacity(count);
    let mut lower = Vec::with_capacity(count);

    for i in (period - 1)..bars.len() {
        let window = &bars[i + 1 - period..=i];
        let mean = window.iter().map(|b| b.close).sum::<f64>() / period as f64;
        let variance = window
            .iter()
            .map(|b| (b.close - mean).powi(2))
            .sum::<f64>()
            / period as f64;
        let std_dev = variance.sqrt();

        let time = bars[i].time;
        upper.push(OverlayPoint {
            time,
            value: round_to(mean + std_dev * k, PRICE_DECIMALS),
        });
        middle.push(OverlayPoint {
            time,
            value: round_to(mean, PRICE_DECIMALS),
        });
        lower.push(OverlayPoint {
            time,
            value: round_to(mean - std_dev * k, PRICE_DECIMALS),
        });
    }

    Some(vec![
        IndicatorOverlay::new("BB Upper", "#9b59b6", upper),
        IndicatorOverlay::new("BB Middle", "#e74c3c", middle),
        IndicatorOverlay::new("BB Lower", "#9b59b6", lower),
    ])
}

/// Relative Strength Index with Wilder smoothing.
///
/// When the average loss is zero the ratio degenerates (RSI pins at 100, or
/// NaN on a perfectly flat series); callers must tolerate both.
fn rsi(bars: &[Bar], period: usize) -> Option<IndicatorOverlay> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }

    let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for &change in &changes[..period] {
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss += change.abs();
        }
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;

    let mut data = Vec::new();
    for i in period..changes.len() {
        let change = changes[i];
        if change > 0.0 {
            avg_gain = (avg_gain * (period as f64 - 1.0) + change) / period as f64;
            avg_loss = (avg_loss * (period as f64 - 1.0)) / period as f64;
        } else {
            avg_gain = (avg_gain * (period as f64 - 1.0)) / period as f64;
            avg_loss = (avg_loss * (period as f64 - 1.0) + change.abs()) / period as f64;
        }

        let rs = avg_gain / avg_loss;
        let value = 100.0 - 100.0 / (1.0 + rs);

        data.push(OverlayPoint {
            time: bars[i + 1].time,
            value: round_to(value, PRICE_DECIMALS),
        });
    }

    Some(IndicatorOverlay::new("RSI(14)", "#ff9500", data))
}

/// MACD: fast EMA minus slow EMA (index-aligned by trimming the fast EMA's
/// lead), a signal EMA of the MACD line, and their difference as histogram.
fn macd(
    bars: &[Bar],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Option<Vec<IndicatorOverlay>> {
    if bars.len() < slow_period {
        return None;
    }

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let fast = ema_values(&closes, fast_period)?;
    let slow = ema_values(&closes, slow_period)?;

    // The fast EMA starts `slow - fast` bars earlier; drop that lead so both
    // series align on the slow EMA's first index.
    let lead = slow_period - fast_period;
    let mut macd_line = Vec::with_capacity(slow.len());
    for (i, &slow_value) in slow.iter().enumerate() {
        macd_line.push(OverlayPoint {
            time: bars[slow_period - 1 + i].time,
            value: round_to(fast[lead + i] - slow_value, MACD_DECIMALS),
        });
    }

    let mut signal_line = Vec::new();
    let mut histogram = Vec::new();
    let macd_raw: Vec<f64> = macd_line.iter().map(|p| p.value).collect();
    if let Some(signal_values) = ema_values(&macd_raw, signal_period) {
        for (i, &signal) in signal_values.iter().enumerate() {
            let point = &macd_line[signal_period - 1 + i];
            signal_line.push(OverlayPoint {
                time: point.time,
                value: round_to(signal, MACD_DECIMALS),
            });
            histogram.push(OverlayPoint {
                time: point.time,
                value: round_to(point.value - signal, MACD_DECIMALS),
            });
        }
    }

    Some(vec![
        IndicatorOverlay::new("MACD", "#2196F3", macd_line),
        IndicatorOverlay::new("Signal", "#FF5722", signal_line),
        IndicatorOverlay::new("Histogram", "#9e9e9e", histogram),
    ])
}

/// Volume-weighted average price, cumulative from the first bar (running,
/// not windowed). Zero-volume bars substitute a fixed default volume.
fn vwap(bars: &[Bar]) -> Option<IndicatorOverlay> {
    if bars.is_empty() {
        return None;
    }

    let mut cumulative_volume = 0.0;
    let mut cumulative_volume_price = 0.0;
    let mut data = Vec::with_capacity(bars.len());

    for bar in bars {
        let volume = if bar.volume == 0 {
            DEFAULT_VWAP_VOLUME as f64
        } else {
            bar.volume as f64
        };

        cumulative_volume_price += bar.typical_price() * volume;
        cumulative_volume += volume;

        data.push(OverlayPoint {
            time: bar.time,
            value: round_to(cumulative_volume_price / cumulative_volume, PRICE_DECIMALS),
        });
    }

    Some(IndicatorOverlay::new("VWAP", "#9c27b0", data))
}

/// A detected support or resistance price level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceLevel {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,
    pub price: f64,
    /// How many bars tested the level (within 0.5%), capped at 5.
    pub strength: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportResistance {
    pub support: Vec<PriceLevel>,
    pub resistance: Vec<PriceLevel>,
}

/// Detect local support/resistance levels: a bar is a support when its low
/// is the minimum of the symmetric `[i - lookback, i + lookback]` window,
/// resistance analogously for highs.
pub fn support_resistance(bars: &[Bar], lookback: usize) -> SupportResistance {
    let mut levels = SupportResistance::default();
    if bars.len() < lookback || lookback == 0 {
        return levels;
    }

    for i in lookback..bars.len().saturating_sub(lookback) {
        let window = &bars[i - lookback..=i + lookback];
        let current = &bars[i];

        if window.iter().all(|b| b.low >= current.low) {
            levels.support.push(PriceLevel {
                time: current.time,
                price: current.low,
                strength: level_strength(bars, current.low, |b| b.low),
            });
        }

        if window.iter().all(|b| b.high <= current.high) {
            levels.resistance.push(PriceLevel {
                time: current.time,
                price: current.high,
                strength: level_strength(bars, current.high, |b| b.high),
            });
        }
    }

    levels
}

fn level_strength(bars: &[Bar], price: f64, side: impl Fn(&Bar) -> f64) -> u32 {
    let tolerance = price * LEVEL_TOLERANCE_RATIO;
    let touches = bars
        .iter()
        .filter(|b| (side(b) - price).abs() <= tolerance)
        .count() as u32;
    touches.min(LEVEL_STRENGTH_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let time = Utc.timestamp_opt(i as i64 * 60, 0).unwrap();
                Bar::new(time, close, close + 1.0, close - 1.0, close, 1_000)
            })
            .collect()
    }

    #[test]
    fn sma_of_constant_series_is_the_constant() {
        let bars = bars_from_closes(&[42.0; 30]);
        let overlays = compute(&bars, "sma20").unwrap();
        let sma = &overlays[0];
        assert_eq!(sma.data.len(), 11);
        assert!(sma.data.iter().all(|p| p.value == 42.0));
        // Output is time-aligned to the input bar closing each window.
        assert_eq!(sma.data[0].time, bars[19].time);
    }

    #[test]
    fn sma_below_period_returns_none() {
        let bars = bars_from_closes(&[10.0; 15]);
        assert!(compute(&bars, "sma20").is_none());
    }

    #[test]
    fn ema_of_constant_series_stays_at_the_constant() {
        let bars = bars_from_closes(&[7.5; 40]);
        let overlays = compute(&bars, "ema12").unwrap();
        assert!(overlays[0].data.iter().all(|p| p.value == 7.5));
        assert_eq!(overlays[0].data[0].time, bars[11].time);
    }

    #[test]
    fn bollinger_middle_band_equals_sma() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let bars = bars_from_closes(&closes);

        let bb = compute(&bars, "bb").unwrap();
        let sma = compute(&bars, "sma20").unwrap();

        assert_eq!(bb.len(), 3);
        let middle = &bb[1];
        assert_eq!(middle.name, "BB Middle");
        assert_eq!(middle.data, sma[0].data);
    }

    #[test]
    fn bollinger_bands_bracket_the_middle() {
        let closes: Vec<f64> = (0..40).map(|i| 50.0 + (i % 5) as f64).collect();
        let bars = bars_from_closes(&closes);
        let bb = compute(&bars, "bb").unwrap();
        for i in 0..bb[0].data.len() {
            assert!(bb[0].data[i].value >= bb[1].data[i].value);
            assert!(bb[1].data[i].value >= bb[2].data[i].value);
        }
    }

    #[test]
    fn rsi_of_monotonic_gains_pins_at_100() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let bars = bars_from_closes(&closes);
        let overlays = compute(&bars, "rsi").unwrap();
        let rsi = &overlays[0];

        assert!(!rsi.data.is_empty());
        for point in &rsi.data {
            assert!(point.value <= 100.0);
        }
        // No losses at all: the average loss stays 0 and RSI sits at 100.
        assert!(rsi.data.iter().all(|p| p.value == 100.0));
    }

    #[test]
    fn rsi_of_mixed_series_stays_in_band() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + ((i * 13) % 7) as f64 - 3.0)
            .collect();
        let bars = bars_from_closes(&closes);
        let overlays = compute(&bars, "rsi").unwrap();
        for point in &overlays[0].data {
            assert!((0.0..=100.0).contains(&point.value));
        }
    }

    #[test]
    fn macd_overlays_are_aligned_and_trimmed() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).cos() * 8.0).collect();
        let bars = bars_from_closes(&closes);
        let overlays = compute(&bars, "macd").unwrap();

        assert_eq!(overlays.len(), 3);
        let (line, signal, histogram) = (&overlays[0], &overlays[1], &overlays[2]);

        // MACD line starts where the slow EMA starts.
        assert_eq!(line.data[0].time, bars[25].time);
        assert_eq!(line.data.len(), 60 - 26 + 1);

        // Signal trims a further signal_period - 1 points.
        assert_eq!(signal.data.len(), line.data.len() - 8);
        assert_eq!(signal.data[0].time, line.data[8].time);
        assert_eq!(histogram.data.len(), signal.data.len());

        // Histogram is MACD minus signal at each shared point.
        for (i, h) in histogram.data.iter().enumerate() {
            let expected = line.data[8 + i].value - signal.data[i].value;
            assert!((h.value - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn macd_below_slow_period_returns_none() {
        let bars = bars_from_closes(&[10.0; 25]);
        assert!(compute(&bars, "macd").is_none());
    }

    #[test]
    fn vwap_with_uniform_volume_is_mean_typical_price() {
        let closes: Vec<f64> = (0..10).map(|i| 20.0 + i as f64).collect();
        let bars = bars_from_closes(&closes);
        let overlays = compute(&bars, "vwap").unwrap();
        let vwap = &overlays[0];

        assert_eq!(vwap.data.len(), bars.len());
        for (i, point) in vwap.data.iter().enumerate() {
            let mean: f64 = bars[..=i].iter().map(|b| b.typical_price()).sum::<f64>()
                / (i + 1) as f64;
            assert_eq!(point.value, round_to(mean, 2));
        }
    }

    #[test]
    fn vwap_substitutes_default_volume_for_zero() {
        let mut bars = bars_from_closes(&[10.0, 11.0, 12.0]);
        for bar in &mut bars {
            bar.volume = 0;
        }
        let overlays = compute(&bars, "vwap").unwrap();
        assert!(overlays[0].data.iter().all(|p| p.value.is_finite()));
    }

    #[test]
    fn unknown_indicator_id_returns_none() {
        let bars = bars_from_closes(&[10.0; 50]);
        assert!(compute(&bars, "stochastic").is_none());
        assert!(compute(&[], "sma20").is_none());
    }

    #[test]
    fn support_resistance_finds_the_extremes() {
        // V-shaped lows with a clear trough in the middle.
        let closes: Vec<f64> = (0..21)
            .map(|i| 100.0 + (i as f64 - 10.0).abs() * 2.0)
            .collect();
        let bars = bars_from_closes(&closes);

        let levels = support_resistance(&bars, 5);
        assert!(levels.support.iter().any(|l| l.time == bars[10].time));
        for level in &levels.support {
            assert!(level.strength >= 1 && level.strength <= 5);
        }
    }

    #[test]
    fn support_resistance_short_input_is_empty() {
        let bars = bars_from_closes(&[10.0; 5]);
        let levels = support_resistance(&bars, 20);
        assert!(levels.support.is_empty());
        assert!(levels.resistance.is_empty());
    }
}
