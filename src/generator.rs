//! Synthetic OHLCV data for the demo source and the fallback path.
//!
//! The generator walks a random price path with bounded drift: each bar
//! opens at the previous close and moves by an independent trend + noise
//! draw scaled by the timeframe's volatility. High/low bumps are applied on
//! the correct side of the body, so every generated bar satisfies the OHLC
//! ordering invariant by construction.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::Rng;
use tracing::debug;

use crate::constants::{GEN_BASE_VOLUME_MAX, GEN_BASE_VOLUME_MIN};
use crate::error::{AppError, Result};
use crate::models::{Bar, Series, Timeframe};
use crate::utils::round_to;

/// Interval configuration resolved per timeframe: how many bars to emit,
/// how far apart they sit, and how volatile the walk is.
#[derive(Debug, Clone, Copy)]
struct IntervalConfig {
    bar_duration_secs: i64,
    bar_count: usize,
    volatility: f64,
}

fn interval_config(timeframe: Timeframe) -> IntervalConfig {
    match timeframe {
        Timeframe::Minute1 => IntervalConfig {
            bar_duration_secs: 60,
            bar_count: 300, // 5 hours
            volatility: 0.001,
        },
        Timeframe::Minute5 => IntervalConfig {
            bar_duration_secs: 5 * 60,
            bar_count: 288, // 24 hours
            volatility: 0.003,
        },
        Timeframe::Minute15 => IntervalConfig {
            bar_duration_secs: 15 * 60,
            bar_count: 192, // 2 days
            volatility: 0.005,
        },
        Timeframe::Hour1 => IntervalConfig {
            bar_duration_secs: 60 * 60,
            bar_count: 168, // 1 week
            volatility: 0.01,
        },
        Timeframe::Hour4 => IntervalConfig {
            bar_duration_secs: 4 * 60 * 60,
            bar_count: 180, // 1 month
            volatility: 0.02,
        },
        Timeframe::Day1 => IntervalConfig {
            bar_duration_secs: 24 * 60 * 60,
            bar_count: 90, // 3 months
            volatility: 0.025,
        },
        Timeframe::Week1 => IntervalConfig {
            bar_duration_secs: 7 * 24 * 60 * 60,
            bar_count: 104, // 2 years
            volatility: 0.04,
        },
        Timeframe::Month1 => IntervalConfig {
            bar_duration_secs: 30 * 24 * 60 * 60,
            bar_count: 60, // 5 years
            volatility: 0.06,
        },
    }
}

/// Realistic starting price per symbol, with a small random jitter so each
/// generated series looks fresh. Unknown symbols get a generic base range.
fn base_price(symbol: &str, rng: &mut impl Rng) -> f64 {
    match symbol {
        "AAPL" => 150.0 + rng.gen::<f64>() * 50.0,
        "MSFT" => 300.0 + rng.gen::<f64>() * 50.0,
        "GOOGL" => 2500.0 + rng.gen::<f64>() * 200.0,
        "AMZN" => 3100.0 + rng.gen::<f64>() * 200.0,
        "TSLA" => 200.0 + rng.gen::<f64>() * 100.0,
        "NVDA" => 400.0 + rng.gen::<f64>() * 100.0,
        "META" => 300.0 + rng.gen::<f64>() * 50.0,
        "NFLX" => 400.0 + rng.gen::<f64>() * 50.0,
        _ => 100.0 + rng.gen::<f64>() * 50.0,
    }
}

/// Generate a plausible series for `(symbol, timeframe)` anchored at `now`.
///
/// Re-callable indefinitely; calls are independent apart from the fixed
/// base-price table. All prices are rounded to 2 decimals to mimic real
/// tick-size quoting.
pub fn generate(symbol: &str, timeframe: Timeframe, now: DateTime<Utc>) -> Result<Series> {
    let mut rng = rand::thread_rng();
    let bars = generate_bars(symbol, timeframe, now, &mut rng);
    debug!(symbol, timeframe = %timeframe, bars = bars.len(), "generated sample series");
    Series::from_bars(symbol, timeframe, bars, now)
        .map_err(|e| AppError::Generation(e.to_string()))
}

fn generate_bars(
    symbol: &str,
    timeframe: Timeframe,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> Vec<Bar> {
    let config = interval_config(timeframe);
    let mut bars = Vec::with_capacity(config.bar_count);
    let mut current_price = base_price(symbol, rng);

    for i in (0..config.bar_count).rev() {
        let time = now - ChronoDuration::seconds(i as i64 * config.bar_duration_secs);
        let bar = generate_bar(current_price, config.volatility, time, rng);
        current_price = bar.close;
        bars.push(bar);
    }

    bars
}

fn generate_bar(open: f64, volatility: f64, time: DateTime<Utc>, rng: &mut impl Rng) -> Bar {
    // Small trend component plus independent noise, both uniform draws.
    let trend = (rng.gen::<f64>() - 0.5) * volatility * 0.5;
    let noise = (rng.gen::<f64>() - 0.5) * volatility;
    let price_change = trend + noise;

    let close = open * (1.0 + price_change);

    let body_high = open.max(close);
    let body_low = open.min(close);
    let high = body_high * (1.0 + rng.gen::<f64>() * volatility * 0.5);
    let low = body_low * (1.0 - rng.gen::<f64>() * volatility * 0.5);

    // Volume correlates with move size so big candles look busy. A display
    // heuristic, not a statistical model.
    let base_volume = rng.gen_range(GEN_BASE_VOLUME_MIN..GEN_BASE_VOLUME_MAX);
    let volume_multiplier = 1.0 + price_change.abs() * 10.0;
    let volume = (base_volume * volume_multiplier).floor() as u64;

    Bar::new(
        time,
        round_to(open, 2),
        round_to(high, 2),
        round_to(low, 2),
        round_to(close, 2),
        volume,
    )
}
