//! Shared constants for caching, refresh scheduling, and data generation.

/// How long a cached series stays valid before a new fetch is issued.
pub const CACHE_TTL_SECONDS: i64 = 60;

/// Default auto-refresh interval for the demo source.
///
/// Only demo data is ever auto-polled; real providers are fetched on demand
/// to respect their rate limits.
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 30_000;

/// Volume substituted by VWAP when a bar reports zero volume, to avoid
/// divide-by-zero artifacts from a cold start.
pub const DEFAULT_VWAP_VOLUME: u64 = 1_000_000;

/// Price-scale indicator values are quoted to 2 decimal places.
pub const PRICE_DECIMALS: u32 = 2;

/// MACD line/signal values are quoted to 4 decimal places.
pub const MACD_DECIMALS: u32 = 4;

/// Base random volume range for generated bars (before the move-size
/// multiplier is applied).
pub const GEN_BASE_VOLUME_MIN: f64 = 1_000_000.0;
pub const GEN_BASE_VOLUME_MAX: f64 = 6_000_000.0;

/// Number of trailing bars used for the series "24h" high/low summary.
/// This is a bar count, not a calendar window; it only equals 24 hours on
/// hourly timeframes.
pub const SUMMARY_WINDOW_BARS: usize = 24;

/// Tolerance used when counting how many bars tested a support/resistance
/// level (0.5% of the level price).
pub const LEVEL_TOLERANCE_RATIO: f64 = 0.005;

/// Support/resistance strength is capped at this many touches.
pub const LEVEL_STRENGTH_CAP: u32 = 5;
