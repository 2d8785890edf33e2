//! Market data core for a charting dashboard.
//!
//! The crate covers the data path between a charting UI and its sources:
//!
//! - a canonical OHLCV [`Bar`]/[`Series`] model shared by every source,
//! - a sample-data generator for the demo source and the fallback path,
//! - provider adapters (Alpha Vantage, Polygon.io) normalizing external
//!   JSON into the canonical model,
//! - [`MarketDataService`]: TTL caching, request coalescing, and graceful
//!   degradation to generated data when a provider fails,
//! - a pure technical-indicator engine (SMA, EMA, Bollinger Bands, RSI,
//!   MACD, VWAP, support/resistance),
//! - a static ticker directory with prioritized symbol search.
//!
//! # Example
//!
//! ```no_run
//! use chartfeed::{ApiConfig, MarketDataService, Timeframe};
//!
//! # async fn run() -> chartfeed::Result<()> {
//! let service = MarketDataService::new(ApiConfig::default())?;
//! let snapshot = service.get_series("AAPL", Timeframe::Day1).await?;
//! let overlays = chartfeed::indicators::compute(&snapshot.series.bars, "sma20");
//! # let _ = overlays;
//! # Ok(())
//! # }
//! ```

pub mod constants;
pub mod error;
pub mod generator;
pub mod indicators;
pub mod models;
pub mod providers;
pub mod services;
pub mod tickers;
pub mod utils;
pub mod worker;

pub use error::{AppError, Error, Result};
pub use models::{Bar, IndicatorOverlay, OverlayPoint, Series, Timeframe};
pub use services::{
    ApiConfig, DataSource, FetchStatsSnapshot, MarketDataService, MarketSnapshot,
};
