//! Market data service: the single entry point the dashboard pulls series
//! through.
//!
//! Responsibilities:
//! - per-(symbol, timeframe) cache with a 60 s TTL,
//! - request coalescing so concurrent misses trigger exactly one upstream
//!   fetch,
//! - fallback to generated data when a live provider fails, surfaced via
//!   [`MarketSnapshot::degraded`],
//! - fetch statistics for observability and tests.
//!
//! The cache map and the in-flight registry live behind one async mutex, so
//! the check-then-register step is atomic and two tasks can never both
//! become the leader for the same key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::constants::CACHE_TTL_SECONDS;
use crate::error::{AppError, Result};
use crate::generator;
use crate::models::{Series, Timeframe};
use crate::providers::alpha_vantage::AlphaVantageClient;
use crate::providers::polygon::PolygonClient;
use crate::services::clock::{Clock, SystemClock};
use crate::services::config::{ApiConfig, DataSource};

/// One resolved series plus degradation metadata. `degraded` carries the
/// upstream failure reason when the series was substituted with generated
/// data.
#[derive(Debug, Clone)]
pub struct MarketSnapshot {
    pub series: Arc<Series>,
    pub degraded: Option<String>,
}

/// Anything that can produce a series for a symbol/timeframe pair. The
/// production sources wrap the provider clients and the generator; tests
/// inject slow or failing sources to drive the coalescing and fallback
/// paths.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> Result<Series>;
}

/// Demo source: synthesized data, no network.
struct DemoSource;

#[async_trait]
impl SeriesSource for DemoSource {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> Result<Series> {
        generator::generate(symbol, timeframe, now)
    }
}

struct AlphaVantageSource(AlphaVantageClient);

#[async_trait]
impl SeriesSource for AlphaVantageSource {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> Result<Series> {
        Ok(self.0.fetch_series(symbol, timeframe, now).await?)
    }
}

struct PolygonSource(PolygonClient);

#[async_trait]
impl SeriesSource for PolygonSource {
    async fn fetch(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> Result<Series> {
        Ok(self.0.fetch_series(symbol, timeframe, now).await?)
    }
}

type CacheKey = (String, Timeframe);

/// Outcome cached and broadcast to coalesced waiters. Errors travel as
/// strings because [`AppError`] is not `Clone`; by the time an outcome
/// reaches the cache the string is always the generic message below, with
/// the detailed reason already logged.
type FetchOutcome = std::result::Result<MarketSnapshot, String>;

/// The one terminal error message callers see when a fetch and its fallback
/// both fail.
const FETCH_FAILED_MSG: &str = "failed to load market data";

/// Cached fetch outcome. Errors are cached under the same TTL as data, so a
/// failing key is retried at most once per TTL window.
struct CacheEntry {
    outcome: FetchOutcome,
    fetched_at: DateTime<Utc>,
}

struct InflightEntry {
    generation: u64,
    rx: watch::Receiver<Option<FetchOutcome>>,
}

#[derive(Default)]
struct ServiceState {
    cache: HashMap<CacheKey, CacheEntry>,
    inflight: HashMap<CacheKey, InflightEntry>,
    next_generation: u64,
}

/// Cumulative fetch counters.
#[derive(Default)]
pub struct FetchStats {
    cache_hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    fallbacks: AtomicU64,
}

/// Point-in-time copy of [`FetchStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchStatsSnapshot {
    pub cache_hits: u64,
    pub misses: u64,
    pub coalesced: u64,
    pub fallbacks: u64,
}

impl FetchStats {
    fn snapshot(&self) -> FetchStatsSnapshot {
        FetchStatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
        }
    }
}

/// Cheaply cloneable handle; all clones share the cache, in-flight registry,
/// and counters.
#[derive(Clone)]
pub struct MarketDataService {
    config: Arc<ApiConfig>,
    source: Arc<dyn SeriesSource>,
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<ServiceState>>,
    stats: Arc<FetchStats>,
}

impl std::fmt::Debug for MarketDataService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MarketDataService {
    /// Build a service from a validated configuration. A non-demo source
    /// without an API key is rejected here, before any request is made.
    pub fn new(config: ApiConfig) -> Result<Self> {
        config.validate()?;
        let api_key = config.api_key.clone().unwrap_or_default();
        let source: Arc<dyn SeriesSource> = match config.source {
            DataSource::Demo => Arc::new(DemoSource),
            DataSource::AlphaVantage => Arc::new(AlphaVantageSource(AlphaVantageClient::new(
                api_key,
            )?)),
            DataSource::Polygon => Arc::new(PolygonSource(PolygonClient::new(api_key)?)),
        };
        info!(source = %config.source, "market data service ready");
        Ok(Self::with_source(config, source, Arc::new(SystemClock)))
    }

    /// Construction seam for injecting a source and clock.
    pub fn with_source(
        config: ApiConfig,
        source: Arc<dyn SeriesSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            source,
            clock,
            state: Arc::new(Mutex::new(ServiceState::default())),
            stats: Arc::new(FetchStats::default()),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn stats(&self) -> FetchStatsSnapshot {
        self.stats.snapshot()
    }

    /// Resolve a series, serving from cache when fresh.
    pub async fn get_series(&self, symbol: &str, timeframe: Timeframe) -> Result<MarketSnapshot> {
        self.get_series_inner(symbol, timeframe, false).await
    }

    /// Force a new fetch, bypassing cache freshness. Still coalesces with an
    /// already in-flight fetch for the same key.
    pub async fn refresh(&self, symbol: &str, timeframe: Timeframe) -> Result<MarketSnapshot> {
        self.get_series_inner(symbol, timeframe, true).await
    }

    async fn get_series_inner(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        force: bool,
    ) -> Result<MarketSnapshot> {
        let key: CacheKey = (symbol.to_string(), timeframe);

        let (tx, generation) = {
            let mut state = self.state.lock().await;

            if !force {
                if let Some(entry) = state.cache.get(&key) {
                    let age = self
                        .clock
                        .now()
                        .signed_duration_since(entry.fetched_at)
                        .num_seconds();
                    if age < CACHE_TTL_SECONDS {
                        self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
                        debug!(symbol, timeframe = %timeframe, age, "cache hit");
                        return entry.outcome.clone().map_err(AppError::Other);
                    }
                }
            }

            if let Some(inflight) = state.inflight.get(&key) {
                let rx = inflight.rx.clone();
                let generation = inflight.generation;
                drop(state);
                self.stats.coalesced.fetch_add(1, Ordering::Relaxed);
                return self.await_leader(key, rx, generation).await;
            }

            // Become the leader for this key.
            let (tx, rx) = watch::channel(None);
            state.next_generation += 1;
            let generation = state.next_generation;
            state.inflight.insert(
                key.clone(),
                InflightEntry {
                    generation,
                    rx,
                },
            );
            self.stats.misses.fetch_add(1, Ordering::Relaxed);
            (tx, generation)
        };

        let outcome = self
            .fetch_with_fallback(&key.0, timeframe)
            .await
            .map_err(|reason| {
                error!(symbol = %key.0, timeframe = %timeframe, error = %reason, "fetch failed");
                FETCH_FAILED_MSG.to_string()
            });

        let result = {
            let mut state = self.state.lock().await;
            state.cache.insert(
                key.clone(),
                CacheEntry {
                    outcome: outcome.clone(),
                    fetched_at: self.clock.now(),
                },
            );
            let still_registered = state
                .inflight
                .get(&key)
                .is_some_and(|entry| entry.generation == generation);
            if still_registered {
                state.inflight.remove(&key);
            }
            outcome
        };

        // Waiters observe the outcome after the cache already holds it.
        let _ = tx.send(Some(result.clone()));

        result.map_err(AppError::Other)
    }

    /// Wait for the leading fetch on `key` to publish its outcome.
    async fn await_leader(
        &self,
        key: CacheKey,
        mut rx: watch::Receiver<Option<FetchOutcome>>,
        generation: u64,
    ) -> Result<MarketSnapshot> {
        loop {
            {
                let value = rx.borrow_and_update();
                if let Some(outcome) = value.clone() {
                    return outcome.map_err(AppError::Other);
                }
            }
            if rx.changed().await.is_err() {
                // Leader went away without publishing. Clear its registration
                // so the next caller can retry, but only if it has not been
                // replaced by a newer fetch already.
                let mut state = self.state.lock().await;
                if state
                    .inflight
                    .get(&key)
                    .is_some_and(|entry| entry.generation == generation)
                {
                    state.inflight.remove(&key);
                }
                return Err(AppError::Other(FETCH_FAILED_MSG.to_string()));
            }
        }
    }

    /// Run the configured source; on failure with a live source, substitute
    /// generated data and record the reason.
    async fn fetch_with_fallback(&self, symbol: &str, timeframe: Timeframe) -> FetchOutcome {
        let now = self.clock.now();
        match self.source.fetch(symbol, timeframe, now).await {
            Ok(series) => Ok(MarketSnapshot {
                series: Arc::new(series),
                degraded: None,
            }),
            Err(e) if self.config.source != DataSource::Demo => {
                warn!(symbol, timeframe = %timeframe, error = %e, "provider failed, serving generated data");
                self.stats.fallbacks.fetch_add(1, Ordering::Relaxed);
                let reason = e.to_string();
                generator::generate(symbol, timeframe, now)
                    .map(|series| MarketSnapshot {
                        series: Arc::new(series),
                        degraded: Some(reason),
                    })
                    .map_err(|gen_err| gen_err.to_string())
            }
            Err(e) => Err(e.to_string()),
        }
    }
}
