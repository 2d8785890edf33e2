//! Background refresh for the demo data source.
//!
//! Live providers are polled on demand and rate limited upstream, so the
//! periodic refresh only runs for the demo source, and only when live
//! updates are enabled. The spawned task forces a new fetch each interval,
//! keeping the cached series moving like a live feed.

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::models::Timeframe;
use crate::services::config::DataSource;
use crate::services::market_data::MarketDataService;

/// Handle to a running refresh task. Dropping it stops the task.
pub struct RefreshHandle {
    handle: JoinHandle<()>,
}

impl RefreshHandle {
    pub fn stop(self) {
        // Drop runs the abort.
    }
}

impl Drop for RefreshHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawn the periodic refresh for one (symbol, timeframe) pair.
///
/// Returns `None` when the configuration is not eligible: a non-demo source
/// or live updates disabled.
pub fn spawn(
    service: MarketDataService,
    symbol: impl Into<String>,
    timeframe: Timeframe,
) -> Option<RefreshHandle> {
    let config = service.config();
    if config.source != DataSource::Demo || !config.enable_live_updates {
        debug!(
            source = %config.source,
            enable_live_updates = config.enable_live_updates,
            "auto-refresh not eligible"
        );
        return None;
    }

    let symbol = symbol.into();
    let interval = config.update_interval;
    info!(symbol = %symbol, timeframe = %timeframe, interval_secs = interval.as_secs_f64(), "starting refresh worker");

    let handle = tokio::spawn(async move {
        let mut iteration_count = 0u64;
        loop {
            sleep(interval).await;
            iteration_count += 1;
            match service.refresh(&symbol, timeframe).await {
                Ok(snapshot) => {
                    debug!(
                        iteration = iteration_count,
                        symbol = %symbol,
                        price = snapshot.series.current_price,
                        "refresh worker: series updated"
                    );
                }
                Err(e) => {
                    warn!(
                        iteration = iteration_count,
                        symbol = %symbol,
                        error = %e,
                        "refresh worker: refresh failed"
                    );
                }
            }
        }
    });

    Some(RefreshHandle { handle })
}
