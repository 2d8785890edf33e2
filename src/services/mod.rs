pub mod clock;
pub mod config;
pub mod market_data;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ApiConfig, DataSource, EnvOverrides};
pub use market_data::{FetchStatsSnapshot, MarketDataService, MarketSnapshot, SeriesSource};
