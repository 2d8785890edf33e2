//! Data source configuration.
//!
//! Resolution order: environment variables win, then a persisted JSON
//! settings file, then the built-in demo defaults. Validation rejects any
//! non-demo source configured without an API key.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::constants::DEFAULT_UPDATE_INTERVAL_MS;
use crate::error::{AppError, Result};

/// Where market data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Demo,
    AlphaVantage,
    Polygon,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Demo => "demo",
            DataSource::AlphaVantage => "alphavantage",
            DataSource::Polygon => "polygon",
        }
    }

    /// Accepts the snake_case spelling as an alias.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "demo" => Some(DataSource::Demo),
            "alphavantage" | "alpha_vantage" => Some(DataSource::AlphaVantage),
            "polygon" => Some(DataSource::Polygon),
            _ => None,
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub source: DataSource,
    pub api_key: Option<String>,
    pub enable_live_updates: bool,
    pub update_interval: Duration,
}

impl Default for ApiConfig {
    /// Demo defaults: live simulation on, 30 s refresh.
    fn default() -> Self {
        Self {
            source: DataSource::Demo,
            api_key: None,
            enable_live_updates: true,
            update_interval: Duration::from_millis(DEFAULT_UPDATE_INTERVAL_MS),
        }
    }
}

/// Environment overrides, collected up front so resolution stays a pure
/// function over its inputs.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    pub source: Option<String>,
    pub alpha_vantage_key: Option<String>,
    pub polygon_key: Option<String>,
    pub update_interval_ms: Option<u64>,
}

impl EnvOverrides {
    pub fn from_process_env() -> Self {
        Self {
            source: env::var("CHARTFEED_DATA_SOURCE").ok(),
            alpha_vantage_key: env::var("CHARTFEED_ALPHA_VANTAGE_API_KEY").ok(),
            polygon_key: env::var("CHARTFEED_POLYGON_API_KEY").ok(),
            update_interval_ms: env::var("CHARTFEED_UPDATE_INTERVAL_MS")
                .ok()
                .and_then(|raw| raw.parse().ok()),
        }
    }
}

/// Shape of the persisted settings file. `update_frequency` is stored in
/// seconds.
#[derive(Debug, Deserialize)]
struct PersistedConfig {
    source: Option<String>,
    #[serde(rename = "apiKey")]
    api_key: Option<String>,
    #[serde(rename = "enableLiveUpdates", default)]
    enable_live_updates: bool,
    #[serde(rename = "updateFrequency")]
    update_frequency_secs: Option<u64>,
}

impl ApiConfig {
    /// Resolve configuration from the process environment only.
    pub fn from_env() -> Self {
        resolve(&EnvOverrides::from_process_env(), None)
    }

    /// Resolve configuration from the environment with a persisted settings
    /// file as fallback. An unreadable or malformed file degrades to the
    /// demo defaults rather than failing.
    pub fn load(settings_path: &Path) -> Self {
        let persisted = match std::fs::read_to_string(settings_path) {
            Ok(raw) => match serde_json::from_str::<PersistedConfig>(&raw) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!(path = %settings_path.display(), error = %e, "ignoring malformed settings file");
                    None
                }
            },
            Err(_) => None,
        };
        resolve(&EnvOverrides::from_process_env(), persisted)
    }

    /// A non-demo source needs an API key.
    pub fn validate(&self) -> Result<()> {
        if self.source != DataSource::Demo
            && self.api_key.as_deref().map_or(true, str::is_empty)
        {
            return Err(AppError::Config(format!(
                "API key required for {}",
                self.source
            )));
        }
        Ok(())
    }
}

fn resolve(env: &EnvOverrides, persisted: Option<PersistedConfig>) -> ApiConfig {
    if let Some(source) = env
        .source
        .as_deref()
        .and_then(DataSource::parse)
        .filter(|s| *s != DataSource::Demo)
    {
        let api_key = match source {
            DataSource::AlphaVantage => env.alpha_vantage_key.clone(),
            DataSource::Polygon => env.polygon_key.clone(),
            DataSource::Demo => None,
        };
        return ApiConfig {
            source,
            api_key,
            enable_live_updates: true,
            update_interval: Duration::from_millis(env.update_interval_ms.unwrap_or(60_000)),
        };
    }

    if let Some(persisted) = persisted {
        let source = persisted
            .source
            .as_deref()
            .and_then(DataSource::parse)
            .unwrap_or(DataSource::Demo);
        return ApiConfig {
            source,
            api_key: persisted.api_key,
            enable_live_updates: persisted.enable_live_updates,
            update_interval: persisted
                .update_frequency_secs
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_millis(60_000)),
        };
    }

    ApiConfig::default()
}
