//! Provider adapters normalizing external market-data APIs into the
//! canonical [`Series`](crate::models::Series) model.

pub mod alpha_vantage;
pub mod polygon;

use reqwest::Error as ReqwestError;
use thiserror::Error as ThisError;

/// Shared HTTP timeout for provider clients.
pub(crate) const HTTP_TIMEOUT_SECS: u64 = 30;

/// Provider API error types, shared by both adapters.
#[derive(ThisError, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] ReqwestError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("API key is required for {0}")]
    MissingApiKey(&'static str),
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("No data returned for {0}")]
    NoData(String),
}
