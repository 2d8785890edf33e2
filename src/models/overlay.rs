use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One point of a derived indicator series, time-aligned to an input bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayPoint {
    #[serde(with = "chrono::serde::ts_seconds")]
    pub time: DateTime<Utc>,
    pub value: f64,
}

/// A derived indicator series drawn alongside price.
///
/// `data` is always a subsequence of the input series' time axis: never a
/// superset, never reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorOverlay {
    /// Display label, e.g. "SMA(20)".
    pub name: String,

    /// Display hint passed through to the chart; opaque to the engine.
    pub color: String,

    pub data: Vec<OverlayPoint>,
}

impl IndicatorOverlay {
    pub fn new(name: &str, color: &str, data: Vec<OverlayPoint>) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            data,
        }
    }
}
