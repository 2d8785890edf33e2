use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Bar interval for a requested series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    /// 1-minute candles
    Minute1,
    /// 5-minute candles
    Minute5,
    /// 15-minute candles
    Minute15,
    /// 1-hour candles
    Hour1,
    /// 4-hour candles
    Hour4,
    /// Daily candles
    Day1,
    /// Weekly candles
    Week1,
    /// Monthly candles
    Month1,
}

impl Timeframe {
    /// Convert to the interval token used in cache keys and provider maps.
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Minute1 => "1m",
            Timeframe::Minute5 => "5m",
            Timeframe::Minute15 => "15m",
            Timeframe::Hour1 => "1h",
            Timeframe::Hour4 => "4h",
            Timeframe::Day1 => "1D",
            Timeframe::Week1 => "1W",
            Timeframe::Month1 => "1M",
        }
    }

    /// Parse an interval token. Unknown tokens fall back to daily, which is
    /// what every downstream consumer defaults to.
    pub fn parse(token: &str) -> Timeframe {
        match token {
            "1m" => Timeframe::Minute1,
            "5m" => Timeframe::Minute5,
            "15m" => Timeframe::Minute15,
            "1h" | "1H" => Timeframe::Hour1,
            "4h" | "4H" => Timeframe::Hour4,
            "1D" | "1d" => Timeframe::Day1,
            "1W" | "1w" => Timeframe::Week1,
            "1M" => Timeframe::Month1,
            _ => Timeframe::Day1,
        }
    }

    /// Wall-clock span of one bar at this timeframe.
    pub fn bar_duration(&self) -> Duration {
        match self {
            Timeframe::Minute1 => Duration::from_secs(60),
            Timeframe::Minute5 => Duration::from_secs(5 * 60),
            Timeframe::Minute15 => Duration::from_secs(15 * 60),
            Timeframe::Hour1 => Duration::from_secs(60 * 60),
            Timeframe::Hour4 => Duration::from_secs(4 * 60 * 60),
            Timeframe::Day1 => Duration::from_secs(24 * 60 * 60),
            Timeframe::Week1 => Duration::from_secs(7 * 24 * 60 * 60),
            Timeframe::Month1 => Duration::from_secs(30 * 24 * 60 * 60),
        }
    }

    /// All supported timeframes.
    pub fn all() -> Vec<Timeframe> {
        vec![
            Timeframe::Minute1,
            Timeframe::Minute5,
            Timeframe::Minute15,
            Timeframe::Hour1,
            Timeframe::Hour4,
            Timeframe::Day1,
            Timeframe::Week1,
            Timeframe::Month1,
        ]
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::Day1
    }
}
