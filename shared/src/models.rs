//! OHLCV candle data structures

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV bar of an archived series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Traded pair, e.g. "ETHUSDC"
    pub symbol: String,
    /// Bar open time, epoch milliseconds. Unique key within an archive.
    pub timestamp: i64,
    /// UTC rendering of `timestamp`; derived, recomputed on load/fetch
    pub datetime: DateTime<Utc>,
    /// UTC calendar date (`YYYY-MM-DD`); derived
    pub date: String,
    /// UTC hour of day, 0-23; derived
    pub hour: u32,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Build a candle from its authoritative fields, computing the
    /// display fields (`datetime`, `date`, `hour`) from the open time.
    pub fn from_parts(
        symbol: &str,
        timestamp: i64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        let datetime =
            DateTime::<Utc>::from_timestamp_millis(timestamp).unwrap_or(DateTime::UNIX_EPOCH);
        Self {
            symbol: symbol.to_string(),
            timestamp,
            date: datetime.format("%Y-%m-%d").to_string(),
            hour: datetime.hour(),
            datetime,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Check if candle is bullish
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Total range (high - low)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_fields_follow_open_time() {
        // 2025-01-17 05:30:00 UTC
        let c = Candle::from_parts("ETHUSDC", 1_737_091_800_000, 1.0, 2.0, 0.5, 1.5, 10.0);
        assert_eq!(c.date, "2025-01-17");
        assert_eq!(c.hour, 5);
        assert_eq!(c.datetime.to_rfc3339(), "2025-01-17T05:30:00+00:00");
    }

    #[test]
    fn out_of_range_open_time_falls_back_to_epoch() {
        let c = Candle::from_parts("ETHUSDC", i64::MAX, 1.0, 1.0, 1.0, 1.0, 0.0);
        assert_eq!(c.date, "1970-01-01");
        assert_eq!(c.hour, 0);
    }
}
