//! Remote kline provider client.

use std::time::Duration;

use serde_json::Value;
use shared::Candle;
use tracing::debug;

use crate::error::ArchiverError;

/// Provider cap on records per request.
pub const PAGE_LIMIT: u32 = 1000;

/// Seam between the reconciler and the remote provider.
pub trait KlineSource {
    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<Candle>, ArchiverError>;
}

/// Binance-compatible klines endpoint client.
pub struct BinanceClient {
    base_url: String,
    client: reqwest::Client,
}

impl BinanceClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

impl KlineSource for BinanceClient {
    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<Candle>, ArchiverError> {
        let url = format!(
            "{}?symbol={}&interval={}&startTime={}&endTime={}&limit={}",
            self.base_url, symbol, interval, start_ms, end_ms, PAGE_LIMIT
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ArchiverError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        let raw: Vec<Vec<Value>> = response
            .json()
            .await
            .map_err(|e| ArchiverError::Payload(format!("expected an array of kline rows: {}", e)))?;

        klines_to_candles(symbol, &raw)
    }
}

/// Decode raw kline rows into candles. A row carries at least 11 fields:
/// open time, open, high, low, close, volume, then close-time/quote
/// statistics which are ignored. Shorter rows are skipped.
fn klines_to_candles(symbol: &str, raw: &[Vec<Value>]) -> Result<Vec<Candle>, ArchiverError> {
    let mut candles = Vec::with_capacity(raw.len());
    for row in raw {
        if row.len() < 11 {
            debug!("skipping kline row with {} fields", row.len());
            continue;
        }

        let open_time = row[0]
            .as_i64()
            .or_else(|| row[0].as_f64().map(|f| f as i64))
            .ok_or_else(|| ArchiverError::Payload(format!("non-numeric open time: {}", row[0])))?;

        candles.push(Candle::from_parts(
            symbol,
            open_time,
            numeric(&row[1]),
            numeric(&row[2]),
            numeric(&row[3]),
            numeric(&row[4]),
            numeric(&row[5]),
        ));
    }
    Ok(candles)
}

/// Price and volume cells arrive as decimal strings or plain numbers;
/// anything else degrades to zero.
fn numeric(value: &Value) -> f64 {
    match value {
        Value::String(s) => s.parse().unwrap_or(0.0),
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(open_time: i64, open: &str) -> Vec<Value> {
        json!([
            open_time, open, "2.0", "0.5", "1.5", "42.0",
            open_time + 899_999, "60.0", 100, "30.0", "20.0", "0"
        ])
        .as_array()
        .unwrap()
        .clone()
    }

    #[test]
    fn decodes_rows_into_candles() {
        let raw = vec![row(1_737_072_900_000, "1.0")];
        let candles = klines_to_candles("ETHUSDC", &raw).unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].symbol, "ETHUSDC");
        assert_eq!(candles[0].timestamp, 1_737_072_900_000);
        assert_eq!(candles[0].open, 1.0);
        assert_eq!(candles[0].volume, 42.0);
        assert_eq!(candles[0].date, "2025-01-17");
    }

    #[test]
    fn short_rows_are_skipped() {
        let short = json!([1_737_072_900_000i64, "1.0", "2.0"])
            .as_array()
            .unwrap()
            .clone();
        let raw = vec![short, row(1_737_073_800_000, "1.1")];
        let candles = klines_to_candles("ETHUSDC", &raw).unwrap();
        assert_eq!(candles.len(), 1);
        assert_eq!(candles[0].timestamp, 1_737_073_800_000);
    }

    #[test]
    fn non_numeric_open_time_is_fatal() {
        let mut bad = row(0, "1.0");
        bad[0] = json!("not-a-time");
        assert!(matches!(
            klines_to_candles("ETHUSDC", &[bad]),
            Err(ArchiverError::Payload(_))
        ));
    }

    #[test]
    fn numeric_accepts_strings_and_numbers() {
        assert_eq!(numeric(&json!("1.25")), 1.25);
        assert_eq!(numeric(&json!(1.25)), 1.25);
        assert_eq!(numeric(&json!("oops")), 0.0);
        assert_eq!(numeric(&json!(null)), 0.0);
    }
}
