use chrono::{DateTime, NaiveDateTime, Utc};
use dotenv::dotenv;

/// Runtime configuration, loaded once at startup and passed down
/// explicitly. One invocation manages exactly one (symbol, interval)
/// archive.
pub struct Config {
    pub symbol: String,
    pub interval: String,
    pub data_file_path: String,
    pub binance_api_base: String,
    /// Where backfilling begins when the archive does not exist yet.
    pub archive_start: DateTime<Utc>,
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<i64>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();

        let start_str = std::env::var("ARCHIVE_START")
            .unwrap_or_else(|_| "2025-01-17 00:00:00".to_string());
        let archive_start = parse_start(&start_str)?;

        let telegram_chat_id = match std::env::var("TELEGRAM_CHAT_ID") {
            Ok(raw) if !raw.trim().is_empty() => Some(raw.trim().parse::<i64>().map_err(
                |e| anyhow::anyhow!("invalid TELEGRAM_CHAT_ID '{}': {}", raw, e),
            )?),
            _ => None,
        };

        Ok(Config {
            symbol: std::env::var("SYMBOL")
                .map_err(|_| anyhow::anyhow!("SYMBOL not set in environment"))?,
            interval: std::env::var("BINANCE_INTERVAL").unwrap_or_else(|_| "15m".to_string()),
            data_file_path: std::env::var("DATA_FILE_PATH")
                .unwrap_or_else(|_| "data/ETHUSDC_15m.csv".to_string()),
            binance_api_base: std::env::var("BINANCE_API_BASE")
                .unwrap_or_else(|_| "https://api.binance.com/api/v3/klines".to_string()),
            archive_start,
            telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN")
                .ok()
                .filter(|t| !t.trim().is_empty()),
            telegram_chat_id,
        })
    }
}

fn parse_start(raw: &str) -> Result<DateTime<Utc>, anyhow::Error> {
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| anyhow::anyhow!("invalid ARCHIVE_START '{}': {}", raw, e))?;
    Ok(naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn parses_start_instant_as_utc() {
        let dt = parse_start("2025-01-17 00:00:00").unwrap();
        assert_eq!(dt.year(), 2025);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 17);
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn rejects_bad_start_instant() {
        assert!(parse_start("17/01/2025").is_err());
        assert!(parse_start("").is_err());
    }
}
