//! CSV-backed archive of one (symbol, interval) candle series.

use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use shared::Candle;
use tracing::{info, warn};

use crate::error::ArchiverError;

/// Required archive columns. Load matches them by name, so physical
/// column order does not matter.
pub const HEADER: [&str; 10] = [
    "symbol", "timestamp", "datetime", "date", "hour", "open", "high", "low", "close", "volume",
];

pub struct ArchiveStore {
    path: PathBuf,
}

impl ArchiveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the archived series. A missing or empty file yields an empty
    /// series (first run); a header that lacks any required column is
    /// fatal. Unparsable numeric cells degrade to zero with a warning —
    /// the display columns are only checked for presence, their values
    /// are recomputed from the open time.
    pub fn load(&self) -> Result<Vec<Candle>, ArchiverError> {
        if !self.path.exists() {
            info!("archive {} not found, starting empty", self.path.display());
            return Ok(Vec::new());
        }

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;

        let headers = rdr.headers()?.clone();
        if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
            return Ok(Vec::new());
        }

        let idx_symbol = column(&headers, "symbol")?;
        let idx_timestamp = column(&headers, "timestamp")?;
        let idx_open = column(&headers, "open")?;
        let idx_high = column(&headers, "high")?;
        let idx_low = column(&headers, "low")?;
        let idx_close = column(&headers, "close")?;
        let idx_volume = column(&headers, "volume")?;
        // Derived columns must exist in a well-formed archive even though
        // their values are recomputed below.
        for name in ["datetime", "date", "hour"] {
            column(&headers, name)?;
        }

        let mut candles = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let record = result?;
            let line = i + 2;

            let symbol = record.get(idx_symbol).unwrap_or("").to_string();
            let timestamp = lenient_i64(record.get(idx_timestamp), "timestamp", line);
            let open = lenient_f64(record.get(idx_open), "open", line);
            let high = lenient_f64(record.get(idx_high), "high", line);
            let low = lenient_f64(record.get(idx_low), "low", line);
            let close = lenient_f64(record.get(idx_close), "close", line);
            let volume = lenient_f64(record.get(idx_volume), "volume", line);

            candles.push(Candle::from_parts(
                &symbol, timestamp, open, high, low, close, volume,
            ));
        }
        Ok(candles)
    }

    /// Rewrite the archive wholesale: full header, one row per candle,
    /// prices and volume at fixed 8-decimal precision, datetime rendered
    /// as `YYYY-MM-DD HH:MM:SS` UTC. The parent directory is created on
    /// first save.
    pub fn save(&self, candles: &[Candle]) -> Result<(), ArchiverError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = WriterBuilder::new().from_path(&self.path)?;
        writer.write_record(HEADER)?;
        for c in candles {
            writer.write_record(&[
                c.symbol.clone(),
                c.timestamp.to_string(),
                c.datetime.format("%Y-%m-%d %H:%M:%S").to_string(),
                c.date.clone(),
                c.hour.to_string(),
                format!("{:.8}", c.open),
                format!("{:.8}", c.high),
                format!("{:.8}", c.low),
                format!("{:.8}", c.close),
                format!("{:.8}", c.volume),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn column(headers: &StringRecord, name: &str) -> Result<usize, ArchiverError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| ArchiverError::MissingColumn(name.to_string()))
}

fn lenient_i64(cell: Option<&str>, name: &str, line: usize) -> i64 {
    let raw = cell.unwrap_or("").trim();
    raw.parse().unwrap_or_else(|_| {
        warn!("line {}: unparsable {} '{}', degrading to 0", line, name, raw);
        0
    })
}

fn lenient_f64(cell: Option<&str>, name: &str, line: usize) -> f64 {
    let raw = cell.unwrap_or("").trim();
    raw.parse().unwrap_or_else(|_| {
        warn!("line {}: unparsable {} '{}', degrading to 0", line, name, raw);
        0.0
    })
}
