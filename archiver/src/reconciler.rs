//! Archive reconciliation: extend the persisted series up to the current
//! time by fetching only the missing suffix from the provider.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use shared::interval::{interval_millis, truncate_to_interval};
use shared::Candle;
use tokio::time::{sleep, Duration};
use tracing::info;

use crate::error::ArchiverError;
use crate::provider::KlineSource;
use crate::store::ArchiveStore;

/// Bars requested per page. Stays under the provider's 1000-record cap
/// with a one-bar margin.
const BATCH_BARS: i64 = 999;

/// Courtesy pause between successive provider requests.
const BATCH_PAUSE: Duration = Duration::from_millis(100);

/// Outcome of one reconciliation run.
pub struct Reconciliation {
    /// The full merged series, sorted ascending by open time.
    pub candles: Vec<Candle>,
    /// Rows the run added to the archive; zero means no write happened.
    pub appended: usize,
}

/// Single-pass reconciler for one (symbol, interval) archive. Stateless
/// between invocations apart from the archive file itself; the file is
/// not locked, so concurrent runs against the same path are unsafe.
pub struct Reconciler<S> {
    store: ArchiveStore,
    source: S,
    symbol: String,
    interval: String,
    default_start: DateTime<Utc>,
}

impl<S: KlineSource> Reconciler<S> {
    pub fn new(
        store: ArchiveStore,
        source: S,
        symbol: impl Into<String>,
        interval: impl Into<String>,
        default_start: DateTime<Utc>,
    ) -> Self {
        Self {
            store,
            source,
            symbol: symbol.into(),
            interval: interval.into(),
            default_start,
        }
    }

    pub async fn run(&self) -> Result<Reconciliation, ArchiverError> {
        self.run_at(Utc::now()).await
    }

    /// Reconcile against an explicit current time; `run` passes the wall
    /// clock.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<Reconciliation, ArchiverError> {
        info!(
            "updating {} {} archive at {}",
            self.symbol,
            self.interval,
            self.store.path().display()
        );

        let mut existing = self.store.load()?;
        existing.sort_by_key(|c| c.timestamp);

        let step = interval_millis(&self.interval);
        let last_timestamp = match existing.last() {
            Some(last) => {
                info!("last archived bar: {} ({})", last.datetime, last.timestamp);
                last.timestamp
            }
            None => {
                let aligned = truncate_to_interval(self.default_start.timestamp_millis(), step);
                info!("archive is empty, starting from {}", fmt_millis(aligned));
                aligned
            }
        };

        // The bar at last_timestamp is already archived; fetch from the
        // next one, up to the most recent completed interval boundary.
        let fetch_start = last_timestamp + step;
        let fetch_end = truncate_to_interval(now.timestamp_millis(), step);

        if fetch_start >= fetch_end {
            info!("archive is up to date, nothing to fetch");
            return Ok(Reconciliation {
                candles: existing,
                appended: 0,
            });
        }

        info!(
            "fetching {} -> {}",
            fmt_millis(fetch_start),
            fmt_millis(fetch_end)
        );

        let mut fetched: Vec<Candle> = Vec::new();
        let mut cursor = fetch_start;
        while cursor < fetch_end {
            let batch_end = (cursor + BATCH_BARS * step).min(fetch_end);
            info!("batch {} -> {}", fmt_millis(cursor), fmt_millis(batch_end));

            let batch = self
                .source
                .fetch_klines(&self.symbol, &self.interval, cursor, batch_end)
                .await?;

            let Some(last) = batch.last() else {
                info!("provider returned no bars, stopping pagination");
                break;
            };
            cursor = last.timestamp + step;
            fetched.extend(batch);

            if cursor < fetch_end {
                sleep(BATCH_PAUSE).await;
            }
        }

        if fetched.is_empty() {
            info!("no new bars downloaded");
            return Ok(Reconciliation {
                candles: existing,
                appended: 0,
            });
        }
        info!("downloaded {} new bars", fetched.len());

        // Union keyed by open time; fetched bars win on duplicates, and
        // BTreeMap iteration hands the result back sorted.
        let before = existing.len();
        let mut merged: BTreeMap<i64, Candle> = BTreeMap::new();
        for candle in existing {
            merged.insert(candle.timestamp, candle);
        }
        for candle in fetched {
            merged.insert(candle.timestamp, candle);
        }
        let candles: Vec<Candle> = merged.into_values().collect();
        let appended = candles.len() - before;

        self.store.save(&candles)?;
        info!("archive updated: {} rows ({} new)", candles.len(), appended);

        Ok(Reconciliation { candles, appended })
    }
}

fn fmt_millis(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}
