use shared::Config;
use tracing::info;

mod error;
mod notify;
mod provider;
mod reconciler;
mod store;

use crate::notify::Notifier;
use crate::provider::BinanceClient;
use crate::reconciler::Reconciler;
use crate::store::ArchiveStore;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = Config::from_env()?;
    info!(
        "starting archiver: {} {} -> {}",
        config.symbol, config.interval, config.data_file_path
    );

    let notifier = Notifier::from_config(
        config.telegram_bot_token.as_deref(),
        config.telegram_chat_id,
    );

    let reconciler = Reconciler::new(
        ArchiveStore::new(&config.data_file_path),
        BinanceClient::new(config.binance_api_base.as_str()),
        config.symbol.as_str(),
        config.interval.as_str(),
        config.archive_start,
    );

    let outcome = reconciler.run().await?;

    let message = if outcome.appended == 0 {
        format!(
            "{} {} archive is up to date ({} bars)",
            config.symbol,
            config.interval,
            outcome.candles.len()
        )
    } else {
        format!(
            "{} {} archive updated: {} new bars, {} total",
            config.symbol,
            config.interval,
            outcome.appended,
            outcome.candles.len()
        )
    };
    info!("{}", message);

    if let Some(notifier) = &notifier {
        notifier.send(&message).await;
    }

    Ok(())
}
