use lyrebird::channels;
use lyrebird::channels::telegram::TelegramAdapter;
use lyrebird::channels::traits::{ChatTransport, EventSource};
use lyrebird::config::BotConfig;
use lyrebird::service::BotService;
use lyrebird::usage_log::{CsvUsageLog, NoopUsageLog, UsageLog};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("lyrebird.toml"));
    let config = BotConfig::load(&config_path)?;
    config.validate()?;

    let usage_log: Arc<dyn UsageLog> = if config.usage_log.enabled {
        Arc::new(CsvUsageLog::new(PathBuf::from(&config.usage_log.path)))
    } else {
        Arc::new(NoopUsageLog)
    };

    let adapter = Arc::new(TelegramAdapter::new(&config.telegram));
    let transport: Arc<dyn ChatTransport> = adapter.clone();
    let source: Arc<dyn EventSource> = adapter;

    let service = Arc::new(BotService::new(&config, transport, usage_log));
    tracing::info!(source = source.id(), "starting lyrebird");
    channels::run(service, source).await
}
