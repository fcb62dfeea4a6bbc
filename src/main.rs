use anyhow::Result;
use tracing::{info, Level};

use position_notifier::config::Config;
use position_notifier::logging::{init_logging, LogFormat};
use position_notifier::store::SnapshotStore;
use position_notifier::{BybitClient, Monitor, TelegramNotifier};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    let format = config
        .log_format
        .parse::<LogFormat>()
        .map_err(anyhow::Error::msg)?;
    let level = if config.debug { Level::DEBUG } else { Level::INFO };
    init_logging(format, level);

    let client = BybitClient::new(
        config.debug,
        config.bybit_testnet,
        &config.bybit_api_key,
        &config.bybit_api_secret,
    )?
    .with_settle_coin(&config.settle_coin);

    let notifier = TelegramNotifier::new(
        &config.telegram_token,
        &config.telegram_chat_id,
        config.telegram_topic_id,
    )?
    .dry_run(config.dry_run);

    let mut monitor = Monitor::new(
        client,
        notifier,
        config.poll_interval(),
        config.error_cooldown(),
    );
    if let Some(path) = config.state_path() {
        info!(path = %path.display(), "启用快照文件");
        monitor = monitor.with_store(SnapshotStore::new(path));
    }

    tokio::select! {
        _ = monitor.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("收到退出信号");
        }
    }
    Ok(())
}
