use anyhow::{bail, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

fn default_settle_coin() -> String {
    "USDT".to_string()
}

fn default_poll_interval() -> u64 {
    10
}

fn default_error_cooldown() -> u64 {
    30
}

fn default_log_format() -> String {
    "pretty".to_string()
}

/// 运行配置，从环境变量（支持 .env）读取
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bybit_api_key: String,
    pub bybit_api_secret: String,
    #[serde(default)]
    pub bybit_testnet: bool,
    #[serde(default = "default_settle_coin")]
    pub settle_coin: String,

    pub telegram_token: String,
    pub telegram_chat_id: String,
    #[serde(default)]
    pub telegram_topic_id: Option<i64>,

    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_error_cooldown")]
    pub error_cooldown_secs: u64,

    #[serde(default)]
    pub state_file: Option<String>,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let config = envy::from_env::<Config>()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_secs == 0 {
            bail!("POLL_INTERVAL_SECS must be greater than 0");
        }
        if self.error_cooldown_secs < self.poll_interval_secs {
            bail!(
                "ERROR_COOLDOWN_SECS ({}) must not be shorter than POLL_INTERVAL_SECS ({})",
                self.error_cooldown_secs,
                self.poll_interval_secs
            );
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn error_cooldown(&self) -> Duration {
        Duration::from_secs(self.error_cooldown_secs)
    }

    pub fn state_path(&self) -> Option<PathBuf> {
        self.state_file
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
    }
}
