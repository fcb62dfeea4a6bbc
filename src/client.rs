use std::time::Duration;

use crate::error::FetchError;

pub const MAINNET_DOMAIN: &str = "https://api.bybit.com";
pub const TESTNET_DOMAIN: &str = "https://api-testnet.bybit.com";
const DEFAULT_RECV_WINDOW: u64 = 5000;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct BybitClient {
    pub debug: bool,
    pub testnet: bool,
    pub api_key: String,
    pub secret_key: String,
    pub domain: String,
    pub recv_window: u64,
    pub settle_coin: String,
    pub(crate) http: reqwest::Client,
}

impl BybitClient {
    pub fn new(
        debug: bool,
        testnet: bool,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let domain = if testnet {
            TESTNET_DOMAIN
        } else {
            MAINNET_DOMAIN
        };
        Self::with_domain(debug, testnet, api_key, secret_key, domain)
    }

    /// 自定义域名（测试时指向本地 mock 服务）
    pub fn with_domain(
        debug: bool,
        testnet: bool,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        domain: impl Into<String>,
    ) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(BybitClient {
            debug,
            testnet,
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            domain: domain.into(),
            recv_window: DEFAULT_RECV_WINDOW,
            settle_coin: "USDT".to_string(),
            http,
        })
    }

    /// 结算币种过滤，默认 USDT
    pub fn with_settle_coin(mut self, coin: impl Into<String>) -> Self {
        self.settle_coin = coin.into();
        self
    }
}
