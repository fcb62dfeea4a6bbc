use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::DeliveryError;
use crate::source::Notifier;

pub const TELEGRAM_API: &str = "https://api.telegram.org";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// sendMessage 请求体
#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
    pub text: &'a str,
    pub parse_mode: &'a str,
    pub disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// 把格式化好的 HTML 消息推送到固定的群组 / 话题
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    api_base: String,
    token: String,
    chat_id: String,
    topic_id: Option<i64>,
    dry_run: bool,
    http: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(
        token: impl Into<String>,
        chat_id: impl Into<String>,
        topic_id: Option<i64>,
    ) -> Result<Self, DeliveryError> {
        Self::with_api_base(TELEGRAM_API, token, chat_id, topic_id)
    }

    pub fn with_api_base(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        topic_id: Option<i64>,
    ) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self {
            api_base: api_base.into(),
            token: token.into(),
            chat_id: chat_id.into(),
            topic_id,
            dry_run: false,
            http,
        })
    }

    /// dry-run 模式只打日志，不发送
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }

    pub async fn send_message(&self, text: &str) -> Result<(), DeliveryError> {
        if self.dry_run {
            info!(chat_id = %self.chat_id, "[DRY RUN] 通知内容:\n{}", text);
            return Ok(());
        }

        let body = SendMessage {
            chat_id: &self.chat_id,
            message_thread_id: self.topic_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response = self.http.post(self.endpoint()).json(&body).send().await?;
        let status = response.status();
        let raw = response.text().await?;

        // Telegram 出错时也返回 JSON，取 description
        let parsed = serde_json::from_str::<TelegramResponse>(&raw).ok();
        match parsed {
            Some(r) if status.is_success() && r.ok => {
                debug!(chat_id = %self.chat_id, "通知发送成功");
                Ok(())
            }
            other => Err(DeliveryError::Rejected {
                status: status.as_u16(),
                description: other.and_then(|r| r.description).unwrap_or(raw),
            }),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), DeliveryError> {
        self.send_message(text).await
    }
}
