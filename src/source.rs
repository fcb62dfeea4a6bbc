use async_trait::async_trait;

use crate::error::{DeliveryError, FetchError};
use crate::tracker::PositionSnapshot;

/// 持仓数据来源（只读）
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn fetch_positions(&self) -> Result<PositionSnapshot, FetchError>;
}

/// 消息推送目标
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), DeliveryError>;
}
