use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::models::PositionList;
use crate::client::BybitClient;
use crate::error::FetchError;
use crate::source::PositionSource;
use crate::tracker::PositionSnapshot;

const PAGE_LIMIT: &str = "200";

impl BybitClient {
    /// 查询持仓（单页）
    /// GET /v5/position/list
    pub async fn position_list(
        &self,
        category: &str,
        settle_coin: &str,
        cursor: Option<&str>,
    ) -> Result<PositionList, FetchError> {
        let mut params: BTreeMap<String, String> = BTreeMap::new();
        params.insert("category".into(), category.into());
        params.insert("settleCoin".into(), settle_coin.into());
        params.insert("limit".into(), PAGE_LIMIT.into());
        if let Some(cursor) = cursor {
            // nextPageCursor 已是 URL 编码形式，先还原，避免 build_query_string 二次编码
            let raw = urlencoding::decode(cursor)
                .map(|c| c.into_owned())
                .unwrap_or_else(|_| cursor.to_string());
            params.insert("cursor".into(), raw);
        }
        self.get::<PositionList>("/v5/position/list", &params).await
    }

    /// 拉取全部 U 本位持仓，按 nextPageCursor 翻页
    pub async fn open_positions(&self) -> Result<PositionSnapshot, FetchError> {
        let mut snapshot = PositionSnapshot::new();
        let mut cursor: Option<String> = None;

        loop {
            let page = self
                .position_list("linear", &self.settle_coin, cursor.as_deref())
                .await?;
            for row in &page.list {
                if let Some(record) = row.to_record()? {
                    if snapshot.contains(&record.symbol) {
                        warn!(
                            symbol = %record.symbol,
                            "同一交易对出现多条持仓，仅支持单向持仓模式，保留最后一条"
                        );
                    }
                    snapshot.insert(record);
                }
            }
            if page.next_page_cursor.is_empty() || page.list.is_empty() {
                break;
            }
            if cursor.as_deref() == Some(page.next_page_cursor.as_str()) {
                warn!(cursor = %page.next_page_cursor, "nextPageCursor 未变化，停止翻页");
                break;
            }
            cursor = Some(page.next_page_cursor);
        }

        debug!(count = snapshot.len(), "持仓拉取完成");
        Ok(snapshot)
    }
}

#[async_trait]
impl PositionSource for BybitClient {
    async fn fetch_positions(&self) -> Result<PositionSnapshot, FetchError> {
        self.open_positions().await
    }
}
