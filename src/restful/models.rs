use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::FetchError;
use crate::tracker::{PositionRecord, Side};

#[derive(Deserialize, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RestApi<T> {
    pub ret_code: i64,
    pub ret_msg: String,
    pub result: T,
}

/// 查询持仓
/// GET /v5/position/list
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionList {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub list: Vec<PositionData>,
    #[serde(default)]
    pub next_page_cursor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionData {
    pub symbol: String,
    /// Buy / Sell，空仓时为空字符串
    #[serde(default)]
    pub side: String,
    pub size: String,
    pub avg_price: String,
    #[serde(default)]
    pub leverage: String,
    #[serde(default)]
    pub unrealised_pnl: String,
    /// 0 单向持仓，1 双向多仓，2 双向空仓
    #[serde(default)]
    pub position_idx: i32,
    #[serde(default)]
    pub mark_price: String,
}

impl PositionData {
    fn decimal(&self, field: &'static str, value: &str) -> Result<Decimal, FetchError> {
        // 交易所对空值返回 ""
        if value.is_empty() {
            return Ok(Decimal::ZERO);
        }
        Decimal::from_str(value).map_err(|_| self.invalid(field, value))
    }

    fn invalid(&self, field: &'static str, value: &str) -> FetchError {
        FetchError::InvalidField {
            symbol: self.symbol.clone(),
            field,
            value: value.to_string(),
        }
    }

    pub fn size(&self) -> Result<Decimal, FetchError> {
        self.decimal("size", &self.size)
    }

    /// 仅支持单向持仓模式，方向只看 side 字段
    pub fn parse_side(&self) -> Result<Side, FetchError> {
        match self.side.as_str() {
            "Buy" => Ok(Side::Long),
            "Sell" => Ok(Side::Short),
            _ => Err(self.invalid("side", &self.side)),
        }
    }

    pub fn parse_leverage(&self) -> Result<u32, FetchError> {
        self.decimal("leverage", &self.leverage)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .ok_or_else(|| self.invalid("leverage", &self.leverage))
    }

    /// 转换为内部持仓记录，size 为 0 的空仓返回 None
    pub fn to_record(&self) -> Result<Option<PositionRecord>, FetchError> {
        let size = self.size()?;
        if size <= Decimal::ZERO {
            return Ok(None);
        }
        Ok(Some(PositionRecord {
            symbol: self.symbol.clone(),
            side: self.parse_side()?,
            size,
            avg_entry_price: self.decimal("avgPrice", &self.avg_price)?,
            leverage: self.parse_leverage()?,
            unrealized_pnl: self.decimal("unrealisedPnl", &self.unrealised_pnl)?,
        }))
    }
}
