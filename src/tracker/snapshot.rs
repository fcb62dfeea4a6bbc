use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 持仓方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

/// 单个交易对的持仓
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub symbol: String,
    pub side: Side,
    pub size: Decimal,
    pub avg_entry_price: Decimal,
    pub leverage: u32,
    pub unrealized_pnl: Decimal,
}

impl PositionRecord {
    /// size × avg_entry_price
    pub fn cost_basis(&self) -> Decimal {
        self.size * self.avg_entry_price
    }
}

/// 一次轮询看到的全部持仓，按交易对排序。只保存 size > 0 的持仓。
///
/// 反序列化同样经过 `insert`，文件里的 key 以 `record.symbol` 为准。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, PositionRecord>",
    into = "BTreeMap<String, PositionRecord>"
)]
pub struct PositionSnapshot {
    positions: BTreeMap<String, PositionRecord>,
}

impl PositionSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入持仓，size <= 0 的记录被丢弃（同时移除旧值）
    pub fn insert(&mut self, record: PositionRecord) {
        if record.size > Decimal::ZERO {
            self.positions.insert(record.symbol.clone(), record);
        } else {
            self.positions.remove(&record.symbol);
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&PositionRecord> {
        self.positions.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PositionRecord> {
        self.positions.values()
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.positions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl FromIterator<PositionRecord> for PositionSnapshot {
    fn from_iter<I: IntoIterator<Item = PositionRecord>>(iter: I) -> Self {
        let mut snapshot = PositionSnapshot::new();
        for record in iter {
            snapshot.insert(record);
        }
        snapshot
    }
}

impl From<BTreeMap<String, PositionRecord>> for PositionSnapshot {
    fn from(positions: BTreeMap<String, PositionRecord>) -> Self {
        positions.into_values().collect()
    }
}

impl From<PositionSnapshot> for BTreeMap<String, PositionRecord> {
    fn from(snapshot: PositionSnapshot) -> Self {
        snapshot.positions
    }
}
