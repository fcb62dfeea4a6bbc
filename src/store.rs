//! 上一轮持仓快照的文件存储，进程重启后据此继续比对。

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::PersistenceError;
use crate::tracker::PositionSnapshot;

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文件不存在返回空快照；文件损坏时记录警告并返回空快照
    pub fn load(&self) -> Result<PositionSnapshot, PersistenceError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "快照文件不存在，从空快照开始");
            return Ok(PositionSnapshot::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        match serde_json::from_reader::<_, PositionSnapshot>(reader) {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "快照文件损坏，忽略");
                Ok(PositionSnapshot::new())
            }
        }
    }

    /// 覆盖写入，必要时创建父目录
    pub fn save(&self, snapshot: &PositionSnapshot) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(writer, snapshot)?;

        debug!(path = %self.path.display(), count = snapshot.len(), "快照已保存");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{PositionRecord, Side};
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    fn sample() -> PositionSnapshot {
        vec![PositionRecord {
            symbol: "BTCUSDT".into(),
            side: Side::Short,
            size: dec!(0.015),
            avg_entry_price: dec!(64250.5),
            leverage: 10,
            unrealized_pnl: dec!(-3.2),
        }]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("state.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("nested/state.json"));

        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), sample());

        store.save(&PositionSnapshot::new()).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{ not json").unwrap();

        let store = SnapshotStore::new(path.clone());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_load_drops_empty_rows_and_rekeys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(
            &path,
            r#"{
                "ETHUSDT": {"symbol": "BTCUSDT", "side": "long", "size": "0",
                            "avg_entry_price": "100", "leverage": 10, "unrealized_pnl": "0"},
                "XRP": {"symbol": "XRPUSDT", "side": "short", "size": "25",
                        "avg_entry_price": "0.5", "leverage": 3, "unrealized_pnl": "1"}
            }"#,
        )
        .unwrap();

        let snapshot = SnapshotStore::new(path).load().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot.contains("ETHUSDT"));
        assert!(!snapshot.contains("BTCUSDT"));
        assert_eq!(snapshot.get("XRPUSDT").unwrap().size, dec!(25));
    }
}
