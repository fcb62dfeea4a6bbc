use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

use crate::error::TrackerError;
use crate::source::{Notifier, PositionSource};
use crate::store::SnapshotStore;
use crate::tracker::{detect_transitions, format_notification, PositionSnapshot, Transition};

/// 一轮轮询的结果
#[derive(Debug)]
pub struct CycleOutcome {
    /// 本轮拉到的快照，作为下一轮的 previous
    pub snapshot: PositionSnapshot,
    pub delivered: usize,
    /// 推送失败的 (symbol, 变化类型, 错误)，不会重发
    pub failures: Vec<(String, Transition, TrackerError)>,
}

impl CycleOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 拉取 → 比对 → 推送。拉取失败时返回 Err，调用方保留旧快照。
pub async fn run_cycle<S, N>(
    previous: &PositionSnapshot,
    source: &S,
    notifier: &N,
) -> Result<CycleOutcome, TrackerError>
where
    S: PositionSource + ?Sized,
    N: Notifier + ?Sized,
{
    let current = source.fetch_positions().await?;
    let events = detect_transitions(previous, &current);

    let mut delivered = 0;
    let mut failures = Vec::new();
    for event in &events {
        let transition = event.transition();
        info!(symbol = event.symbol(), ?transition, "检测到持仓变化");

        match notifier.send(&format_notification(event)).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                error!(symbol = event.symbol(), ?transition, error = %e, "通知发送失败");
                failures.push((event.symbol().to_string(), transition, e.into()));
            }
        }
    }

    Ok(CycleOutcome {
        snapshot: current,
        delivered,
        failures,
    })
}

/// 轮询驱动：固定间隔循环，出错后冷却更久再继续
pub struct Monitor<S, N> {
    source: S,
    notifier: N,
    store: Option<SnapshotStore>,
    poll_interval: Duration,
    error_cooldown: Duration,
}

impl<S, N> Monitor<S, N>
where
    S: PositionSource,
    N: Notifier,
{
    pub fn new(source: S, notifier: N, poll_interval: Duration, error_cooldown: Duration) -> Self {
        Self {
            source,
            notifier,
            store: None,
            poll_interval,
            error_cooldown,
        }
    }

    pub fn with_store(mut self, store: SnapshotStore) -> Self {
        self.store = Some(store);
        self
    }

    /// 启动时的快照：有存储则从文件读取，否则为空
    pub fn initial_snapshot(&self) -> PositionSnapshot {
        match &self.store {
            Some(store) => store.load().unwrap_or_else(|e| {
                warn!(path = %store.path().display(), error = %e, "读取快照失败，从空快照开始");
                PositionSnapshot::new()
            }),
            None => PositionSnapshot::new(),
        }
    }

    /// 执行一轮并返回 (新快照, 下次休眠时长)
    #[instrument(skip_all, fields(positions = previous.len()))]
    pub async fn step(&self, previous: PositionSnapshot) -> (PositionSnapshot, Duration) {
        match run_cycle(&previous, &self.source, &self.notifier).await {
            Ok(outcome) => {
                if let Some(store) = &self.store {
                    if let Err(e) = store.save(&outcome.snapshot) {
                        error!(path = %store.path().display(), error = %e, "保存快照失败");
                    }
                }
                let pause = if outcome.is_clean() {
                    self.poll_interval
                } else {
                    warn!(
                        delivered = outcome.delivered,
                        failed = outcome.failures.len(),
                        "本轮有通知发送失败"
                    );
                    self.error_cooldown
                };
                (outcome.snapshot, pause)
            }
            Err(e) => {
                error!(error = %e, "本轮轮询失败，保留上一轮快照");
                (previous, self.error_cooldown)
            }
        }
    }

    /// 永久运行，直到进程被终止
    pub async fn run(&self) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            cooldown_secs = self.error_cooldown.as_secs(),
            "开始监控持仓"
        );
        let mut snapshot = self.initial_snapshot();
        loop {
            let (next, pause) = self.step(snapshot).await;
            snapshot = next;
            sleep(pause).await;
        }
    }
}
