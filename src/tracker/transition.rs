use rust_decimal::Decimal;
use tracing::warn;

use super::snapshot::{PositionRecord, PositionSnapshot, Side};
use crate::error::ComputationError;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// 持仓变化类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Opened,
    Added,
    Reduced,
    Closed,
}

/// 一次持仓变化对应的通知内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Opened {
        symbol: String,
        side: Side,
        leverage: u32,
        size: Decimal,
        entry_price: Decimal,
    },
    Added {
        symbol: String,
        side: Side,
        leverage: u32,
        added: Decimal,
        new_total: Decimal,
        price: Decimal,
        new_avg_entry: Decimal,
    },
    /// 全部平仓也用 Reduced 表示，remaining 为 0
    Reduced {
        symbol: String,
        side: Side,
        leverage: u32,
        reduced: Decimal,
        remaining: Decimal,
        exit_price: Decimal,
        avg_entry: Decimal,
        pnl: Decimal,
        pnl_percent: Option<Decimal>,
    },
}

impl NotificationEvent {
    pub fn symbol(&self) -> &str {
        match self {
            NotificationEvent::Opened { symbol, .. }
            | NotificationEvent::Added { symbol, .. }
            | NotificationEvent::Reduced { symbol, .. } => symbol,
        }
    }

    pub fn transition(&self) -> Transition {
        match self {
            NotificationEvent::Opened { .. } => Transition::Opened,
            NotificationEvent::Added { .. } => Transition::Added,
            NotificationEvent::Reduced { remaining, .. } if remaining.is_zero() => {
                Transition::Closed
            }
            NotificationEvent::Reduced { .. } => Transition::Reduced,
        }
    }

    /// 本次变化涉及的名义价值，不做取整
    pub fn notional(&self) -> Decimal {
        match self {
            NotificationEvent::Opened {
                size, entry_price, ..
            } => size * entry_price,
            NotificationEvent::Added { added, price, .. } => added * price,
            NotificationEvent::Reduced {
                reduced, avg_entry, ..
            } => reduced * avg_entry,
        }
    }
}

/// 两批持仓按数量加权的均价
pub fn weighted_average_entry(
    previous: &PositionRecord,
    added: Decimal,
    price: Decimal,
    total: Decimal,
) -> Result<Decimal, ComputationError> {
    if total.is_zero() {
        return Err(ComputationError::ZeroSize {
            symbol: previous.symbol.clone(),
        });
    }
    Ok((previous.cost_basis() + added * price) / total)
}

/// pnl 占上一快照成本的百分比
pub fn pnl_percent(previous: &PositionRecord, pnl: Decimal) -> Result<Decimal, ComputationError> {
    let basis = previous.cost_basis();
    if basis.is_zero() {
        return Err(ComputationError::ZeroCostBasis {
            symbol: previous.symbol.clone(),
        });
    }
    Ok(pnl / basis * HUNDRED)
}

fn percent_or_warn(previous: &PositionRecord, pnl: Decimal) -> Option<Decimal> {
    match pnl_percent(previous, pnl) {
        Ok(pct) => Some(pct),
        Err(e) => {
            warn!(symbol = %previous.symbol, error = %e, "无法计算盈亏百分比");
            None
        }
    }
}

/// 对比前后两次快照，输出开仓、加仓、减仓、平仓事件。
///
/// 顺序：先开仓，再加减仓，最后平仓；每组内按交易对排序。
pub fn detect_transitions(
    previous: &PositionSnapshot,
    current: &PositionSnapshot,
) -> Vec<NotificationEvent> {
    let mut events = Vec::new();

    for pos in current.iter().filter(|p| !previous.contains(&p.symbol)) {
        events.push(NotificationEvent::Opened {
            symbol: pos.symbol.clone(),
            side: pos.side,
            leverage: pos.leverage,
            size: pos.size,
            entry_price: pos.avg_entry_price,
        });
    }

    for pos in current.iter() {
        let Some(prev) = previous.get(&pos.symbol) else {
            continue;
        };
        let delta = pos.size - prev.size;

        if delta > Decimal::ZERO {
            let new_avg_entry =
                weighted_average_entry(prev, delta, pos.avg_entry_price, pos.size)
                    .unwrap_or_else(|e| {
                        warn!(symbol = %pos.symbol, error = %e, "加权均价计算失败");
                        pos.avg_entry_price
                    });
            events.push(NotificationEvent::Added {
                symbol: pos.symbol.clone(),
                side: pos.side,
                leverage: pos.leverage,
                added: delta,
                new_total: pos.size,
                price: pos.avg_entry_price,
                new_avg_entry,
            });
        } else if delta < Decimal::ZERO {
            events.push(NotificationEvent::Reduced {
                symbol: pos.symbol.clone(),
                side: pos.side,
                leverage: pos.leverage,
                reduced: -delta,
                remaining: pos.size,
                exit_price: pos.avg_entry_price,
                avg_entry: prev.avg_entry_price,
                pnl: pos.unrealized_pnl,
                pnl_percent: percent_or_warn(prev, pos.unrealized_pnl),
            });
        }
    }

    for prev in previous.iter().filter(|p| !current.contains(&p.symbol)) {
        events.push(NotificationEvent::Reduced {
            symbol: prev.symbol.clone(),
            side: prev.side,
            leverage: prev.leverage,
            reduced: prev.size,
            remaining: Decimal::ZERO,
            exit_price: prev.avg_entry_price,
            avg_entry: prev.avg_entry_price,
            pnl: prev.unrealized_pnl,
            pnl_percent: percent_or_warn(prev, prev.unrealized_pnl),
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn pos(symbol: &str, size: Decimal, price: Decimal, pnl: Decimal) -> PositionRecord {
        PositionRecord {
            symbol: symbol.into(),
            side: Side::Long,
            size,
            avg_entry_price: price,
            leverage: 10,
            unrealized_pnl: pnl,
        }
    }

    fn snap(records: Vec<PositionRecord>) -> PositionSnapshot {
        records.into_iter().collect()
    }

    #[test]
    fn test_no_change_yields_nothing() {
        let s = snap(vec![
            pos("BTCUSDT", dec!(1), dec!(100), dec!(5)),
            pos("ETHUSDT", dec!(3), dec!(2500), dec!(-12)),
        ]);
        assert!(detect_transitions(&s, &s).is_empty());
        assert!(detect_transitions(&PositionSnapshot::new(), &PositionSnapshot::new()).is_empty());
    }

    #[test]
    fn test_new_symbol_is_opened() {
        let current = snap(vec![pos("BTCUSDT", dec!(1), dec!(100), dec!(0))]);
        let events = detect_transitions(&PositionSnapshot::new(), &current);

        assert_eq!(
            events,
            vec![NotificationEvent::Opened {
                symbol: "BTCUSDT".into(),
                side: Side::Long,
                leverage: 10,
                size: dec!(1),
                entry_price: dec!(100),
            }]
        );
        assert_eq!(events[0].transition(), Transition::Opened);
        assert_eq!(events[0].notional(), dec!(100));
    }

    #[test]
    fn test_increase_is_added_with_weighted_average() {
        let previous = snap(vec![pos("BTCUSDT", dec!(1), dec!(100), dec!(0))]);
        let current = snap(vec![pos("BTCUSDT", dec!(1.5), dec!(110), dec!(0))]);
        let events = detect_transitions(&previous, &current);

        assert_eq!(events.len(), 1);
        match &events[0] {
            NotificationEvent::Added {
                added,
                new_total,
                price,
                new_avg_entry,
                ..
            } => {
                assert_eq!(*added, dec!(0.5));
                assert_eq!(*new_total, dec!(1.5));
                assert_eq!(*price, dec!(110));
                assert_eq!(new_avg_entry.round_dp(2), dec!(103.33));
            }
            other => panic!("expected Added, got {other:?}"),
        }
        assert_eq!(events[0].notional(), dec!(55));
    }

    #[test]
    fn test_decrease_is_reduced_against_previous_basis() {
        let previous = snap(vec![pos("BTCUSDT", dec!(2), dec!(100), dec!(50))]);
        let current = snap(vec![pos("BTCUSDT", dec!(1), dec!(105), dec!(20))]);
        let events = detect_transitions(&previous, &current);

        assert_eq!(
            events,
            vec![NotificationEvent::Reduced {
                symbol: "BTCUSDT".into(),
                side: Side::Long,
                leverage: 10,
                reduced: dec!(1),
                remaining: dec!(1),
                exit_price: dec!(105),
                avg_entry: dec!(100),
                pnl: dec!(20),
                pnl_percent: Some(dec!(10)),
            }]
        );
        assert_eq!(events[0].transition(), Transition::Reduced);
    }

    #[test]
    fn test_missing_symbol_is_full_close() {
        let previous = snap(vec![pos("BTCUSDT", dec!(1), dec!(100), dec!(30))]);
        let events = detect_transitions(&previous, &PositionSnapshot::new());

        assert_eq!(
            events,
            vec![NotificationEvent::Reduced {
                symbol: "BTCUSDT".into(),
                side: Side::Long,
                leverage: 10,
                reduced: dec!(1),
                remaining: Decimal::ZERO,
                exit_price: dec!(100),
                avg_entry: dec!(100),
                pnl: dec!(30),
                pnl_percent: Some(dec!(30)),
            }]
        );
        assert_eq!(events[0].transition(), Transition::Closed);
        assert_eq!(events[0].notional(), dec!(100));
    }

    #[test]
    fn test_zero_cost_basis_has_no_percent() {
        let previous = snap(vec![pos("BTCUSDT", dec!(1), Decimal::ZERO, dec!(30))]);
        let events = detect_transitions(&previous, &PositionSnapshot::new());

        match &events[0] {
            NotificationEvent::Reduced { pnl_percent, .. } => assert_eq!(*pnl_percent, None),
            other => panic!("expected Reduced, got {other:?}"),
        }
    }

    #[test]
    fn test_event_order_opened_then_modified_then_closed() {
        let previous = snap(vec![
            pos("ADAUSDT", dec!(100), dec!(0.5), dec!(0)),
            pos("ETHUSDT", dec!(1), dec!(2000), dec!(0)),
        ]);
        let current = snap(vec![
            pos("ETHUSDT", dec!(2), dec!(2100), dec!(0)),
            pos("SOLUSDT", dec!(10), dec!(150), dec!(0)),
        ]);
        let events = detect_transitions(&previous, &current);

        let kinds: Vec<(&str, Transition)> =
            events.iter().map(|e| (e.symbol(), e.transition())).collect();
        assert_eq!(
            kinds,
            vec![
                ("SOLUSDT", Transition::Opened),
                ("ETHUSDT", Transition::Added),
                ("ADAUSDT", Transition::Closed),
            ]
        );
    }

    #[test]
    fn test_pnl_percent_helpers() {
        let prev = pos("BTCUSDT", dec!(2), dec!(100), dec!(0));
        assert_eq!(pnl_percent(&prev, dec!(-20)).unwrap(), dec!(-10));

        let empty = pos("BTCUSDT", Decimal::ZERO, dec!(100), dec!(0));
        assert_eq!(
            pnl_percent(&empty, dec!(1)),
            Err(ComputationError::ZeroCostBasis {
                symbol: "BTCUSDT".into()
            })
        );
        assert!(weighted_average_entry(&prev, dec!(1), dec!(100), Decimal::ZERO).is_err());
    }
}
