use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use rust_decimal::{Decimal, RoundingStrategy};

use super::snapshot::Side;
use super::transition::{NotificationEvent, Transition};

const PRICE_DP: u32 = 4;
const USD_DP: u32 = 2;
const PERCENT_DP: u32 = 1;

fn status_emoji(transition: Transition) -> &'static str {
    match transition {
        Transition::Opened => "🟢",
        Transition::Added => "🔵",
        Transition::Reduced => "🟠",
        Transition::Closed => "🔴",
    }
}

fn side_emoji(side: Side) -> &'static str {
    match side {
        Side::Long => "📈",
        Side::Short => "📉",
    }
}

/// 整数部分加千分位逗号
fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// 固定小数位，例如 1234.5 -> "1,234.50"
pub fn format_fixed(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    group_thousands(&rounded.to_string())
}

/// 价格与数量：保留 4 位并去掉末尾的 0，例如 106.66666 -> "106.6667"，100.0 -> "100"
pub fn format_price(value: Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(PRICE_DP, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    group_thousands(&rounded.to_string())
}

/// 美元金额，例如 "$1,234.50"
pub fn format_usd(value: Decimal) -> String {
    format!("${}", format_fixed(value, USD_DP))
}

/// 带符号的盈亏，例如 "+$20.00 (+10.0%)" 或 "-$45.68 (-12.3%)"
pub fn format_pnl(pnl: Decimal, percent: Option<Decimal>) -> String {
    // 符号跟随取整后的金额，-0.004 显示为 +$0.00
    let rounded = pnl.round_dp_with_strategy(USD_DP, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        "+"
    };
    let amount = format_usd(rounded.abs());
    let percent = match percent {
        Some(pct) => {
            let body = format_fixed(pct, PERCENT_DP);
            if body.starts_with('-') {
                format!("{body}%")
            } else {
                format!("+{body}%")
            }
        }
        None => "n/a".to_string(),
    };
    format!("{sign}{amount} ({percent})")
}

/// 按本地当前时间生成通知文本
pub fn format_notification(event: &NotificationEvent) -> String {
    format_notification_at(event, Local::now())
}

/// 生成 Telegram HTML 通知文本，时间按 `at` 所在时区显示
pub fn format_notification_at<Tz>(event: &NotificationEvent, at: DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let emoji = status_emoji(event.transition());
    let time = at.format("%d %b %H:%M");
    let notional = format_usd(event.notional());

    match event {
        NotificationEvent::Opened {
            symbol,
            side,
            leverage,
            size,
            entry_price,
        } => format!(
            "{emoji} <b>NEW POSITION</b> {side}\n\
             ┣ <b>{symbol}</b> | {leverage}x\n\
             ┣ ⏰ {time}\n\
             ┃\n\
             ┣ Size: <b>{size}</b>\n\
             ┣ Entry: <b>${entry}</b>\n\
             ┗ Notional: <b>{notional}</b>",
            side = side_emoji(*side),
            size = format_price(*size),
            entry = format_price(*entry_price),
        ),
        NotificationEvent::Added {
            symbol,
            side,
            leverage,
            added,
            new_total,
            new_avg_entry,
            ..
        } => format!(
            "{emoji} <b>POSITION ADDED</b> {side}\n\
             ┣ <b>{symbol}</b> | {leverage}x\n\
             ┣ ⏰ {time}\n\
             ┃\n\
             ┣ Current Size: <b>{total}</b>\n\
             ┣ Added: <b>{added}</b>\n\
             ┣ New Avg: <b>${avg}</b>\n\
             ┗ Notional Added: <b>{notional}</b>",
            side = side_emoji(*side),
            total = format_price(*new_total),
            added = format_price(*added),
            avg = format_price(*new_avg_entry),
        ),
        NotificationEvent::Reduced {
            symbol,
            side,
            leverage,
            reduced,
            remaining,
            exit_price,
            avg_entry,
            pnl,
            pnl_percent,
        } => {
            let title = if remaining.is_zero() {
                "POSITION CLOSED"
            } else {
                "POSITION REDUCED"
            };
            format!(
                "{emoji} <b>{title}</b> {side}\n\
                 ┣ <b>{symbol}</b> | {leverage}x\n\
                 ┣ ⏰ {time}\n\
                 ┃\n\
                 ┣ Remaining: <b>{remaining}</b>\n\
                 ┣ Reduced: <b>{reduced}</b>\n\
                 ┣ Exit Price: <b>${exit}</b>\n\
                 ┣ Avg Entry: <b>${entry}</b>\n\
                 ┣ Notional Removed: <b>{notional}</b>\n\
                 ┗ PnL: <b>{pnl}</b>",
                side = side_emoji(*side),
                remaining = format_price(*remaining),
                reduced = format_price(*reduced),
                exit = format_price(*exit_price),
                entry = format_price(*avg_entry),
                pnl = format_pnl(*pnl, *pnl_percent),
            )
        }
    }
}
