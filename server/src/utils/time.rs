//! 时间工具函数 — 日期分区与时段标签
//!
//! 时段分区按 `DD-MM-YYYY` 日期字符串组织（沿用存量数据的键格式），
//! 时段标签为 `HH:MM`。所有时间戳为 Unix millis (UTC)。

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

use super::{AppError, AppResult};

/// 日期分区键格式: 01-06-2024
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// 时段标签格式: 18:00
pub const LABEL_FORMAT: &str = "%H:%M";

/// 解析日期分区键 (DD-MM-YYYY)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// 格式化日期为分区键
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// 解析时段标签 (HH:MM)
pub fn parse_label(label: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(label, LABEL_FORMAT)
        .map_err(|_| AppError::validation(format!("Invalid time slot label: {}", label)))
}

/// 时段标签 → 当日分钟数，用于排序
///
/// 无法解析的标签返回 None（排序时落到末尾，按字典序兜底）。
pub fn label_minutes(label: &str) -> Option<u32> {
    let time = NaiveTime::parse_from_str(label, LABEL_FORMAT).ok()?;
    use chrono::Timelike;
    Some(time.hour() * 60 + time.minute())
}

/// 时段开始时间 → Unix millis (UTC)
pub fn slot_start_millis(date: &str, label: &str) -> AppResult<i64> {
    let date = parse_date(date)?;
    let time = parse_label(label)?;
    let naive = date.and_time(time);
    Ok(Utc.from_utc_datetime(&naive).timestamp_millis())
}

/// 预订结束时间 = 时段开始 + 预订时长
pub fn booking_end_millis(date: &str, label: &str, duration_minutes: i64) -> AppResult<i64> {
    Ok(slot_start_millis(date, label)? + duration_minutes * 60_000)
}

/// 当前 Unix millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
