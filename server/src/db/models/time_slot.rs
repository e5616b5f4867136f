//! Time Slot Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Time slot entity (可预订时段)
///
/// 按 (restaurant, date, label) 唯一。`available = false` 表示该时段
/// 已被一个预订占用；`booking_end_time` 记录占用的到期时间 (Unix millis)，
/// 供定时回收任务释放。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Restaurant reference
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant: RecordId,
    /// 日期分区键 (DD-MM-YYYY)
    pub date: String,
    /// 时段标签 (HH:MM)
    pub label: String,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub available: bool,
    /// 该时段的总客位容量
    #[serde(default)]
    pub capacity: i64,
    /// 占用到期时间 (Unix millis)，空闲时为 None
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_end_time: Option<i64>,
    /// 当前占用该时段的预订，空闲时为 None
    ///
    /// 取消路径以此为准判断时段是否仍归该预订，到期时间相同的
    /// 两次占用不会互相误放。
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub held_by: Option<RecordId>,
}

fn default_true() -> bool {
    true
}

/// Seed/override a slot (admin payload)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSlotUpsert {
    /// 日期分区键 (DD-MM-YYYY)
    pub date: String,
    pub available: bool,
    pub capacity: i64,
}

/// Availability Resolver 的单时段查询结果
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlotStatus {
    pub available: bool,
    pub capacity: i64,
}
