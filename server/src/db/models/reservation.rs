//! Reservation Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::ReservationStatus;
use surrealdb::RecordId;

/// Reservation entity (预订)
///
/// 餐厅名冗余存储，列表展示时无需再查餐厅表。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    /// Restaurant reference
    #[serde(with = "serde_helpers::record_id")]
    pub restaurant: RecordId,
    pub restaurant_name: String,
    /// 日期分区键 (DD-MM-YYYY)
    pub date: String,
    /// 时段标签 (HH:MM)
    pub label: String,
    pub guests: i64,
    /// 预订人身份
    pub customer_uid: String,
    pub customer_name: String,
    pub customer_email: String,
    pub status: ReservationStatus,
    /// 创建时间 (Unix millis)
    pub created_at: i64,
    /// 预订占用的到期时间 (Unix millis) = 时段开始 + 预订时长
    pub booking_end_time: i64,
}

/// 预订人身份 (从 JWT 解析，不由客户端自报)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub uid: String,
    pub name: String,
    pub email: String,
}
