//! Booking Writer
//!
//! 下单路径。检查-占用必须原子：时段的可用性校验、容量校验、
//! 预订创建和时段占用在单个数据库事务内完成，并发下单同一时段
//! 时最多一个事务能提交。

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use uuid::Uuid;

use crate::db::models::{Customer, Reservation};
use crate::db::repository::TimeSlotRepository;
use crate::utils::time::{booking_end_millis, now_millis};

use super::BookingError;
use super::error::{ERR_CAPACITY_EXCEEDED, ERR_SLOT_NOT_FOUND, ERR_SLOT_TAKEN};

/// 下单请求
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub restaurant: RecordId,
    pub restaurant_name: String,
    /// 日期分区键 (DD-MM-YYYY)
    pub date: String,
    /// 时段标签 (HH:MM)
    pub label: String,
    pub guests: i64,
    pub customer: Customer,
}

/// 检查-占用事务
///
/// 时段校验失败通过 THROW 中止整个事务，哨兵消息由调用方映射为域错误。
const BOOK_QUERY: &str = "\
BEGIN TRANSACTION;
LET $slot = (SELECT * FROM time_slot WHERE restaurant = $restaurant AND date = $date AND label = $label LIMIT 1)[0];
IF $slot == NONE { THROW 'ERR_SLOT_NOT_FOUND' };
IF $slot.available == false { THROW 'ERR_SLOT_TAKEN' };
IF $guests > $slot.capacity { THROW 'ERR_CAPACITY_EXCEEDED' };
UPDATE $slot.id SET available = false, booking_end_time = $end_time, held_by = type::thing('reservation', $rid);
CREATE type::thing('reservation', $rid) CONTENT {
    restaurant: $restaurant,
    restaurant_name: $restaurant_name,
    date: $date,
    label: $label,
    guests: $guests,
    customer_uid: $uid,
    customer_name: $customer_name,
    customer_email: $customer_email,
    status: 'pending',
    created_at: $created_at,
    booking_end_time: $end_time
};
COMMIT TRANSACTION;";

/// 预订写入器
#[derive(Clone)]
pub struct BookingWriter {
    db: Surreal<Db>,
    slots: TimeSlotRepository,
    /// 单次预订占用时段的时长 (分钟)
    duration_minutes: i64,
}

impl BookingWriter {
    pub fn new(db: Surreal<Db>, duration_minutes: i64) -> Self {
        Self {
            slots: TimeSlotRepository::new(db.clone()),
            db,
            duration_minutes,
        }
    }

    /// 下单
    ///
    /// 成功时时段被占用 (`available = false`，记录占用到期时间)，
    /// 并创建一条 `pending` 预订。
    ///
    /// # 错误
    ///
    /// - [`BookingError::InvalidRequest`] - 人数非正或日期/时段格式非法
    /// - [`BookingError::SlotNotFound`] - 时段未播种
    /// - [`BookingError::SlotTaken`] - 提交时时段已被占用 (包括并发竞争落败)
    /// - [`BookingError::CapacityExceeded`] - 人数超过时段容量
    pub async fn book(&self, request: BookingRequest) -> Result<Reservation, BookingError> {
        if request.guests <= 0 {
            return Err(BookingError::InvalidRequest(format!(
                "Guest count must be positive, got {}",
                request.guests
            )));
        }

        let end_time = booking_end_millis(&request.date, &request.label, self.duration_minutes)
            .map_err(|e| BookingError::InvalidRequest(e.to_string()))?;

        // 无连字符的 UUID 作为记录键，避免 RecordId 字符串转义
        let rid = Uuid::new_v4().simple().to_string();

        let mut response = self
            .db
            .query(BOOK_QUERY)
            .bind(("restaurant", request.restaurant.clone()))
            .bind(("restaurant_name", request.restaurant_name.clone()))
            .bind(("date", request.date.clone()))
            .bind(("label", request.label.clone()))
            .bind(("guests", request.guests))
            .bind(("uid", request.customer.uid.clone()))
            .bind(("customer_name", request.customer.name.clone()))
            .bind(("customer_email", request.customer.email.clone()))
            .bind(("created_at", now_millis()))
            .bind(("end_time", end_time))
            .bind(("rid", rid.clone()))
            .await
            .map_err(BookingError::from)?;

        // 事务中止时每条语句都带上级联错误，THROW 的哨兵不一定排在
        // 第一条，必须扫描全部错误
        let errors = response.take_errors();
        if !errors.is_empty() {
            return Err(self.map_booking_error(errors, &request).await);
        }

        // 事务已提交，按记录键取回预订
        let created: Option<Reservation> = self
            .db
            .select(("reservation", rid.as_str()))
            .await
            .map_err(BookingError::from)?;

        let reservation = created.ok_or_else(|| {
            BookingError::Store("Reservation vanished after commit".to_string())
        })?;

        tracing::info!(
            reservation = %rid,
            date = %request.date,
            label = %request.label,
            guests = request.guests,
            "Reservation created, slot claimed"
        );

        Ok(reservation)
    }

    async fn map_booking_error(
        &self,
        errors: std::collections::HashMap<usize, surrealdb::Error>,
        request: &BookingRequest,
    ) -> BookingError {
        let msg = errors
            .values()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        if msg.contains(ERR_SLOT_NOT_FOUND) {
            return BookingError::SlotNotFound {
                date: request.date.clone(),
                label: request.label.clone(),
            };
        }
        if msg.contains(ERR_SLOT_TAKEN) {
            return BookingError::SlotTaken {
                date: request.date.clone(),
                label: request.label.clone(),
            };
        }
        if msg.contains(ERR_CAPACITY_EXCEEDED) {
            // 事务已中止，补读容量以生成完整错误信息
            let capacity = self
                .slots
                .find_slot(&request.restaurant, &request.date, &request.label)
                .await
                .ok()
                .flatten()
                .map(|s| s.capacity)
                .unwrap_or(0);
            return BookingError::CapacityExceeded {
                guests: request.guests,
                capacity,
            };
        }
        BookingError::Store(msg)
    }
}
