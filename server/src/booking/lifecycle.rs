//! Reservation Lifecycle
//!
//! 商家确认/取消、顾客撤单。任何取消路径都会释放对应时段，
//! 与读-改-写一样在单个事务内完成。

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use shared::ReservationStatus;

use crate::db::models::Reservation;
use crate::db::repository::ReservationRepository;

use super::BookingError;
use super::error::{ERR_NOT_OWNER, ERR_RESERVATION_NOT_FOUND};

/// 商家改状态。取消时释放时段：以 held_by 判断占用归属，只有仍
/// 指向本预订的时段才会被放回。到期时间是 (日期, 时段) 的确定函数，
/// 不能作为围栏，同一时段被回收后重新占用会携带相同的到期时间。
const SET_STATUS_QUERY: &str = "\
BEGIN TRANSACTION;
LET $res = (SELECT * FROM type::thing('reservation', $rid))[0];
IF $res == NONE { THROW 'ERR_RESERVATION_NOT_FOUND' };
IF $status == 'canceled' {
    UPDATE time_slot SET available = true, booking_end_time = NONE, held_by = NONE
        WHERE held_by = $res.id;
};
UPDATE $res.id SET status = $status;
COMMIT TRANSACTION;";

/// 顾客撤单。删除预订并释放时段，占用归属校验同上。
const CANCEL_OWN_QUERY: &str = "\
BEGIN TRANSACTION;
LET $res = (SELECT * FROM type::thing('reservation', $rid))[0];
IF $res == NONE { THROW 'ERR_RESERVATION_NOT_FOUND' };
IF $res.customer_uid != $uid { THROW 'ERR_NOT_OWNER' };
UPDATE time_slot SET available = true, booking_end_time = NONE, held_by = NONE
    WHERE held_by = $res.id;
DELETE $res.id;
COMMIT TRANSACTION;";

/// 预订生命周期管理
#[derive(Clone)]
pub struct ReservationLifecycle {
    db: Surreal<Db>,
    reservations: ReservationRepository,
}

impl ReservationLifecycle {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            reservations: ReservationRepository::new(db.clone()),
            db,
        }
    }

    /// 商家设置预订状态 (confirmed / canceled)
    ///
    /// 取消会同时把时段放回可用池。重复取消是幂等的，不会
    /// 影响已被重新占用的时段。
    pub async fn set_status(
        &self,
        reservation_key: &str,
        status: ReservationStatus,
    ) -> Result<Reservation, BookingError> {
        if !status.is_staff_settable() {
            return Err(BookingError::InvalidStatus(format!(
                "Staff cannot set status to '{status}'"
            )));
        }

        let key = bare_key(reservation_key);
        let mut response = self
            .db
            .query(SET_STATUS_QUERY)
            .bind(("rid", key.to_string()))
            .bind(("status", status))
            .await
            .map_err(BookingError::from)?;

        let errors = response.take_errors();
        if !errors.is_empty() {
            return Err(map_lifecycle_error(errors, reservation_key));
        }

        let updated = self
            .reservations
            .find_by_id(reservation_key)
            .await?
            .ok_or_else(|| BookingError::ReservationNotFound(reservation_key.to_string()))?;

        tracing::info!(
            reservation = %reservation_key,
            status = %status,
            "Reservation status updated"
        );

        Ok(updated)
    }

    /// 顾客撤销自己的预订
    ///
    /// 删除预订记录并释放时段。非本人预订返回 [`BookingError::NotOwner`]。
    pub async fn cancel_own(
        &self,
        reservation_key: &str,
        customer_uid: &str,
    ) -> Result<Reservation, BookingError> {
        // 先取回预订内容作为返回值，事务内再做存在性与归属校验
        let existing = self
            .reservations
            .find_by_id(reservation_key)
            .await?
            .ok_or_else(|| BookingError::ReservationNotFound(reservation_key.to_string()))?;

        let key = bare_key(reservation_key);
        let mut response = self
            .db
            .query(CANCEL_OWN_QUERY)
            .bind(("rid", key.to_string()))
            .bind(("uid", customer_uid.to_string()))
            .await
            .map_err(BookingError::from)?;

        let errors = response.take_errors();
        if !errors.is_empty() {
            return Err(map_lifecycle_error(errors, reservation_key));
        }

        tracing::info!(
            reservation = %reservation_key,
            customer = %customer_uid,
            "Reservation canceled by customer, slot released"
        );

        Ok(existing)
    }
}

/// 接受 "reservation:key" 或裸 key 两种写法
fn bare_key(reservation_key: &str) -> &str {
    reservation_key
        .strip_prefix("reservation:")
        .unwrap_or(reservation_key)
}

// 事务中止时每条语句都带上级联错误，哨兵要在全部错误里找
fn map_lifecycle_error(
    errors: std::collections::HashMap<usize, surrealdb::Error>,
    reservation_key: &str,
) -> BookingError {
    let msg = errors
        .values()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    if msg.contains(ERR_RESERVATION_NOT_FOUND) {
        BookingError::ReservationNotFound(reservation_key.to_string())
    } else if msg.contains(ERR_NOT_OWNER) {
        BookingError::NotOwner
    } else {
        BookingError::Store(msg)
    }
}
