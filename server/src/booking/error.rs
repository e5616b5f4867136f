//! 预订错误类型

use thiserror::Error;

use crate::db::repository::RepoError;

/// 事务内 THROW 的哨兵消息，错误映射用
pub(crate) const ERR_SLOT_NOT_FOUND: &str = "ERR_SLOT_NOT_FOUND";
pub(crate) const ERR_SLOT_TAKEN: &str = "ERR_SLOT_TAKEN";
pub(crate) const ERR_CAPACITY_EXCEEDED: &str = "ERR_CAPACITY_EXCEEDED";
pub(crate) const ERR_RESERVATION_NOT_FOUND: &str = "ERR_RESERVATION_NOT_FOUND";
pub(crate) const ERR_NOT_OWNER: &str = "ERR_NOT_OWNER";

/// 预订域错误
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Time slot {label} on {date} not found")]
    SlotNotFound { date: String, label: String },

    #[error("Time slot {label} on {date} is no longer available")]
    SlotTaken { date: String, label: String },

    #[error("Guest count {guests} exceeds slot capacity {capacity}")]
    CapacityExceeded { guests: i64, capacity: i64 },

    #[error("Reservation {0} not found")]
    ReservationNotFound(String),

    #[error("Reservation belongs to another customer")]
    NotOwner,

    #[error("Invalid booking request: {0}")]
    InvalidRequest(String),

    #[error("Invalid status transition: {0}")]
    InvalidStatus(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl From<surrealdb::Error> for BookingError {
    fn from(err: surrealdb::Error) -> Self {
        BookingError::Store(err.to_string())
    }
}

impl From<RepoError> for BookingError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound(msg) => BookingError::Store(msg),
            other => BookingError::Store(other.to_string()),
        }
    }
}
