//! 预订核心
//!
//! # 组件
//!
//! - [`AvailabilityResolver`] - 时段可用性解析 (按时刻排序的分区列表、单时段查询)
//! - [`BookingWriter`] - 事务化下单：校验可用性与容量、创建预订、占用时段
//! - [`ReservationLifecycle`] - 商家确认/取消、顾客撤单；取消释放时段
//!
//! # 并发模型
//!
//! 时段文档是唯一的竞争点。下单的检查-占用全程在单个数据库事务内完成，
//! 两个并发预订同一时段时最多一个成功，落败方收到 [`BookingError::SlotTaken`]
//! 或事务冲突。

pub mod error;
pub mod lifecycle;
pub mod resolver;
pub mod writer;

#[cfg(test)]
mod tests;

pub use error::BookingError;
pub use lifecycle::ReservationLifecycle;
pub use resolver::AvailabilityResolver;
pub use writer::{BookingRequest, BookingWriter};
