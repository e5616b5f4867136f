//! 数据模型
//!
//! SurrealDB 行类型，同时作为 API 响应类型
//! (RecordId 通过 serde_helpers 序列化为 "table:id" 字符串)。

pub mod menu_item;
pub mod reservation;
pub mod restaurant;
pub mod serde_helpers;
pub mod time_slot;
pub mod user;

// Re-exports
pub use menu_item::*;
pub use reservation::*;
pub use restaurant::*;
pub use time_slot::*;
pub use user::*;
