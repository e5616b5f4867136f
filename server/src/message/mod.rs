//! 消息模块 - 资源变更同步
//!
//! 服务端写入资源后通过 [`SyncBus`] 广播变更，SSE 端点把
//! 广播转发给在线客户端，客户端据此刷新本地视图。

pub mod bus;

pub use bus::SyncBus;
