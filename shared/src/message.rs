//! 同步消息类型定义
//!
//! 服务端在每次资源变更后向所有订阅者推送 [`SyncPayload`]，
//! 客户端通过版本号判断数据新旧（服务端为每种资源维护递增版本）。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 资源变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    Created,
    Updated,
    Deleted,
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Created => write!(f, "created"),
            SyncAction::Updated => write!(f, "updated"),
            SyncAction::Deleted => write!(f, "deleted"),
        }
    }
}

/// 同步信号载荷
///
/// ```json
/// {
///   "resource": "reservation",
///   "version": 42,
///   "action": "created",
///   "id": "reservation:abc",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPayload {
    /// 资源类型 (如 "reservation", "time_slot", "menu_item")
    pub resource: String,
    /// 该资源类型的递增版本号
    pub version: u64,
    /// 变更类型
    pub action: SyncAction,
    /// 资源 ID
    pub id: String,
    /// 资源数据 (deleted 时为 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl SyncPayload {
    pub fn new<T: Serialize>(
        resource: &str,
        version: u64,
        action: SyncAction,
        id: &str,
        data: Option<&T>,
    ) -> Self {
        Self {
            resource: resource.to_string(),
            version,
            action,
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        }
    }
}
