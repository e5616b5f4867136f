//! 基础业务类型
//!
//! 用户角色和预订状态机，服务端与客户端共用。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 顾客 - 浏览餐厅、预订餐位
    Customer,
    /// 管理员 - 管理自己餐厅的信息、菜单和预订
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Customer => write!(f, "customer"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl Role {
    /// 从字符串解析角色，未知值归为 customer
    pub fn parse_or_customer(s: &str) -> Self {
        match s {
            "admin" => Role::Admin,
            _ => Role::Customer,
        }
    }
}

/// 预订状态
///
/// 状态机：`pending -> confirmed | canceled`。
/// 取消会释放对应时段（见 server 的 lifecycle 模块）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    /// 等待商家确认
    Pending,
    /// 商家已确认
    Confirmed,
    /// 已取消
    Canceled,
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "pending"),
            ReservationStatus::Confirmed => write!(f, "confirmed"),
            ReservationStatus::Canceled => write!(f, "canceled"),
        }
    }
}

impl ReservationStatus {
    /// 商家能否将预订迁移到该状态
    ///
    /// 商家只能 confirm / cancel，不能把预订重置回 pending。
    pub fn is_staff_settable(&self) -> bool {
        matches!(self, ReservationStatus::Confirmed | ReservationStatus::Canceled)
    }
}
