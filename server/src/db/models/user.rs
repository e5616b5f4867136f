//! User Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::Role;
use surrealdb::RecordId;

/// User entity (用户)
///
/// `password_hash` 为 Argon2 哈希。API 层只返回 [`UserInfo`]，
/// 哈希不出现在任何响应中。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    /// 管理员所属餐厅；顾客为 None
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub restaurant: Option<RecordId>,
}

/// Create user payload (repository 层)
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub restaurant: Option<RecordId>,
}

/// API 响应中的用户信息 (无密码哈希)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_id: Option<String>,
}

impl From<&User> for UserInfo {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            username: u.username.clone(),
            email: u.email.clone(),
            role: u.role,
            restaurant_id: u.restaurant.as_ref().map(|r| r.to_string()),
        }
    }
}
