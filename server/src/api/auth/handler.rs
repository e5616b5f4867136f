//! Authentication Handlers
//!
//! 注册、登录和当前用户信息。

use std::time::Duration;

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use shared::{Role, SyncAction};

use crate::AppError;
use crate::auth::{CurrentUser, password};
use crate::core::ServerState;
use crate::db::models::{RestaurantCreate, UserCreate, UserInfo};
use crate::db::repository::{RestaurantRepository, UserRepository};
use crate::security_log;

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    /// customer (默认) | admin
    #[serde(default)]
    pub role: Option<Role>,
    /// 管理员注册时创建并绑定的新餐厅
    #[serde(default)]
    pub restaurant: Option<RestaurantCreate>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Register handler
///
/// 创建账号并直接返回令牌。管理员只能随注册创建并绑定新餐厅，
/// 不接受指向已有餐厅的绑定，已有餐厅的归属不经持有者授权不可转移。
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if req.username.trim().is_empty() {
        return Err(AppError::validation("Username must not be empty"));
    }
    if !req.email.contains('@') {
        return Err(AppError::validation("Invalid email address"));
    }
    if req.password.len() < 8 {
        return Err(AppError::validation(
            "Password must be at least 8 characters",
        ));
    }

    let role = req.role.unwrap_or(Role::Customer);
    let restaurant = match role {
        Role::Admin => {
            let payload = req.restaurant.ok_or_else(|| {
                AppError::validation(
                    "Admin registration must include a restaurant to create",
                )
            })?;
            let created = RestaurantRepository::new(state.db.clone())
                .create(payload)
                .await?;
            let thing = created
                .id
                .clone()
                .ok_or_else(|| AppError::database("Restaurant record missing id"))?;
            state.broadcast_sync(
                "restaurant",
                SyncAction::Created,
                &thing.to_string(),
                Some(&created),
            );
            Some(thing)
        }
        Role::Customer => None,
    };

    let password_hash = password::hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;

    let repo = UserRepository::new(state.db.clone());
    let user = repo
        .create(UserCreate {
            username: req.username,
            email: req.email,
            password_hash,
            role,
            restaurant,
        })
        .await?;

    security_log!(
        "INFO",
        "user_registered",
        email = user.email.clone(),
        role = user.role.to_string()
    );

    let token = issue_token(&state, &user)?;
    Ok(Json(AuthResponse {
        token,
        user: UserInfo::from(&user),
    }))
}

/// Login handler
///
/// Authenticates user credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let repo = UserRepository::new(state.db.clone());
    let user = repo.find_by_email(&req.email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // 统一错误消息，防止通过错误提示枚举邮箱
    let user = match user {
        Some(u) => {
            let password_valid = password::verify_password(&req.password, &u.password_hash)
                .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

            if !password_valid {
                security_log!("WARN", "login_failed", email = req.email.clone());
                return Err(AppError::invalid_credentials());
            }

            u
        }
        None => {
            security_log!("WARN", "login_failed", email = req.email.clone());
            return Err(AppError::invalid_credentials());
        }
    };

    let token = issue_token(&state, &user)?;

    tracing::info!(
        email = %user.email,
        role = %user.role,
        "User logged in successfully"
    );

    Ok(Json(AuthResponse {
        token,
        user: UserInfo::from(&user),
    }))
}

/// Get current user info
pub async fn me(
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<UserInfo>, AppError> {
    Ok(Json(UserInfo {
        id: user.id,
        username: user.username,
        email: user.email,
        role: user.role,
        restaurant_id: user.restaurant_id,
    }))
}

fn issue_token(state: &ServerState, user: &crate::db::models::User) -> Result<String, AppError> {
    let user_id = user.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    let restaurant_id = user.restaurant.as_ref().map(|r| r.to_string());

    state
        .get_jwt_service()
        .generate_token(
            &user_id,
            &user.username,
            &user.email,
            user.role,
            restaurant_id.as_deref(),
        )
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))
}
