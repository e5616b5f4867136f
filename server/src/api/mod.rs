//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 注册 / 登录 / 当前用户
//! - [`restaurants`] - 餐厅信息
//! - [`menu`] - 菜单管理
//! - [`slots`] - 时段查询与播种
//! - [`reservations`] - 预订下单与生命周期
//! - [`events`] - 资源变更推送 (SSE)

pub mod auth;
pub mod events;
pub mod health;
pub mod menu;
pub mod reservations;
pub mod restaurants;
pub mod slots;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(restaurants::router())
        .merge(menu::router())
        .merge(slots::router())
        .merge(reservations::router())
        .merge(events::router())
}

/// Build the complete application with middleware and state
pub fn router(state: ServerState) -> Router {
    build_app()
        // JWT 认证中间件 - 在 Router 级别应用，require_auth 内部会跳过公共路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(log_request))
}
