//! Reservation API 模块
//!
//! 下单和顾客侧操作对所有登录用户开放，商家侧 (本店预订列表、
//! 状态迁移) 要求管理员角色，餐厅归属在 handler 内校验。

mod handler;

use axum::{Router, middleware, routing::delete, routing::get, routing::post, routing::put};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let customer_routes = Router::new()
        .route("/api/reservations", post(handler::book))
        .route("/api/reservations/mine", get(handler::mine))
        .route("/api/reservations/{id}", delete(handler::cancel_own));

    let admin_routes = Router::new()
        .route(
            "/api/restaurants/{id}/reservations",
            get(handler::by_restaurant),
        )
        .route("/api/reservations/{id}/status", put(handler::set_status))
        .layer(middleware::from_fn(require_admin));

    customer_routes.merge(admin_routes)
}
