//! Time Slot API 模块
//!
//! 查询走 Availability Resolver，播种 (PUT) 仅限本店管理员。

mod handler;

use axum::{Router, middleware, routing::get, routing::put};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/api/restaurants/{id}/slots", get(handler::list))
        .route("/api/restaurants/{id}/slots/{label}", get(handler::check));

    let manage_routes = Router::new()
        .route("/api/restaurants/{id}/slots/{label}", put(handler::upsert))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
