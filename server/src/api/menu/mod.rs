//! Menu Item API 模块
//!
//! 菜单条目挂在餐厅下：列表/创建走 `/api/restaurants/{id}/menu`，
//! 单条更新/删除走 `/api/menu/{id}`。

mod handler;

use axum::{Router, middleware, routing::delete, routing::get, routing::post, routing::put};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    let read_routes = Router::new().route("/api/restaurants/{id}/menu", get(handler::list));

    let manage_routes = Router::new()
        .route("/api/restaurants/{id}/menu", post(handler::create))
        .route("/api/menu/{id}", put(handler::update))
        .route("/api/menu/{id}", delete(handler::delete))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
