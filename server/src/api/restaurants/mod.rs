//! Restaurant API 模块

mod handler;

use axum::{Router, middleware, routing::get, routing::put};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/restaurants", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    // 餐厅创建发生在管理员注册时 (api::auth)，这里只有信息更新
    let manage_routes = Router::new()
        .route("/{id}", put(handler::update))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
