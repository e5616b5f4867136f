//! Restaurant API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use shared::SyncAction;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Restaurant, RestaurantUpdate};
use crate::db::repository::RestaurantRepository;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "restaurant";

/// GET /api/restaurants - 获取所有餐厅 (浏览/地图视图)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Restaurant>>> {
    let repo = RestaurantRepository::new(state.db.clone());
    let restaurants = repo.find_all().await?;
    Ok(Json(restaurants))
}

/// GET /api/restaurants/:id - 获取单个餐厅
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Restaurant>> {
    let repo = RestaurantRepository::new(state.db.clone());
    let restaurant = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Restaurant {} not found", id)))?;
    Ok(Json(restaurant))
}

/// PUT /api/restaurants/:id - 更新餐厅信息 (仅限本店管理员)
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<RestaurantUpdate>,
) -> AppResult<Json<Restaurant>> {
    if !user.manages_restaurant(&id) {
        return Err(AppError::forbidden("You do not manage this restaurant"));
    }

    let repo = RestaurantRepository::new(state.db.clone());
    let restaurant = repo.update(&id, payload).await?;

    state.broadcast_sync(RESOURCE, SyncAction::Updated, &id, Some(&restaurant));

    Ok(Json(restaurant))
}
