//! Menu Item API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};

use shared::SyncAction;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{MenuItem, MenuItemCreate, MenuItemUpdate};
use crate::db::repository::{MenuItemRepository, parse_record_key};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "menu_item";

/// GET /api/restaurants/:id/menu - 餐厅菜单
pub async fn list(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let restaurant = parse_record_key("restaurant", &id)?;
    let repo = MenuItemRepository::new(state.db.clone());
    let items = repo.find_by_restaurant(&restaurant).await?;
    Ok(Json(items))
}

/// POST /api/restaurants/:id/menu - 新增菜品 (仅限本店管理员)
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<MenuItemCreate>,
) -> AppResult<Json<MenuItem>> {
    if !user.manages_restaurant(&id) {
        return Err(AppError::forbidden("You do not manage this restaurant"));
    }

    let restaurant = parse_record_key("restaurant", &id)?;
    let repo = MenuItemRepository::new(state.db.clone());
    let item = repo.create(restaurant, payload).await?;

    let item_id = item.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    state.broadcast_sync(RESOURCE, SyncAction::Created, &item_id, Some(&item));

    Ok(Json(item))
}

/// PUT /api/menu/:id - 更新菜品 (仅限本店管理员)
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<MenuItemUpdate>,
) -> AppResult<Json<MenuItem>> {
    let repo = MenuItemRepository::new(state.db.clone());
    let existing = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Menu item {} not found", id)))?;

    if !user.manages_restaurant(&existing.restaurant.to_string()) {
        return Err(AppError::forbidden("You do not manage this restaurant"));
    }

    let item = repo.update(&id, payload).await?;
    state.broadcast_sync(RESOURCE, SyncAction::Updated, &id, Some(&item));

    Ok(Json(item))
}

/// DELETE /api/menu/:id - 删除菜品 (仅限本店管理员)
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = MenuItemRepository::new(state.db.clone());
    let existing = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Menu item {} not found", id)))?;

    if !user.manages_restaurant(&existing.restaurant.to_string()) {
        return Err(AppError::forbidden("You do not manage this restaurant"));
    }

    let result = repo.delete(&id).await?;
    if result {
        state.broadcast_sync::<()>(RESOURCE, SyncAction::Deleted, &id, None);
    }

    Ok(Json(result))
}
