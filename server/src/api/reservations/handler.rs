//! Reservation API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::Deserialize;

use shared::{ReservationStatus, SyncAction};

use crate::auth::CurrentUser;
use crate::booking::{BookingRequest, BookingWriter, ReservationLifecycle};
use crate::core::ServerState;
use crate::db::models::{Customer, Reservation};
use crate::db::repository::{
    ReservationRepository, RestaurantRepository, TimeSlotRepository, parse_record_key,
};
use crate::utils::time::parse_date;
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "reservation";
const SLOT_RESOURCE: &str = "time_slot";

#[derive(Debug, Deserialize)]
pub struct BookRequest {
    pub restaurant_id: String,
    /// 日期分区键 (DD-MM-YYYY)
    pub date: String,
    /// 时段标签 (HH:MM)
    pub label: String,
    pub guests: i64,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: ReservationStatus,
}

/// POST /api/reservations - 下单
///
/// 预订人身份取自 JWT，不接受客户端自报。
pub async fn book(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(req): Json<BookRequest>,
) -> AppResult<Json<Reservation>> {
    parse_date(&req.date)?;
    let restaurant = parse_record_key("restaurant", &req.restaurant_id)?;

    let restaurant_name = RestaurantRepository::new(state.db.clone())
        .find_by_id(&req.restaurant_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("Restaurant {} not found", req.restaurant_id))
        })?
        .name;

    let writer = BookingWriter::new(state.db.clone(), state.config.booking_duration_minutes);
    let reservation = writer
        .book(BookingRequest {
            restaurant: restaurant.clone(),
            restaurant_name,
            date: req.date.clone(),
            label: req.label.clone(),
            guests: req.guests,
            customer: Customer {
                uid: user.id.clone(),
                name: user.username.clone(),
                email: user.email.clone(),
            },
        })
        .await?;

    let id = reservation
        .id
        .as_ref()
        .map(|t| t.to_string())
        .unwrap_or_default();
    state.broadcast_sync(RESOURCE, SyncAction::Created, &id, Some(&reservation));
    broadcast_slot(&state, &restaurant, &req.date, &req.label).await;

    Ok(Json(reservation))
}

/// GET /api/reservations/mine - 自己的全部预订
pub async fn mine(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<Reservation>>> {
    let repo = ReservationRepository::new(state.db.clone());
    let reservations = repo.find_by_customer(&user.id).await?;
    Ok(Json(reservations))
}

/// GET /api/restaurants/:id/reservations - 本店全部预订 (仅限本店管理员)
pub async fn by_restaurant(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Reservation>>> {
    if !user.manages_restaurant(&id) {
        return Err(AppError::forbidden("You do not manage this restaurant"));
    }

    let restaurant = parse_record_key("restaurant", &id)?;
    let repo = ReservationRepository::new(state.db.clone());
    let reservations = repo.find_by_restaurant(&restaurant).await?;
    Ok(Json(reservations))
}

/// PUT /api/reservations/:id/status - 确认/取消预订 (仅限本店管理员)
pub async fn set_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(req): Json<StatusRequest>,
) -> AppResult<Json<Reservation>> {
    let repo = ReservationRepository::new(state.db.clone());
    let existing = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Reservation {} not found", id)))?;

    if !user.manages_restaurant(&existing.restaurant.to_string()) {
        return Err(AppError::forbidden("You do not manage this restaurant"));
    }

    let lifecycle = ReservationLifecycle::new(state.db.clone());
    let updated = lifecycle.set_status(&id, req.status).await?;

    state.broadcast_sync(RESOURCE, SyncAction::Updated, &id, Some(&updated));
    if req.status == ReservationStatus::Canceled {
        // 取消释放了时段，推送最新状态
        broadcast_slot(&state, &updated.restaurant, &updated.date, &updated.label).await;
    }

    Ok(Json(updated))
}

/// DELETE /api/reservations/:id - 顾客撤销自己的预订
pub async fn cancel_own(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let lifecycle = ReservationLifecycle::new(state.db.clone());
    let removed = lifecycle.cancel_own(&id, &user.id).await?;

    state.broadcast_sync::<()>(RESOURCE, SyncAction::Deleted, &id, None);
    broadcast_slot(&state, &removed.restaurant, &removed.date, &removed.label).await;

    Ok(Json(true))
}

/// 推送时段的最新状态；查询失败只记日志，不影响主流程
async fn broadcast_slot(
    state: &ServerState,
    restaurant: &surrealdb::RecordId,
    date: &str,
    label: &str,
) {
    let repo = TimeSlotRepository::new(state.db.clone());
    match repo.find_slot(restaurant, date, label).await {
        Ok(Some(slot)) => {
            let slot_id = slot.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
            state.broadcast_sync(SLOT_RESOURCE, SyncAction::Updated, &slot_id, Some(&slot));
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(date, label, error = %e, "Failed to load slot for sync broadcast");
        }
    }
}
