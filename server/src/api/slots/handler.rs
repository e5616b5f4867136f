//! Time Slot API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use shared::SyncAction;

use crate::auth::CurrentUser;
use crate::booking::AvailabilityResolver;
use crate::core::ServerState;
use crate::db::models::{SlotStatus, TimeSlot, TimeSlotUpsert};
use crate::db::repository::{TimeSlotRepository, parse_record_key};
use crate::utils::time::{parse_date, parse_label};
use crate::utils::{AppError, AppResult};

const RESOURCE: &str = "time_slot";

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    /// 日期分区键 (DD-MM-YYYY)
    pub date: String,
}

/// GET /api/restaurants/:id/slots?date=DD-MM-YYYY - 某日全部时段
pub async fn list(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<Vec<TimeSlot>>> {
    parse_date(&query.date)?;
    let restaurant = parse_record_key("restaurant", &id)?;

    let resolver = AvailabilityResolver::new(state.db.clone());
    let slots = resolver.list_slots(&restaurant, &query.date).await?;
    Ok(Json(slots))
}

/// GET /api/restaurants/:id/slots/:label?date=DD-MM-YYYY - 单时段状态
pub async fn check(
    State(state): State<ServerState>,
    Path((id, label)): Path<(String, String)>,
    Query(query): Query<DateQuery>,
) -> AppResult<Json<SlotStatus>> {
    parse_date(&query.date)?;
    let restaurant = parse_record_key("restaurant", &id)?;

    let resolver = AvailabilityResolver::new(state.db.clone());
    let status = resolver.check_slot(&restaurant, &query.date, &label).await?;
    Ok(Json(status))
}

/// PUT /api/restaurants/:id/slots/:label - 播种/覆盖时段 (仅限本店管理员)
pub async fn upsert(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path((id, label)): Path<(String, String)>,
    Json(payload): Json<TimeSlotUpsert>,
) -> AppResult<Json<TimeSlot>> {
    if !user.manages_restaurant(&id) {
        return Err(AppError::forbidden("You do not manage this restaurant"));
    }

    parse_date(&payload.date)?;
    parse_label(&label)?;
    if payload.capacity <= 0 {
        return Err(AppError::validation("Slot capacity must be positive"));
    }

    let restaurant = parse_record_key("restaurant", &id)?;
    let repo = TimeSlotRepository::new(state.db.clone());
    let slot = repo
        .upsert(
            restaurant,
            &payload.date,
            &label,
            payload.available,
            payload.capacity,
        )
        .await?;

    let slot_id = slot.id.as_ref().map(|t| t.to_string()).unwrap_or_default();
    state.broadcast_sync(RESOURCE, SyncAction::Updated, &slot_id, Some(&slot));

    Ok(Json(slot))
}
