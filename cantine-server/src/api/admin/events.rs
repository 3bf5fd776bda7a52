//! Catering request follow-up

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;
use shared::models::{EventRequest, EventRequestStatus, EventStatusUpdate};

use crate::api::{ApiResult, internal, ok};
use crate::auth::ClientIdentity;
use crate::db;
use crate::services::events;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    pub status: Option<EventRequestStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/admin/events?status=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> ApiResult<Vec<EventRequest>> {
    let (limit, offset) = db::page(query.limit, query.offset);
    let events = db::events::list(&state.pool, query.status, limit, offset)
        .await
        .map_err(internal("Event request listing"))?;
    ok(events)
}

/// PUT /api/admin/events/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Path(id): Path<i64>,
    Json(req): Json<EventStatusUpdate>,
) -> ApiResult<EventRequest> {
    let event = events::change_status(&state, id, req.status).await?;
    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "event.status",
        Some(&json!({ "event_id": id, "status": req.status })),
    )
    .await;
    ok(event)
}
