//! Client catering requests

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use shared::error::{ApiResponse, AppError};
use shared::models::{EventRequest, EventRequestCreate};
use validator::Validate;

use crate::auth::ClientIdentity;
use crate::db;
use crate::services::events;
use crate::state::AppState;

use super::{ApiResult, internal, ok};

/// POST /api/events
pub async fn create_event(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Json(req): Json<EventRequestCreate>,
) -> Result<(StatusCode, Json<ApiResponse<EventRequest>>), AppError> {
    req.validate()?;
    let event = events::create(&state, &identity.client_id, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(event))))
}

/// GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
) -> ApiResult<Vec<EventRequest>> {
    let events = db::events::list_for_client(&state.pool, &identity.client_id)
        .await
        .map_err(internal("Event request listing"))?;
    ok(events)
}
