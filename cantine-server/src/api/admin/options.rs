//! Static option lists

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::json;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{ConfigOption, ConfigOptionCreate, ConfigOptionUpdate, is_valid_category};
use validator::Validate;

use crate::api::{ApiResult, internal, ok};
use crate::auth::ClientIdentity;
use crate::db;
use crate::state::AppState;

/// GET /api/admin/options (every category, inactive included)
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<ConfigOption>> {
    let options = db::options::list_all(&state.pool)
        .await
        .map_err(internal("Option listing"))?;
    ok(options)
}

/// POST /api/admin/options
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Json(req): Json<ConfigOptionCreate>,
) -> Result<(StatusCode, Json<ApiResponse<ConfigOption>>), AppError> {
    req.validate()?;
    if !is_valid_category(&req.category) {
        return Err(AppError::validation(format!(
            "Invalid option category: {}",
            req.category
        )));
    }
    let option = db::options::create(&state.pool, &req)
        .await
        .map_err(internal("Option creation"))?
        .ok_or_else(|| {
            AppError::new(ErrorCode::OptionValueExists)
                .with_detail("category", req.category.as_str())
                .with_detail("value", req.value.as_str())
        })?;

    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "option.create",
        Some(&json!({ "option_id": option.id, "category": option.category, "value": option.value })),
    )
    .await;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(option))))
}

/// PUT /api/admin/options/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Path(id): Path<i64>,
    Json(req): Json<ConfigOptionUpdate>,
) -> ApiResult<ConfigOption> {
    req.validate()?;
    let option = match db::options::update(&state.pool, id, &req).await {
        Ok(Some(option)) => option,
        Ok(None) => return Err(AppError::new(ErrorCode::OptionNotFound)),
        Err(e) if db::is_unique_violation(&e) => {
            return Err(AppError::new(ErrorCode::OptionValueExists));
        }
        Err(e) => return Err(internal("Option update")(e)),
    };

    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "option.update",
        Some(&json!({ "option_id": id })),
    )
    .await;
    ok(option)
}

/// DELETE /api/admin/options/{id}
pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let deleted = db::options::delete(&state.pool, id)
        .await
        .map_err(internal("Option deletion"))?;
    if !deleted {
        return Err(AppError::new(ErrorCode::OptionNotFound));
    }
    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "option.delete",
        Some(&json!({ "option_id": id })),
    )
    .await;
    ok(())
}
