//! Sign-up and sign-in

use axum::{Json, extract::State, http::StatusCode};
use shared::error::{ApiResponse, AppError};
use shared::models::{AuthResponse, LoginRequest, RegisterRequest};
use validator::Validate;

use crate::services::accounts;
use crate::state::AppState;

use super::ApiResult;

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthResponse>>), AppError> {
    req.validate()?;
    let session = accounts::register(&state, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(session))))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<AuthResponse> {
    let session = accounts::login(&state, req).await?;
    super::ok(session)
}
