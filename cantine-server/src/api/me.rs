//! Signed-in client's own profile

use axum::{
    Extension, Json,
    extract::{Multipart, State},
};
use shared::error::{AppError, ErrorCode};
use shared::models::{ClientProfile, MediaKind, ProfileUpdate};
use validator::Validate;

use crate::auth::ClientIdentity;
use crate::db;
use crate::state::AppState;

use super::{ApiResult, internal, ok, upload};

fn not_found() -> AppError {
    AppError::new(ErrorCode::ClientNotFound)
}

/// GET /api/me
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
) -> ApiResult<ClientProfile> {
    let profile = db::clients::find(&state.pool, &identity.client_id)
        .await
        .map_err(internal("Profile lookup"))?
        .ok_or_else(not_found)?;
    ok(profile)
}

/// PUT /api/me
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Json(req): Json<ProfileUpdate>,
) -> ApiResult<ClientProfile> {
    req.validate()?;
    let profile = db::clients::update_profile(&state.pool, &identity.client_id, &req)
        .await
        .map_err(internal("Profile update"))?
        .ok_or_else(not_found)?;
    tracing::info!(client_id = %identity.client_id, complete = profile.is_complete(), "Profile updated");
    ok(profile)
}

/// POST /api/me/photo (multipart, field `file`)
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    multipart: Multipart,
) -> ApiResult<ClientProfile> {
    let image = upload::store_image(&state, MediaKind::ProfilePhoto, multipart).await?;
    let profile = db::clients::set_photo(&state.pool, &identity.client_id, Some(&image.url))
        .await
        .map_err(internal("Profile photo update"))?
        .ok_or_else(not_found)?;
    ok(profile)
}

/// DELETE /api/me/photo
///
/// Only the reference is cleared: keys are content hashes and the same
/// object may back another profile.
pub async fn delete_photo(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
) -> ApiResult<ClientProfile> {
    let profile = db::clients::set_photo(&state.pool, &identity.client_id, None)
        .await
        .map_err(internal("Profile photo removal"))?
        .ok_or_else(not_found)?;
    ok(profile)
}
