//! Home page carousel

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde_json::json;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{MediaItem, MediaKind};

use crate::api::upload::store_image;
use crate::api::{ApiResult, internal, ok};
use crate::auth::ClientIdentity;
use crate::db;
use crate::state::AppState;

/// POST /api/admin/carousel (multipart, field `file`)
///
/// New images go to the end of the carousel.
pub async fn upload(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<MediaItem>>), AppError> {
    let image = store_image(&state, MediaKind::Carousel, multipart).await?;
    let sort_order = db::media::next_sort_order(&state.pool, MediaKind::Carousel)
        .await
        .map_err(internal("Carousel ordering"))?;
    let item = db::media::create(
        &state.pool,
        MediaKind::Carousel,
        &image.key,
        &image.url,
        sort_order,
    )
    .await
    .map_err(internal("Carousel insert"))?;

    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "carousel.upload",
        Some(&json!({ "media_id": item.id, "key": item.key })),
    )
    .await;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

/// DELETE /api/admin/carousel/{id}
///
/// The row goes first; a failed object delete leaves an orphan that is
/// only logged.
pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let item = db::media::delete(&state.pool, id)
        .await
        .map_err(internal("Carousel delete"))?
        .ok_or_else(|| AppError::new(ErrorCode::MediaNotFound))?;

    if let Err(e) = state.storage.delete(&item.key).await {
        tracing::warn!(key = %item.key, error = %e, "Failed to delete carousel object");
    }

    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "carousel.delete",
        Some(&json!({ "media_id": id, "key": item.key })),
    )
    .await;
    ok(())
}
