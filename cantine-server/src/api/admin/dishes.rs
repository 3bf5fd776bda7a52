//! Catalog management

use axum::{
    Extension, Json,
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde_json::json;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{Dish, DishCreate, DishUpdate, MediaKind, SoldOutUpdate};
use validator::Validate;

use crate::api::{ApiResult, internal, ok, upload};
use crate::auth::ClientIdentity;
use crate::db;
use crate::state::AppState;

fn not_found() -> AppError {
    AppError::new(ErrorCode::DishNotFound)
}

/// GET /api/admin/dishes (inactive included)
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Dish>> {
    let dishes = db::dishes::list(&state.pool, true)
        .await
        .map_err(internal("Dish listing"))?;
    ok(dishes)
}

/// POST /api/admin/dishes
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Json(req): Json<DishCreate>,
) -> Result<(StatusCode, Json<ApiResponse<Dish>>), AppError> {
    req.validate()?;
    let dish = db::dishes::create(&state.pool, &req)
        .await
        .map_err(internal("Dish creation"))?;

    tracing::info!(dish_id = dish.id, name = %dish.name, "Dish created");
    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "dish.create",
        Some(&json!({ "dish_id": dish.id, "name": dish.name })),
    )
    .await;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(dish))))
}

/// PUT /api/admin/dishes/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Path(id): Path<i64>,
    Json(req): Json<DishUpdate>,
) -> ApiResult<Dish> {
    req.validate()?;
    let dish = db::dishes::update(&state.pool, id, &req)
        .await
        .map_err(internal("Dish update"))?
        .ok_or_else(not_found)?;

    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "dish.update",
        Some(&json!({ "dish_id": id })),
    )
    .await;
    ok(dish)
}

/// DELETE /api/admin/dishes/{id}
///
/// Past orders keep their line snapshots.
pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let deleted = db::dishes::delete(&state.pool, id)
        .await
        .map_err(internal("Dish deletion"))?;
    if !deleted {
        return Err(not_found());
    }

    tracing::info!(dish_id = id, "Dish deleted");
    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "dish.delete",
        Some(&json!({ "dish_id": id })),
    )
    .await;
    ok(())
}

/// PUT /api/admin/dishes/{id}/sold-out
pub async fn set_sold_out(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Path(id): Path<i64>,
    Json(req): Json<SoldOutUpdate>,
) -> ApiResult<Dish> {
    if !req.has_valid_range() {
        return Err(AppError::validation(
            "sold_out_from must be before sold_out_until",
        ));
    }
    let dish = db::dishes::set_sold_out(&state.pool, id, &req)
        .await
        .map_err(internal("Sold-out update"))?
        .ok_or_else(not_found)?;

    tracing::info!(dish_id = id, sold_out = req.sold_out, "Dish sold-out flag changed");
    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "dish.sold_out",
        Some(&json!({
            "dish_id": id,
            "sold_out": req.sold_out,
            "from": req.sold_out_from,
            "until": req.sold_out_until,
        })),
    )
    .await;
    ok(dish)
}

/// POST /api/admin/dishes/{id}/photo (multipart, field `file`)
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> ApiResult<Dish> {
    db::dishes::find(&state.pool, id)
        .await
        .map_err(internal("Dish lookup"))?
        .ok_or_else(not_found)?;

    let image = upload::store_image(&state, MediaKind::DishPhoto, multipart).await?;
    let dish = db::dishes::set_photo(&state.pool, id, &image.url)
        .await
        .map_err(internal("Dish photo update"))?
        .ok_or_else(not_found)?;

    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "dish.photo",
        Some(&json!({ "dish_id": id, "key": image.key })),
    )
    .await;
    ok(dish)
}
