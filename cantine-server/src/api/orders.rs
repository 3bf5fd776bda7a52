//! Client orders

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use shared::error::{ApiResponse, AppError};
use shared::models::{OrderCreate, OrderDetail};
use validator::Validate;

use crate::auth::ClientIdentity;
use crate::services::orders;
use crate::state::AppState;

use super::{ApiResult, PageQuery, ok};

/// POST /api/orders
///
/// 201 when the order is created, 200 when an idempotency key replays an
/// order created earlier.
pub async fn create_order(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Json(req): Json<OrderCreate>,
) -> Result<(StatusCode, Json<ApiResponse<OrderDetail>>), AppError> {
    req.validate()?;
    let placed = orders::place_order(&state, &identity.client_id, req).await?;
    let status = if placed.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApiResponse::success(placed.order))))
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<OrderDetail>> {
    let orders =
        orders::list_for_client(&state, &identity.client_id, page.limit, page.offset).await?;
    ok(orders)
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<OrderDetail> {
    ok(orders::get_for_client(&state, &identity.client_id, id).await?)
}

/// POST /api/orders/{id}/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<OrderDetail> {
    ok(orders::cancel_by_client(&state, &identity.client_id, id).await?)
}
