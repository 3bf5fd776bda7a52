//! Order management

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde_json::json;
use shared::models::{
    OrderDetail, OrderLinesReplace, OrderListQuery, OrderStatusUpdate, PaymentStatusUpdate,
};
use validator::Validate;

use crate::api::{ApiResult, ok};
use crate::auth::ClientIdentity;
use crate::db;
use crate::services::orders;
use crate::state::AppState;

/// GET /api/admin/orders?status=&client_id=&from=&to=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> ApiResult<Vec<OrderDetail>> {
    ok(orders::list(&state, &query).await?)
}

/// GET /api/admin/orders/{id}
pub async fn detail(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<OrderDetail> {
    ok(orders::get(&state, id).await?)
}

/// PUT /api/admin/orders/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Path(id): Path<i64>,
    Json(req): Json<OrderStatusUpdate>,
) -> ApiResult<OrderDetail> {
    let order = orders::change_status(&state, id, req.status).await?;
    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "order.status",
        Some(&json!({ "order_id": id, "status": req.status })),
    )
    .await;
    ok(order)
}

/// PUT /api/admin/orders/{id}/payment
pub async fn update_payment(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Path(id): Path<i64>,
    Json(req): Json<PaymentStatusUpdate>,
) -> ApiResult<OrderDetail> {
    let order = orders::change_payment(&state, id, req.payment_status).await?;
    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "order.payment",
        Some(&json!({ "order_id": id, "payment_status": req.payment_status })),
    )
    .await;
    ok(order)
}

/// PUT /api/admin/orders/{id}/lines
pub async fn replace_lines(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Path(id): Path<i64>,
    Json(req): Json<OrderLinesReplace>,
) -> ApiResult<OrderDetail> {
    req.validate()?;
    let order = orders::replace_lines(&state, id, &req.lines).await?;
    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "order.lines",
        Some(&json!({ "order_id": id, "lines": req.lines.len(), "total": order.order.total })),
    )
    .await;
    ok(order)
}
