//! Client accounts

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use serde_json::json;
use shared::error::{AppError, ErrorCode};
use shared::models::{ClientProfile, RoleUpdate};

use crate::api::{ApiResult, internal, ok};
use crate::auth::ClientIdentity;
use crate::db;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ClientSearch {
    /// Matches email, first or last name
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/admin/clients?q=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ClientSearch>,
) -> ApiResult<Vec<ClientProfile>> {
    let (limit, offset) = db::page(query.limit, query.offset);
    let search = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let clients = db::clients::list(&state.pool, search, limit, offset)
        .await
        .map_err(internal("Client listing"))?;
    ok(clients)
}

/// GET /api/admin/clients/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ClientProfile> {
    let client = db::clients::find(&state.pool, &id)
        .await
        .map_err(internal("Client lookup"))?
        .ok_or_else(|| AppError::new(ErrorCode::ClientNotFound))?;
    ok(client)
}

/// PUT /api/admin/clients/{id}/role
///
/// The new role applies from the client's next sign-in.
pub async fn update_role(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Path(id): Path<String>,
    Json(req): Json<RoleUpdate>,
) -> ApiResult<ClientProfile> {
    if id == identity.client_id {
        return Err(AppError::new(ErrorCode::CannotModifySelf));
    }
    let client = db::clients::set_role(&state.pool, &id, req.role)
        .await
        .map_err(internal("Role update"))?
        .ok_or_else(|| AppError::new(ErrorCode::ClientNotFound))?;

    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "client.role",
        Some(&json!({ "client_id": id, "role": req.role })),
    )
    .await;
    ok(client)
}
