//! Quotes, invoices and receipts

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use shared::document::{DocumentCreate, DocumentKind, StoredDocument};
use shared::error::{ApiResponse, AppError, ErrorCode};
use validator::Validate;

use crate::api::{ApiResult, internal, ok};
use crate::auth::ClientIdentity;
use crate::db;
use crate::services::documents;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DocumentListQuery {
    pub kind: Option<DocumentKind>,
    pub client_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// POST /api/admin/documents
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Json(req): Json<DocumentCreate>,
) -> Result<(StatusCode, Json<ApiResponse<StoredDocument>>), AppError> {
    req.validate()?;
    let document = documents::create(&state, req).await?;
    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "document.create",
        Some(&json!({
            "document_id": document.id,
            "number": document.number,
            "total": document.total,
        })),
    )
    .await;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(document))))
}

/// GET /api/admin/documents?kind=&client_id=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<DocumentListQuery>,
) -> ApiResult<Vec<StoredDocument>> {
    let (limit, offset) = db::page(query.limit, query.offset);
    let documents = db::documents::list(
        &state.pool,
        query.kind,
        query.client_id.as_deref(),
        limit,
        offset,
    )
    .await
    .map_err(internal("Document listing"))?;
    ok(documents)
}

/// GET /api/admin/documents/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StoredDocument> {
    ok(documents::get(&state, id).await?)
}

/// DELETE /api/admin/documents/{id}
pub async fn remove(
    State(state): State<AppState>,
    Extension(identity): Extension<ClientIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let deleted = db::documents::delete(&state.pool, id)
        .await
        .map_err(internal("Document deletion"))?;
    if !deleted {
        return Err(AppError::new(ErrorCode::DocumentNotFound));
    }
    let _ = db::audit::log(
        &state.pool,
        &identity.client_id,
        "document.delete",
        Some(&json!({ "document_id": id })),
    )
    .await;
    ok(())
}

/// GET /api/admin/documents/{id}/html
pub async fn html(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    Ok(Html(documents::html(&state, id).await?))
}

/// GET /api/admin/documents/{id}/pdf
pub async fn pdf(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Response, AppError> {
    let (number, bytes) = documents::pdf(&state, id).await?;
    let disposition = format!("inline; filename=\"{number}.pdf\"");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
