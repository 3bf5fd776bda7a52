//! Admin dashboard endpoints
//!
//! Every route here sits behind `client_auth_middleware` + `admin_guard`.
//! Mutations are written to the audit trail.

pub mod carousel;
pub mod clients;
pub mod dishes;
pub mod documents;
pub mod events;
pub mod options;
pub mod orders;

use axum::extract::{Query, State};

use crate::db::{self, audit::AuditEntry};
use crate::state::AppState;

use super::{ApiResult, PageQuery, internal, ok};

/// GET /api/admin/audit
pub async fn audit_log(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Vec<AuditEntry>> {
    let (limit, offset) = db::page(page.limit, page.offset);
    let entries = db::audit::query(&state.pool, limit, offset)
        .await
        .map_err(internal("Audit log query"))?;
    ok(entries)
}
