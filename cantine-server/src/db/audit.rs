//! Admin audit trail

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use super::BoxError;

/// Write an audit log entry, then mirror it to the `audit` log target.
///
/// A failed insert is logged as a warning on the same target.
pub async fn log(
    pool: &PgPool,
    actor_id: &str,
    action: &str,
    detail: Option<&serde_json::Value>,
) -> Result<(), BoxError> {
    let inserted =
        sqlx::query("INSERT INTO audit_logs (actor_id, action, detail) VALUES ($1, $2, $3)")
            .bind(actor_id)
            .bind(action)
            .bind(detail)
            .execute(pool)
            .await;
    if let Err(e) = inserted {
        tracing::warn!(
            target: "audit",
            actor_id,
            action,
            detail = ?detail,
            error = %e,
            "Admin action not recorded"
        );
        return Err(e.into());
    }
    tracing::info!(target: "audit", actor_id, action, detail = ?detail, "Admin action");
    Ok(())
}

#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub actor_id: String,
    pub action: String,
    pub detail: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

pub async fn query(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<AuditEntry>, BoxError> {
    let rows = sqlx::query_as::<_, AuditEntry>(
        "SELECT id, actor_id, action, detail, created_at FROM audit_logs ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
