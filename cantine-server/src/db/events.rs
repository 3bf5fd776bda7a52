//! Event request persistence

use shared::models::{EventDishSelection, EventRequest, EventRequestCreate, EventRequestStatus};
use shared::util::snowflake_id;
use sqlx::PgPool;
use sqlx::types::Json;

use super::BoxError;

const COLUMNS: &str = "id, client_id, event_type, event_date, guest_count, budget, dishes, \
                       requests, status, created_at, updated_at";

/// Insert a pending request; `dishes` carry names resolved from the catalog
pub async fn create(
    pool: &PgPool,
    client_id: &str,
    data: &EventRequestCreate,
    dishes: &[EventDishSelection],
) -> Result<EventRequest, BoxError> {
    let row = sqlx::query_as::<_, EventRequest>(&format!(
        "INSERT INTO event_requests (id, client_id, event_type, event_date, guest_count, budget, dishes, requests) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(client_id)
    .bind(&data.event_type)
    .bind(data.event_date)
    .bind(data.guest_count)
    .bind(data.budget)
    .bind(Json(dishes))
    .bind(&data.requests)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<EventRequest>, BoxError> {
    let row = sqlx::query_as::<_, EventRequest>(&format!(
        "SELECT {COLUMNS} FROM event_requests WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list_for_client(
    pool: &PgPool,
    client_id: &str,
) -> Result<Vec<EventRequest>, BoxError> {
    let rows = sqlx::query_as::<_, EventRequest>(&format!(
        "SELECT {COLUMNS} FROM event_requests WHERE client_id = $1 ORDER BY created_at DESC"
    ))
    .bind(client_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Admin listing, soonest event first
pub async fn list(
    pool: &PgPool,
    status: Option<EventRequestStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<EventRequest>, BoxError> {
    let rows = sqlx::query_as::<_, EventRequest>(&format!(
        "SELECT {COLUMNS} FROM event_requests WHERE $1::text IS NULL OR status = $1 \
         ORDER BY event_date, id LIMIT $2 OFFSET $3"
    ))
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Compare-and-set on status
pub async fn update_status(
    pool: &PgPool,
    id: i64,
    from: EventRequestStatus,
    to: EventRequestStatus,
) -> Result<Option<EventRequest>, BoxError> {
    let row = sqlx::query_as::<_, EventRequest>(&format!(
        "UPDATE event_requests SET status = $3, updated_at = now() \
         WHERE id = $1 AND status = $2 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(from)
    .bind(to)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
