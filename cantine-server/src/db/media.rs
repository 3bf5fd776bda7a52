//! Media references (carousel pictures)

use shared::models::{MediaItem, MediaKind};
use shared::util::snowflake_id;
use sqlx::PgPool;

use super::BoxError;

const COLUMNS: &str = "id, kind, key, url, sort_order, created_at";

pub async fn list(pool: &PgPool, kind: MediaKind) -> Result<Vec<MediaItem>, BoxError> {
    let rows = sqlx::query_as::<_, MediaItem>(&format!(
        "SELECT {COLUMNS} FROM media WHERE kind = $1 ORDER BY sort_order, created_at"
    ))
    .bind(kind)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Record an uploaded object; re-uploading the same content returns the
/// existing row
pub async fn create(
    pool: &PgPool,
    kind: MediaKind,
    key: &str,
    url: &str,
    sort_order: i32,
) -> Result<MediaItem, BoxError> {
    let inserted = sqlx::query_as::<_, MediaItem>(&format!(
        "INSERT INTO media (id, kind, key, url, sort_order) VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (key) DO NOTHING RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(kind)
    .bind(key)
    .bind(url)
    .bind(sort_order)
    .fetch_optional(pool)
    .await?;

    match inserted {
        Some(item) => Ok(item),
        None => {
            let existing = sqlx::query_as::<_, MediaItem>(&format!(
                "SELECT {COLUMNS} FROM media WHERE key = $1"
            ))
            .bind(key)
            .fetch_one(pool)
            .await?;
            Ok(existing)
        }
    }
}

/// Next position at the end of a kind's list
pub async fn next_sort_order(pool: &PgPool, kind: MediaKind) -> Result<i32, BoxError> {
    let (next,): (i32,) =
        sqlx::query_as("SELECT COALESCE(MAX(sort_order) + 1, 0) FROM media WHERE kind = $1")
            .bind(kind)
            .fetch_one(pool)
            .await?;
    Ok(next)
}

/// Delete a row, returning it so the caller can remove the object
pub async fn delete(pool: &PgPool, id: i64) -> Result<Option<MediaItem>, BoxError> {
    let row = sqlx::query_as::<_, MediaItem>(&format!(
        "DELETE FROM media WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
