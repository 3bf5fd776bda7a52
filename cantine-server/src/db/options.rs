//! Static option lists

use shared::models::{ConfigOption, ConfigOptionCreate, ConfigOptionUpdate};
use shared::util::snowflake_id;
use sqlx::PgPool;

use super::BoxError;

const COLUMNS: &str = "id, category, value, label, sort_order, is_active";

pub async fn list_by_category(
    pool: &PgPool,
    category: &str,
    include_inactive: bool,
) -> Result<Vec<ConfigOption>, BoxError> {
    let rows = sqlx::query_as::<_, ConfigOption>(&format!(
        "SELECT {COLUMNS} FROM config_options WHERE category = $1 AND ($2 OR is_active) \
         ORDER BY sort_order, label"
    ))
    .bind(category)
    .bind(include_inactive)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<ConfigOption>, BoxError> {
    let rows = sqlx::query_as::<_, ConfigOption>(&format!(
        "SELECT {COLUMNS} FROM config_options ORDER BY category, sort_order, label"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// `None` when the value already exists in the category
pub async fn create(
    pool: &PgPool,
    data: &ConfigOptionCreate,
) -> Result<Option<ConfigOption>, BoxError> {
    let row = sqlx::query_as::<_, ConfigOption>(&format!(
        "INSERT INTO config_options (id, category, value, label, sort_order) \
         VALUES ($1, $2, $3, $4, $5) ON CONFLICT (category, value) DO NOTHING RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(&data.category)
    .bind(&data.value)
    .bind(&data.label)
    .bind(data.sort_order.unwrap_or(0))
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Partial update. A duplicate value surfaces as a unique violation.
pub async fn update(
    pool: &PgPool,
    id: i64,
    data: &ConfigOptionUpdate,
) -> Result<Option<ConfigOption>, sqlx::Error> {
    sqlx::query_as::<_, ConfigOption>(&format!(
        "UPDATE config_options SET \
            value = COALESCE($2, value), \
            label = COALESCE($3, label), \
            sort_order = COALESCE($4, sort_order), \
            is_active = COALESCE($5, is_active) \
         WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(&data.value)
    .bind(&data.label)
    .bind(data.sort_order)
    .bind(data.is_active)
    .fetch_optional(pool)
    .await
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let result = sqlx::query("DELETE FROM config_options WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
