//! Catalog operations

use shared::models::{Dish, DishCreate, DishUpdate, SoldOutUpdate};
use shared::util::snowflake_id;
use sqlx::PgPool;
use sqlx::types::Json;

use super::BoxError;

const COLUMNS: &str = "id, name, price, description, photo, availability, sold_out, \
                       sold_out_from, sold_out_until, is_active, sort_order, created_at, updated_at";

/// Catalog in display order
pub async fn list(pool: &PgPool, include_inactive: bool) -> Result<Vec<Dish>, BoxError> {
    let rows = sqlx::query_as::<_, Dish>(&format!(
        "SELECT {COLUMNS} FROM dishes WHERE $1 OR is_active ORDER BY sort_order, name"
    ))
    .bind(include_inactive)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Dish>, BoxError> {
    let row = sqlx::query_as::<_, Dish>(&format!("SELECT {COLUMNS} FROM dishes WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_many(pool: &PgPool, ids: &[i64]) -> Result<Vec<Dish>, BoxError> {
    let rows = sqlx::query_as::<_, Dish>(&format!(
        "SELECT {COLUMNS} FROM dishes WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn create(pool: &PgPool, data: &DishCreate) -> Result<Dish, BoxError> {
    let row = sqlx::query_as::<_, Dish>(&format!(
        "INSERT INTO dishes (id, name, price, description, photo, availability, sort_order) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(&data.name)
    .bind(data.price)
    .bind(&data.description)
    .bind(&data.photo)
    .bind(Json(&data.availability))
    .bind(data.sort_order.unwrap_or(0))
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Partial update; absent fields keep their value
pub async fn update(pool: &PgPool, id: i64, data: &DishUpdate) -> Result<Option<Dish>, BoxError> {
    let row = sqlx::query_as::<_, Dish>(&format!(
        "UPDATE dishes SET \
            name = COALESCE($2, name), \
            price = COALESCE($3, price), \
            description = COALESCE($4, description), \
            photo = COALESCE($5, photo), \
            availability = COALESCE($6, availability), \
            is_active = COALESCE($7, is_active), \
            sort_order = COALESCE($8, sort_order), \
            updated_at = now() \
         WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(&data.name)
    .bind(data.price)
    .bind(&data.description)
    .bind(&data.photo)
    .bind(data.availability.as_ref().map(Json))
    .bind(data.is_active)
    .bind(data.sort_order)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Replace the sold-out flag and range as a whole
pub async fn set_sold_out(
    pool: &PgPool,
    id: i64,
    data: &SoldOutUpdate,
) -> Result<Option<Dish>, BoxError> {
    let row = sqlx::query_as::<_, Dish>(&format!(
        "UPDATE dishes SET sold_out = $2, sold_out_from = $3, sold_out_until = $4, updated_at = now() \
         WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(data.sold_out)
    .bind(data.sold_out_from)
    .bind(data.sold_out_until)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn set_photo(pool: &PgPool, id: i64, photo: &str) -> Result<Option<Dish>, BoxError> {
    let row = sqlx::query_as::<_, Dish>(&format!(
        "UPDATE dishes SET photo = $2, updated_at = now() WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(photo)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Hard delete; order lines keep their own name and price
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let result = sqlx::query("DELETE FROM dishes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
