//! Order persistence
//!
//! An order and its lines are always written in one transaction, and the
//! stored total is recomputed from the lines on every write.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::models::{
    DeliveryType, Order, OrderLine, OrderListQuery, OrderStatus, PaymentStatus,
};
use shared::util::snowflake_id;
use sqlx::{PgPool, Postgres, Transaction};

use super::{BoxError, page};

const COLUMNS: &str = "id, client_id, pickup_at, special_request, delivery_type, status, \
                       payment_status, total, idempotency_key, created_at, updated_at";

/// Line priced by the service layer
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLine {
    pub dish_id: i64,
    pub dish_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl PricedLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

pub fn priced_total(lines: &[PricedLine]) -> Decimal {
    lines.iter().map(PricedLine::line_total).sum()
}

#[derive(Debug, Clone)]
pub struct NewOrder<'a> {
    pub client_id: &'a str,
    pub pickup_at: DateTime<Utc>,
    pub special_request: Option<&'a str>,
    pub delivery_type: DeliveryType,
    pub idempotency_key: Option<&'a str>,
}

async fn insert_lines(
    tx: &mut Transaction<'_, Postgres>,
    order_id: i64,
    lines: &[PricedLine],
) -> Result<(), BoxError> {
    if lines.is_empty() {
        return Ok(());
    }
    let ids: Vec<i64> = lines.iter().map(|_| snowflake_id()).collect();
    let order_ids: Vec<i64> = lines.iter().map(|_| order_id).collect();
    let dish_ids: Vec<i64> = lines.iter().map(|l| l.dish_id).collect();
    let names: Vec<String> = lines.iter().map(|l| l.dish_name.clone()).collect();
    let quantities: Vec<i32> = lines.iter().map(|l| l.quantity).collect();
    let prices: Vec<Decimal> = lines.iter().map(|l| l.unit_price).collect();

    sqlx::query(
        r#"
        INSERT INTO order_lines (id, order_id, dish_id, dish_name, quantity, unit_price)
        SELECT * FROM UNNEST($1::bigint[], $2::bigint[], $3::bigint[], $4::text[], $5::integer[], $6::numeric[])
        "#,
    )
    .bind(&ids)
    .bind(&order_ids)
    .bind(&dish_ids)
    .bind(&names)
    .bind(&quantities)
    .bind(&prices)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Insert an order with its lines.
///
/// Returns `None` when the client already has an order under the same
/// idempotency key; nothing is written in that case.
pub async fn insert(
    pool: &PgPool,
    order: &NewOrder<'_>,
    lines: &[PricedLine],
) -> Result<Option<Order>, BoxError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, Order>(&format!(
        "INSERT INTO orders (id, client_id, pickup_at, special_request, delivery_type, total, idempotency_key) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (client_id, idempotency_key) DO NOTHING RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(order.client_id)
    .bind(order.pickup_at)
    .bind(order.special_request)
    .bind(order.delivery_type)
    .bind(priced_total(lines))
    .bind(order.idempotency_key)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(created) = row else {
        tx.rollback().await?;
        return Ok(None);
    };

    insert_lines(&mut tx, created.id, lines).await?;
    tx.commit().await?;
    Ok(Some(created))
}

pub async fn find_by_idempotency_key(
    pool: &PgPool,
    client_id: &str,
    key: &str,
) -> Result<Option<Order>, BoxError> {
    let row = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE client_id = $1 AND idempotency_key = $2"
    ))
    .bind(client_id)
    .bind(key)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Detach a cancelled order from its idempotency key so the key can be reused
pub async fn release_idempotency_key(pool: &PgPool, id: i64) -> Result<(), BoxError> {
    sqlx::query(
        "UPDATE orders SET idempotency_key = NULL, updated_at = now() \
         WHERE id = $1 AND status = 'cancelled'",
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<Order>, BoxError> {
    let row = sqlx::query_as::<_, Order>(&format!("SELECT {COLUMNS} FROM orders WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn lines(pool: &PgPool, order_id: i64) -> Result<Vec<OrderLine>, BoxError> {
    let rows = sqlx::query_as::<_, OrderLine>(
        "SELECT id, order_id, dish_id, dish_name, quantity, unit_price \
         FROM order_lines WHERE order_id = $1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Lines of several orders in one query
pub async fn lines_for(pool: &PgPool, order_ids: &[i64]) -> Result<Vec<OrderLine>, BoxError> {
    if order_ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query_as::<_, OrderLine>(
        "SELECT id, order_id, dish_id, dish_name, quantity, unit_price \
         FROM order_lines WHERE order_id = ANY($1) ORDER BY order_id, id",
    )
    .bind(order_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// A client's orders, most recent first
pub async fn list_for_client(
    pool: &PgPool,
    client_id: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Order>, BoxError> {
    let rows = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders WHERE client_id = $1 \
         ORDER BY created_at DESC LIMIT $2 OFFSET $3"
    ))
    .bind(client_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Admin listing, soonest pickup first
pub async fn list(pool: &PgPool, query: &OrderListQuery) -> Result<Vec<Order>, BoxError> {
    let (limit, offset) = page(query.limit, query.offset);
    let rows = sqlx::query_as::<_, Order>(&format!(
        "SELECT {COLUMNS} FROM orders \
         WHERE ($1::text IS NULL OR status = $1) \
           AND ($2::text IS NULL OR client_id = $2) \
           AND ($3::timestamptz IS NULL OR pickup_at >= $3) \
           AND ($4::timestamptz IS NULL OR pickup_at < $4) \
         ORDER BY pickup_at, id LIMIT $5 OFFSET $6"
    ))
    .bind(query.status)
    .bind(&query.client_id)
    .bind(query.from)
    .bind(query.to)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Compare-and-set on status; `None` when the order is no longer in `from`
pub async fn update_status(
    pool: &PgPool,
    id: i64,
    from: OrderStatus,
    to: OrderStatus,
) -> Result<Option<Order>, BoxError> {
    let row = sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET status = $3, updated_at = now() \
         WHERE id = $1 AND status = $2 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(from)
    .bind(to)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Compare-and-set on payment status
pub async fn update_payment(
    pool: &PgPool,
    id: i64,
    from: PaymentStatus,
    to: PaymentStatus,
) -> Result<Option<Order>, BoxError> {
    let row = sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET payment_status = $3, updated_at = now() \
         WHERE id = $1 AND payment_status = $2 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(from)
    .bind(to)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Swap the whole line set and the total in one transaction.
///
/// Only applies while the order is still in `expected` status.
pub async fn replace_lines(
    pool: &PgPool,
    id: i64,
    expected: OrderStatus,
    lines: &[PricedLine],
) -> Result<Option<Order>, BoxError> {
    let mut tx = pool.begin().await?;

    let row = sqlx::query_as::<_, Order>(&format!(
        "UPDATE orders SET total = $3, updated_at = now() \
         WHERE id = $1 AND status = $2 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(expected)
    .bind(priced_total(lines))
    .fetch_optional(&mut *tx)
    .await?;

    let Some(updated) = row else {
        tx.rollback().await?;
        return Ok(None);
    };

    sqlx::query("DELETE FROM order_lines WHERE order_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_lines(&mut tx, id, lines).await?;

    tx.commit().await?;
    Ok(Some(updated))
}
