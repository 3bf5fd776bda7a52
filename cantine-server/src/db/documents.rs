//! Document persistence and numbering

use chrono::Datelike;
use shared::document::{DocumentData, DocumentKind, StoredDocument, document_number};
use shared::util::snowflake_id;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use super::BoxError;

const COLUMNS: &str = "id, kind, number, client_id, total, data, created_at";

/// Next sequence number for `(kind, year)`, starting at 1
async fn next_sequence(
    tx: &mut Transaction<'_, Postgres>,
    kind: DocumentKind,
    year: i32,
) -> Result<i32, BoxError> {
    let (seq,): (i32,) = sqlx::query_as(
        "INSERT INTO document_sequences (kind, year, last_seq) VALUES ($1, $2, 1) \
         ON CONFLICT (kind, year) DO UPDATE SET last_seq = document_sequences.last_seq + 1 \
         RETURNING last_seq",
    )
    .bind(kind)
    .bind(year)
    .fetch_one(&mut **tx)
    .await?;
    Ok(seq)
}

/// Assign the next number for the issue year and store the document
pub async fn create(
    pool: &PgPool,
    client_id: Option<&str>,
    mut data: DocumentData,
) -> Result<StoredDocument, BoxError> {
    let total = data.total().ok_or("document total overflows")?;
    let mut tx = pool.begin().await?;

    let seq = next_sequence(&mut tx, data.kind, data.issued_on.year()).await?;
    data.number = document_number(data.kind, data.issued_on.year(), u32::try_from(seq)?);

    let row = sqlx::query_as::<_, StoredDocument>(&format!(
        "INSERT INTO documents (id, kind, number, client_id, total, data) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING {COLUMNS}"
    ))
    .bind(snowflake_id())
    .bind(data.kind)
    .bind(&data.number)
    .bind(client_id)
    .bind(total)
    .bind(Json(&data))
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(row)
}

pub async fn find(pool: &PgPool, id: i64) -> Result<Option<StoredDocument>, BoxError> {
    let row = sqlx::query_as::<_, StoredDocument>(&format!(
        "SELECT {COLUMNS} FROM documents WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn list(
    pool: &PgPool,
    kind: Option<DocumentKind>,
    client_id: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<StoredDocument>, BoxError> {
    let rows = sqlx::query_as::<_, StoredDocument>(&format!(
        "SELECT {COLUMNS} FROM documents \
         WHERE ($1::text IS NULL OR kind = $1) AND ($2::text IS NULL OR client_id = $2) \
         ORDER BY created_at DESC, id DESC LIMIT $3 OFFSET $4"
    ))
    .bind(kind)
    .bind(client_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, BoxError> {
    let result = sqlx::query("DELETE FROM documents WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
