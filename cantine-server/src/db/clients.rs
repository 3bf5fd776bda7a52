//! Client account and profile operations

use shared::models::{ClientProfile, ProfileUpdate, Role};
use sqlx::PgPool;

use super::BoxError;

const COLUMNS: &str = "id, email, first_name, last_name, phone, address, preferences, \
                       marketing_opt_in, photo, role, created_at, updated_at";

/// Credentials row used by sign-in
#[derive(Debug, sqlx::FromRow)]
pub struct Credentials {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Insert a new client; `None` when the email is already registered
pub async fn create(
    pool: &PgPool,
    id: &str,
    email: &str,
    password_hash: &str,
    marketing_opt_in: bool,
    role: Role,
) -> Result<Option<ClientProfile>, BoxError> {
    let row = sqlx::query_as::<_, ClientProfile>(&format!(
        "INSERT INTO clients (id, email, password_hash, marketing_opt_in, role) \
         VALUES ($1, $2, $3, $4, $5) ON CONFLICT (email) DO NOTHING RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(email)
    .bind(password_hash)
    .bind(marketing_opt_in)
    .bind(role)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn credentials_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<Credentials>, BoxError> {
    let row = sqlx::query_as::<_, Credentials>(
        "SELECT id, email, password_hash, role FROM clients WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn find(pool: &PgPool, id: &str) -> Result<Option<ClientProfile>, BoxError> {
    let row = sqlx::query_as::<_, ClientProfile>(&format!(
        "SELECT {COLUMNS} FROM clients WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Partial update; absent fields keep their value
pub async fn update_profile(
    pool: &PgPool,
    id: &str,
    update: &ProfileUpdate,
) -> Result<Option<ClientProfile>, BoxError> {
    let row = sqlx::query_as::<_, ClientProfile>(&format!(
        "UPDATE clients SET \
            first_name = COALESCE($2, first_name), \
            last_name = COALESCE($3, last_name), \
            phone = COALESCE($4, phone), \
            address = COALESCE($5, address), \
            preferences = COALESCE($6, preferences), \
            marketing_opt_in = COALESCE($7, marketing_opt_in), \
            updated_at = now() \
         WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(&update.first_name)
    .bind(&update.last_name)
    .bind(&update.phone)
    .bind(&update.address)
    .bind(&update.preferences)
    .bind(update.marketing_opt_in)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Set or clear the profile photo key
pub async fn set_photo(
    pool: &PgPool,
    id: &str,
    photo: Option<&str>,
) -> Result<Option<ClientProfile>, BoxError> {
    let row = sqlx::query_as::<_, ClientProfile>(&format!(
        "UPDATE clients SET photo = $2, updated_at = now() WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(photo)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn set_role(
    pool: &PgPool,
    id: &str,
    role: Role,
) -> Result<Option<ClientProfile>, BoxError> {
    let row = sqlx::query_as::<_, ClientProfile>(&format!(
        "UPDATE clients SET role = $2, updated_at = now() WHERE id = $1 RETURNING {COLUMNS}"
    ))
    .bind(id)
    .bind(role)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Admin listing; `search` matches email or names (case-insensitive)
pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<ClientProfile>, BoxError> {
    let pattern = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.replace('%', "\\%").replace('_', "\\_")));
    let rows = sqlx::query_as::<_, ClientProfile>(&format!(
        "SELECT {COLUMNS} FROM clients \
         WHERE $1::text IS NULL OR email ILIKE $1 OR first_name ILIKE $1 OR last_name ILIKE $1 \
         ORDER BY created_at DESC LIMIT $2 OFFSET $3"
    ))
    .bind(pattern)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
