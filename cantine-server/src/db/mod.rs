//! Database operations (PostgreSQL)
//!
//! Free functions over `&PgPool`; multi-row writes run in one transaction.

pub mod audit;
pub mod clients;
pub mod dishes;
pub mod documents;
pub mod events;
pub mod media;
pub mod options;
pub mod orders;

pub use crate::error::BoxError;

/// Page size when the caller gives none
pub const DEFAULT_LIMIT: i64 = 50;
/// Largest page a caller may request
pub const MAX_LIMIT: i64 = 200;

/// Clamp caller-supplied paging to sane bounds
pub fn page(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    (
        limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        offset.unwrap_or(0).max(0),
    )
}

/// Unique-constraint violation (duplicate email, option value...)
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paging_is_clamped() {
        assert_eq!(page(None, None), (DEFAULT_LIMIT, 0));
        assert_eq!(page(Some(0), Some(-5)), (1, 0));
        assert_eq!(page(Some(10_000), Some(20)), (MAX_LIMIT, 20));
    }
}
