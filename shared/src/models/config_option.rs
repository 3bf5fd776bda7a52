//! Configuration Option Model
//!
//! Static option lists (delivery types, event types, allergens, payment
//! methods...) edited from the admin dashboard.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Well-known option categories
pub mod categories {
    pub const DELIVERY_TYPE: &str = "delivery_type";
    pub const EVENT_TYPE: &str = "event_type";
    pub const ALLERGEN: &str = "allergen";
    pub const PAYMENT_METHOD: &str = "payment_method";
    pub const PICKUP_SLOT: &str = "pickup_slot";
}

/// Config option entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ConfigOption {
    pub id: i64,
    pub category: String,
    /// Machine value, unique within its category
    pub value: String,
    pub label: String,
    pub sort_order: i32,
    pub is_active: bool,
}

/// Create option payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ConfigOptionCreate {
    #[validate(length(min = 1, max = 64))]
    pub category: String,
    #[validate(length(min = 1, max = 64))]
    pub value: String,
    #[validate(length(min = 1, max = 120))]
    pub label: String,
    pub sort_order: Option<i32>,
}

/// Update option payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ConfigOptionUpdate {
    #[validate(length(min = 1, max = 64))]
    pub value: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub label: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Category names are lowercase snake_case identifiers
pub fn is_valid_category(category: &str) -> bool {
    !category.is_empty()
        && category.len() <= 64
        && category
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names() {
        assert!(is_valid_category(categories::ALLERGEN));
        assert!(is_valid_category("event_type_2"));
        assert!(!is_valid_category(""));
        assert!(!is_valid_category("Event Type"));
        assert!(!is_valid_category("../etc"));
    }
}
