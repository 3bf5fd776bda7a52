//! Event Request Model (catering inquiries)

use super::text_enum;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Event request status, distinct from order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventRequestStatus {
    Pending,
    Quoted,
    Accepted,
    Declined,
    Completed,
    Cancelled,
}

text_enum!(EventRequestStatus, "event request status", {
    Pending => "pending",
    Quoted => "quoted",
    Accepted => "accepted",
    Declined => "declined",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl EventRequestStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "En attente",
            Self::Quoted => "Devis envoyé",
            Self::Accepted => "Acceptée",
            Self::Declined => "Refusée",
            Self::Completed => "Terminée",
            Self::Cancelled => "Annulée",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Declined | Self::Completed | Self::Cancelled)
    }

    pub fn can_transition_to(&self, to: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, to),
            (_, Self::Cancelled)
                | (Self::Pending, Self::Quoted)
                | (Self::Quoted, Self::Accepted)
                | (Self::Accepted, Self::Completed)
                | (Self::Pending | Self::Quoted, Self::Declined)
        )
    }
}

/// Dish preselected for an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct EventDishSelection {
    pub dish_id: i64,
    #[serde(default)]
    pub dish_name: String,
    #[validate(range(min = 1, max = 10000))]
    pub quantity: u32,
}

/// Event request entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct EventRequest {
    pub id: i64,
    pub client_id: String,
    /// Config option value from the `event_type` category
    pub event_type: Option<String>,
    pub event_date: DateTime<Utc>,
    pub guest_count: i32,
    pub budget: Option<Decimal>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub dishes: Vec<EventDishSelection>,
    pub requests: Option<String>,
    pub status: EventRequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create event request payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EventRequestCreate {
    #[validate(length(min = 1, max = 64))]
    pub event_type: Option<String>,
    pub event_date: DateTime<Utc>,
    #[validate(range(min = 1, max = 5000))]
    pub guest_count: i32,
    pub budget: Option<Decimal>,
    #[serde(default)]
    #[validate(nested)]
    pub dishes: Vec<EventDishSelection>,
    #[validate(length(max = 4000))]
    pub requests: Option<String>,
}

/// Admin status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventStatusUpdate {
    pub status: EventRequestStatus,
}
