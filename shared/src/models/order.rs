//! Order Model
//!
//! Lifecycle: pending confirmation → confirmed → in preparation → ready →
//! picked up, with cancellation allowed from any non-terminal state.

use super::text_enum;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Largest quantity accepted on a single order or cart line
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    PendingConfirmation,
    Confirmed,
    InPreparation,
    Ready,
    PickedUp,
    Cancelled,
}

text_enum!(OrderStatus, "order status", {
    PendingConfirmation => "pending_confirmation",
    Confirmed => "confirmed",
    InPreparation => "in_preparation",
    Ready => "ready",
    PickedUp => "picked_up",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// Label shown to clients and staff
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PendingConfirmation => "En attente de confirmation",
            Self::Confirmed => "Confirmée",
            Self::InPreparation => "En préparation",
            Self::Ready => "Prête à récupérer",
            Self::PickedUp => "Récupérée",
            Self::Cancelled => "Annulée",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::PickedUp | Self::Cancelled)
    }

    /// Next status in the forward flow, if any
    pub const fn next(&self) -> Option<Self> {
        match self {
            Self::PendingConfirmation => Some(Self::Confirmed),
            Self::Confirmed => Some(Self::InPreparation),
            Self::InPreparation => Some(Self::Ready),
            Self::Ready => Some(Self::PickedUp),
            Self::PickedUp | Self::Cancelled => None,
        }
    }

    pub fn can_transition_to(&self, to: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::Cancelled || self.next() == Some(to)
    }

    /// Clients may only withdraw an order staff has not confirmed yet
    pub const fn client_can_cancel(&self) -> bool {
        matches!(self, Self::PendingConfirmation)
    }
}

/// Payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

text_enum!(PaymentStatus, "payment status", {
    Unpaid => "unpaid",
    Paid => "paid",
    Refunded => "refunded",
});

impl PaymentStatus {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Unpaid => "Non payé",
            Self::Paid => "Payé",
            Self::Refunded => "Remboursé",
        }
    }

    /// Unpaid ⇄ Paid (corrections allowed), Paid → Refunded
    pub fn can_transition_to(&self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Unpaid, Self::Paid) | (Self::Paid, Self::Unpaid) | (Self::Paid, Self::Refunded)
        )
    }
}

/// How the order leaves the restaurant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryType {
    #[default]
    Pickup,
    Delivery,
}

text_enum!(DeliveryType, "delivery type", {
    Pickup => "pickup",
    Delivery => "delivery",
});

impl DeliveryType {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pickup => "À emporter",
            Self::Delivery => "Livraison",
        }
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub client_id: String,
    pub pickup_at: DateTime<Utc>,
    pub special_request: Option<String>,
    pub delivery_type: DeliveryType,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Σ(quantity × unit_price) over the lines, kept in sync on every write
    pub total: Decimal,
    pub idempotency_key: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order line with the unit price captured when the order was placed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: i64,
    pub order_id: i64,
    pub dish_id: i64,
    pub dish_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Sum of line totals
pub fn order_total(lines: &[OrderLine]) -> Decimal {
    lines.iter().map(OrderLine::line_total).sum()
}

/// Order with its lines and display labels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
    pub status_label: String,
    pub payment_status_label: String,
}

impl OrderDetail {
    pub fn new(order: Order, lines: Vec<OrderLine>) -> Self {
        Self {
            status_label: order.status.label().to_string(),
            payment_status_label: order.payment_status.label().to_string(),
            order,
            lines,
        }
    }
}

/// One requested line; the unit price comes from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OrderLineInput {
    pub dish_id: i64,
    #[validate(range(min = 1, max = 99))]
    pub quantity: u32,
}

/// Create order payload (one pickup date-time per order)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderCreate {
    pub pickup_at: DateTime<Utc>,
    #[serde(default)]
    pub delivery_type: DeliveryType,
    #[validate(length(max = 1000))]
    pub special_request: Option<String>,
    #[validate(length(min = 1), nested)]
    pub lines: Vec<OrderLineInput>,
    /// Replaying the same key returns the order created the first time
    #[validate(length(min = 1, max = 128))]
    pub idempotency_key: Option<String>,
}

/// Admin status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Admin payment status change
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusUpdate {
    pub payment_status: PaymentStatus,
}

/// Admin edit: the new line set replaces the old one
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderLinesReplace {
    #[validate(length(min = 1), nested)]
    pub lines: Vec<OrderLineInput>,
}

/// Admin list filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub client_id: Option<String>,
    /// Pickup at or after
    pub from: Option<DateTime<Utc>>,
    /// Pickup strictly before
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_the_fixed_french_literals() {
        let labels: Vec<&str> = OrderStatus::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            [
                "En attente de confirmation",
                "Confirmée",
                "En préparation",
                "Prête à récupérer",
                "Récupérée",
                "Annulée",
            ]
        );
    }

    #[test]
    fn forward_flow_is_linear() {
        use OrderStatus::*;
        assert!(PendingConfirmation.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(InPreparation));
        assert!(InPreparation.can_transition_to(Ready));
        assert!(Ready.can_transition_to(PickedUp));

        assert!(!PendingConfirmation.can_transition_to(Ready));
        assert!(!Ready.can_transition_to(Confirmed));
        assert!(!Confirmed.can_transition_to(Confirmed));
    }

    #[test]
    fn cancellation_from_non_terminal_only() {
        use OrderStatus::*;
        for s in [PendingConfirmation, Confirmed, InPreparation, Ready] {
            assert!(s.can_transition_to(Cancelled), "{s} should be cancellable");
        }
        assert!(!PickedUp.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(PendingConfirmation));
    }

    #[test]
    fn client_cancel_window() {
        assert!(OrderStatus::PendingConfirmation.client_can_cancel());
        assert!(!OrderStatus::Confirmed.client_can_cancel());
    }

    #[test]
    fn payment_transitions() {
        use PaymentStatus::*;
        assert!(Unpaid.can_transition_to(Paid));
        assert!(Paid.can_transition_to(Refunded));
        assert!(Paid.can_transition_to(Unpaid));
        assert!(!Unpaid.can_transition_to(Refunded));
        assert!(!Refunded.can_transition_to(Paid));
        assert_eq!(Refunded.label(), "Remboursé");
    }

    #[test]
    fn total_uses_snapshot_prices() {
        let lines = vec![
            OrderLine {
                id: 1,
                order_id: 9,
                dish_id: 1,
                dish_name: "Quiche".into(),
                quantity: 3,
                unit_price: "4.20".parse().unwrap(),
            },
            OrderLine {
                id: 2,
                order_id: 9,
                dish_id: 2,
                dish_name: "Far breton".into(),
                quantity: 2,
                unit_price: "3.15".parse().unwrap(),
            },
        ];
        assert_eq!(order_total(&lines), "18.90".parse::<Decimal>().unwrap());
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn create_payload_validation() {
        let mut create = OrderCreate {
            pickup_at: Utc::now(),
            delivery_type: DeliveryType::Pickup,
            special_request: None,
            lines: vec![OrderLineInput {
                dish_id: 1,
                quantity: 2,
            }],
            idempotency_key: Some("abc".into()),
        };
        assert!(create.validate().is_ok());

        create.lines[0].quantity = 0;
        assert!(create.validate().is_err());

        create.lines.clear();
        assert!(create.validate().is_err());
    }

    #[test]
    fn detail_serializes_flat_with_labels() {
        let now = Utc::now();
        let order = Order {
            id: 42,
            client_id: "c1".into(),
            pickup_at: now,
            special_request: None,
            delivery_type: DeliveryType::Pickup,
            status: OrderStatus::Ready,
            payment_status: PaymentStatus::Unpaid,
            total: Decimal::ZERO,
            idempotency_key: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(OrderDetail::new(order, vec![])).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["status"], "ready");
        assert_eq!(json["status_label"], "Prête à récupérer");
        assert_eq!(json["payment_status_label"], "Non payé");
    }
}
