//! Cart lines and checkout grouping
//!
//! A cart holds lines for possibly several pickup date-times. Checkout turns
//! each distinct pickup date-time into exactly one order.

use crate::models::{DeliveryType, OrderCreate, OrderLineInput};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use uuid::Uuid;

/// One dish/quantity/pickup-time selection awaiting checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: Uuid,
    pub dish_id: i64,
    pub dish_name: String,
    pub quantity: u32,
    /// Catalog price when the line was added
    pub unit_price: Decimal,
    pub pickup_at: DateTime<Utc>,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Lines sharing one pickup date-time
pub type PickupGroups = BTreeMap<DateTime<Utc>, Vec<CartLine>>;

/// Group lines by pickup date-time, ascending.
///
/// Every input line lands in exactly one group and keeps its relative order.
pub fn group_by_pickup(lines: &[CartLine]) -> PickupGroups {
    let mut groups = PickupGroups::new();
    for line in lines {
        groups.entry(line.pickup_at).or_default().push(line.clone());
    }
    groups
}

pub fn cart_total(lines: &[CartLine]) -> Decimal {
    lines.iter().map(CartLine::line_total).sum()
}

/// Deterministic key for one checkout group.
///
/// SHA-256 over each line's id, dish, quantity and pickup time (sorted by
/// line id), then the delivery type and special request. Retrying an
/// unchanged group yields the same key, so the server can return the order
/// it already created; any edit to the group yields a new key.
pub fn idempotency_key(
    lines: &[CartLine],
    delivery_type: DeliveryType,
    special_request: Option<&str>,
) -> String {
    let mut sorted: Vec<&CartLine> = lines.iter().collect();
    sorted.sort_unstable_by_key(|l| l.id);
    let mut hasher = Sha256::new();
    for line in sorted {
        hasher.update(line.id.as_bytes());
        hasher.update(line.dish_id.to_be_bytes());
        hasher.update(line.quantity.to_be_bytes());
        hasher.update(line.pickup_at.timestamp_millis().to_be_bytes());
    }
    hasher.update(delivery_type.as_str().as_bytes());
    match special_request {
        Some(text) => {
            hasher.update([1u8]);
            hasher.update(text.as_bytes());
        }
        None => hasher.update([0u8]),
    }
    hex::encode(hasher.finalize())
}

/// Build the order-creation payload for one pickup group
pub fn order_request(
    pickup_at: DateTime<Utc>,
    lines: &[CartLine],
    delivery_type: DeliveryType,
    special_request: Option<String>,
) -> OrderCreate {
    let key = idempotency_key(lines, delivery_type, special_request.as_deref());
    OrderCreate {
        pickup_at,
        delivery_type,
        special_request,
        lines: lines
            .iter()
            .map(|l| OrderLineInput {
                dish_id: l.dish_id,
                quantity: l.quantity,
            })
            .collect(),
        idempotency_key: Some(key),
    }
}
