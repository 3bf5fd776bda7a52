//! Locally persisted cart
//!
//! The cart lives in a small JSON file next to the client's other state.
//! Every mutation rewrites the file through a temp file + rename, so a crash
//! never leaves a half-written cart behind. A mutation only takes effect in
//! memory once it has been written.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::cart::{CartLine, PickupGroups, cart_total, group_by_pickup};
use shared::models::Dish;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Largest quantity a single line may hold
pub const MAX_LINE_QUANTITY: u32 = 99;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("Quantity must be between 1 and {MAX_LINE_QUANTITY}, got {0}")]
    InvalidQuantity(u32),

    #[error("Cart line not found: {0}")]
    LineNotFound(Uuid),

    #[error("Dish {dish_id} cannot be ordered for {pickup_at}")]
    DishUnavailable {
        dish_id: i64,
        pickup_at: DateTime<Utc>,
    },

    #[error("Cart file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cart file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
pub struct CartStore {
    path: Option<PathBuf>,
    lines: Vec<CartLine>,
}

impl CartStore {
    /// Load the cart stored at `path`; a missing file is an empty cart
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CartError> {
        let path = path.into();
        let lines = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::debug!(path = %path.display(), lines = lines.len(), "Cart loaded");
        Ok(Self {
            path: Some(path),
            lines,
        })
    }

    /// Cart that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Add `quantity` of `dish` for `pickup_at`.
    ///
    /// A line for the same dish and pickup date-time absorbs the quantity
    /// (capped at [`MAX_LINE_QUANTITY`]); otherwise a new line is appended.
    /// Returns the id of the line that holds the dish.
    pub fn add(
        &mut self,
        dish: &Dish,
        quantity: u32,
        pickup_at: DateTime<Utc>,
        tz: Tz,
    ) -> Result<Uuid, CartError> {
        check_quantity(quantity)?;
        if !dish.is_orderable_at(pickup_at, tz) {
            return Err(CartError::DishUnavailable {
                dish_id: dish.id,
                pickup_at,
            });
        }

        let mut lines = self.lines.clone();
        let id = match lines
            .iter_mut()
            .find(|l| l.dish_id == dish.id && l.pickup_at == pickup_at)
        {
            Some(line) => {
                line.quantity = (line.quantity + quantity).min(MAX_LINE_QUANTITY);
                line.id
            }
            None => {
                let line = CartLine {
                    id: Uuid::new_v4(),
                    dish_id: dish.id,
                    dish_name: dish.name.clone(),
                    quantity,
                    unit_price: dish.price,
                    pickup_at,
                };
                let id = line.id;
                lines.push(line);
                id
            }
        };
        self.commit(lines)?;
        Ok(id)
    }

    /// Set a line's quantity; zero removes the line
    pub fn set_quantity(&mut self, line_id: Uuid, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            self.remove(line_id)?;
            return Ok(());
        }
        check_quantity(quantity)?;
        let mut lines = self.lines.clone();
        let line = lines
            .iter_mut()
            .find(|l| l.id == line_id)
            .ok_or(CartError::LineNotFound(line_id))?;
        line.quantity = quantity;
        self.commit(lines)
    }

    pub fn remove(&mut self, line_id: Uuid) -> Result<CartLine, CartError> {
        let index = self
            .lines
            .iter()
            .position(|l| l.id == line_id)
            .ok_or(CartError::LineNotFound(line_id))?;
        let mut lines = self.lines.clone();
        let line = lines.remove(index);
        self.commit(lines)?;
        Ok(line)
    }

    pub fn clear(&mut self) -> Result<(), CartError> {
        self.commit(Vec::new())
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Running total: Σ(quantity × unit price)
    pub fn total(&self) -> Decimal {
        cart_total(&self.lines)
    }

    /// Lines grouped by pickup date-time, ascending
    pub fn grouped(&self) -> PickupGroups {
        group_by_pickup(&self.lines)
    }

    /// Write `lines`, then make them the current cart
    fn commit(&mut self, lines: Vec<CartLine>) -> Result<(), CartError> {
        self.persist(&lines)?;
        self.lines = lines;
        Ok(())
    }

    fn persist(&self, lines: &[CartLine]) -> Result<(), CartError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(lines)?)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn check_quantity(quantity: u32) -> Result<(), CartError> {
    if quantity == 0 || quantity > MAX_LINE_QUANTITY {
        return Err(CartError::InvalidQuantity(quantity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, TimeZone, Weekday};
    use shared::models::AvailabilityWindow;

    const PARIS: Tz = chrono_tz::Europe::Paris;

    // Wednesday 2025-06-04, 12:00 Paris
    fn noon() -> DateTime<Utc> {
        PARIS
            .with_ymd_and_hms(2025, 6, 4, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn dish(id: i64, price: &str) -> Dish {
        Dish {
            id,
            name: format!("Plat {id}"),
            price: price.parse().unwrap(),
            description: None,
            photo: None,
            availability: Vec::new(),
            sold_out: false,
            sold_out_from: None,
            sold_out_until: None,
            is_active: true,
            sort_order: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn add_merges_same_dish_and_pickup() {
        let mut cart = CartStore::in_memory();
        let d = dish(1, "9.50");
        let first = cart.add(&d, 2, noon(), PARIS).unwrap();
        let second = cart.add(&d, 3, noon(), PARIS).unwrap();
        assert_eq!(first, second);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].quantity, 5);

        // another pickup time is another line
        cart.add(&d, 1, noon() + chrono::Duration::days(1), PARIS)
            .unwrap();
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total(), "57.00".parse::<Decimal>().unwrap());
    }

    #[test]
    fn merged_quantity_is_capped() {
        let mut cart = CartStore::in_memory();
        let d = dish(1, "1");
        cart.add(&d, 90, noon(), PARIS).unwrap();
        cart.add(&d, 20, noon(), PARIS).unwrap();
        assert_eq!(cart.lines()[0].quantity, MAX_LINE_QUANTITY);
    }

    #[test]
    fn rejects_bad_quantities() {
        let mut cart = CartStore::in_memory();
        let d = dish(1, "1");
        assert!(matches!(
            cart.add(&d, 0, noon(), PARIS),
            Err(CartError::InvalidQuantity(0))
        ));
        assert!(matches!(
            cart.add(&d, 100, noon(), PARIS),
            Err(CartError::InvalidQuantity(100))
        ));
        assert!(cart.is_empty());
    }

    #[test]
    fn rejects_dishes_not_orderable_at_pickup() {
        let mut cart = CartStore::in_memory();

        let mut sold_out = dish(1, "5");
        sold_out.sold_out = true;
        assert!(matches!(
            cart.add(&sold_out, 1, noon(), PARIS),
            Err(CartError::DishUnavailable { dish_id: 1, .. })
        ));

        // dinner-only dish ordered for lunch
        let mut dinner = dish(2, "5");
        dinner.availability = vec![AvailabilityWindow::new(
            Weekday::Wed,
            NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(22, 0, 0).unwrap(),
        )];
        assert!(cart.add(&dinner, 1, noon(), PARIS).is_err());
        let evening = noon() + chrono::Duration::hours(8);
        assert!(cart.add(&dinner, 1, evening, PARIS).is_ok());
    }

    #[test]
    fn set_quantity_zero_removes_line() {
        let mut cart = CartStore::in_memory();
        let id = cart.add(&dish(1, "4"), 2, noon(), PARIS).unwrap();

        cart.set_quantity(id, 7).unwrap();
        assert_eq!(cart.lines()[0].quantity, 7);

        cart.set_quantity(id, 0).unwrap();
        assert!(cart.is_empty());
        assert!(matches!(
            cart.set_quantity(id, 1),
            Err(CartError::LineNotFound(_))
        ));
    }

    #[test]
    fn remove_and_clear() {
        let mut cart = CartStore::in_memory();
        let a = cart.add(&dish(1, "4"), 1, noon(), PARIS).unwrap();
        cart.add(&dish(2, "6"), 1, noon(), PARIS).unwrap();

        let removed = cart.remove(a).unwrap();
        assert_eq!(removed.dish_id, 1);
        assert!(matches!(cart.remove(a), Err(CartError::LineNotFound(_))));

        cart.clear().unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn grouped_follows_pickup_times() {
        let mut cart = CartStore::in_memory();
        let later = noon() + chrono::Duration::days(2);
        cart.add(&dish(1, "4"), 1, later, PARIS).unwrap();
        cart.add(&dish(2, "4"), 1, noon(), PARIS).unwrap();
        cart.add(&dish(3, "4"), 1, later, PARIS).unwrap();

        let groups = cart.grouped();
        let keys: Vec<_> = groups.keys().copied().collect();
        assert_eq!(keys, vec![noon(), later]);
        assert_eq!(groups[&later].len(), 2);
    }

    #[test]
    fn failed_write_leaves_cart_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.json");
        let mut cart = CartStore::open(&path).unwrap();
        let id = cart.add(&dish(1, "4"), 2, noon(), PARIS).unwrap();
        let before = cart.lines().to_vec();

        // the temp file cannot be written while a directory occupies its name
        std::fs::create_dir(dir.path().join("cart.tmp")).unwrap();

        assert!(matches!(
            cart.add(&dish(1, "4"), 1, noon(), PARIS),
            Err(CartError::Io(_))
        ));
        assert!(cart.add(&dish(2, "6"), 1, noon(), PARIS).is_err());
        assert!(cart.set_quantity(id, 9).is_err());
        assert!(cart.set_quantity(id, 0).is_err());
        assert!(cart.remove(id).is_err());
        assert!(cart.clear().is_err());

        assert_eq!(cart.lines(), before.as_slice());
        assert_eq!(CartStore::open(&path).unwrap().lines(), before.as_slice());
    }
}
