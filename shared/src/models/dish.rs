//! Dish Model
//!
//! A dish is orderable at an instant when it is active, not sold out at
//! that instant, and the restaurant-local weekday/time falls inside one of
//! its availability windows.

use chrono::{DateTime, Datelike, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::money::is_storable_amount;

/// Weekly availability window, end exclusive, in restaurant-local time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub weekday: Weekday,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl AvailabilityWindow {
    pub fn new(weekday: Weekday, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            weekday,
            start,
            end,
        }
    }

    /// Whole-day window for a weekday
    pub fn all_day(weekday: Weekday) -> Self {
        Self {
            weekday,
            start: NaiveTime::MIN,
            end: NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).unwrap_or(NaiveTime::MIN),
        }
    }

    pub fn contains(&self, weekday: Weekday, time: NaiveTime) -> bool {
        self.weekday == weekday && self.start <= time && time < self.end
    }
}

/// Dish entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Dish {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub description: Option<String>,
    /// Object storage key or absolute URL
    pub photo: Option<String>,
    /// Empty means available every day, all day
    #[cfg_attr(feature = "db", sqlx(json))]
    pub availability: Vec<AvailabilityWindow>,
    pub sold_out: bool,
    pub sold_out_from: Option<DateTime<Utc>>,
    pub sold_out_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dish {
    /// Sold out at `at`.
    ///
    /// Without a range the flag applies indefinitely; a missing bound is
    /// open-ended.
    pub fn is_sold_out_at(&self, at: DateTime<Utc>) -> bool {
        if !self.sold_out {
            return false;
        }
        let started = self.sold_out_from.is_none_or(|from| from <= at);
        let not_ended = self.sold_out_until.is_none_or(|until| at < until);
        started && not_ended
    }

    /// Inside one of the weekly windows (local time in `tz`)
    pub fn is_scheduled_at(&self, at: DateTime<Utc>, tz: Tz) -> bool {
        if self.availability.is_empty() {
            return true;
        }
        let local = at.with_timezone(&tz);
        let weekday = local.weekday();
        let time = local.time();
        self.availability
            .iter()
            .any(|w| w.contains(weekday, time))
    }

    pub fn is_orderable_at(&self, at: DateTime<Utc>, tz: Tz) -> bool {
        self.is_active && !self.is_sold_out_at(at) && self.is_scheduled_at(at, tz)
    }
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.scale() > 2 || !is_storable_amount(*price) {
        return Err(ValidationError::new("invalid_price"));
    }
    Ok(())
}

fn validate_windows(windows: &[AvailabilityWindow]) -> Result<(), ValidationError> {
    if windows.iter().any(|w| w.end <= w.start) {
        return Err(ValidationError::new("window_end_before_start"));
    }
    Ok(())
}

/// Create dish payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DishCreate {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub photo: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_windows"))]
    pub availability: Vec<AvailabilityWindow>,
    pub sort_order: Option<i32>,
}

/// Update dish payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct DishUpdate {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub photo: Option<String>,
    #[validate(custom(function = "validate_windows"))]
    pub availability: Option<Vec<AvailabilityWindow>>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Sold-out flag with optional range, set by admin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoldOutUpdate {
    pub sold_out: bool,
    pub sold_out_from: Option<DateTime<Utc>>,
    pub sold_out_until: Option<DateTime<Utc>>,
}

impl SoldOutUpdate {
    pub fn has_valid_range(&self) -> bool {
        match (self.sold_out_from, self.sold_out_until) {
            (Some(from), Some(until)) => from < until,
            _ => true,
        }
    }
}

/// Catalog query: `at` filters to dishes orderable at that instant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DishQuery {
    pub at: Option<DateTime<Utc>>,
}

/// Compact `Mon 11:30-14:00` rendering for emails and logs
pub fn format_window(window: &AvailabilityWindow) -> String {
    format!(
        "{:?} {:02}:{:02}-{:02}:{:02}",
        window.weekday,
        window.start.hour(),
        window.start.minute(),
        window.end.hour(),
        window.end.minute()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PARIS: Tz = chrono_tz::Europe::Paris;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn dish() -> Dish {
        let now = Utc::now();
        Dish {
            id: 1,
            name: "Blanquette de veau".into(),
            price: dec("14.50"),
            description: None,
            photo: None,
            availability: vec![],
            sold_out: false,
            sold_out_from: None,
            sold_out_until: None,
            is_active: true,
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn empty_availability_means_always_orderable() {
        let d = dish();
        assert!(d.is_orderable_at(utc(2025, 3, 4, 3, 0), PARIS));
    }

    #[test]
    fn inactive_dish_is_never_orderable() {
        let mut d = dish();
        d.is_active = false;
        assert!(!d.is_orderable_at(utc(2025, 3, 4, 12, 0), PARIS));
    }

    #[test]
    fn windows_use_restaurant_local_time() {
        let mut d = dish();
        // Tuesday lunch, Paris time
        d.availability = vec![AvailabilityWindow::new(Weekday::Tue, hm(11, 30), hm(14, 0))];

        // 2025-03-04 is a Tuesday; Paris is UTC+1 in March before DST
        assert!(d.is_orderable_at(utc(2025, 3, 4, 10, 30), PARIS)); // 11:30 local
        assert!(!d.is_orderable_at(utc(2025, 3, 4, 10, 29), PARIS)); // 11:29 local
        assert!(!d.is_orderable_at(utc(2025, 3, 4, 13, 0), PARIS)); // 14:00 local, end exclusive
        assert!(!d.is_orderable_at(utc(2025, 3, 5, 11, 0), PARIS)); // Wednesday

        // Summer time shifts the UTC instant
        assert!(d.is_orderable_at(utc(2025, 7, 1, 9, 30), PARIS)); // 11:30 CEST
    }

    #[test]
    fn sold_out_without_range_is_indefinite() {
        let mut d = dish();
        d.sold_out = true;
        assert!(d.is_sold_out_at(utc(2020, 1, 1, 0, 0)));
        assert!(!d.is_orderable_at(utc(2030, 1, 1, 12, 0), PARIS));
    }

    #[test]
    fn sold_out_range_is_half_open() {
        let mut d = dish();
        d.sold_out = true;
        d.sold_out_from = Some(utc(2025, 3, 4, 0, 0));
        d.sold_out_until = Some(utc(2025, 3, 6, 0, 0));

        assert!(!d.is_sold_out_at(utc(2025, 3, 3, 23, 59)));
        assert!(d.is_sold_out_at(utc(2025, 3, 4, 0, 0)));
        assert!(d.is_sold_out_at(utc(2025, 3, 5, 12, 0)));
        assert!(!d.is_sold_out_at(utc(2025, 3, 6, 0, 0)));
        assert!(!d.is_orderable_at(utc(2025, 3, 5, 12, 0), PARIS));
        assert!(d.is_orderable_at(utc(2025, 3, 7, 12, 0), PARIS));
    }

    #[test]
    fn sold_out_open_ended_bounds() {
        let mut d = dish();
        d.sold_out = true;
        d.sold_out_from = Some(utc(2025, 3, 4, 0, 0));
        assert!(!d.is_sold_out_at(utc(2025, 3, 3, 0, 0)));
        assert!(d.is_sold_out_at(utc(2099, 1, 1, 0, 0)));

        d.sold_out_from = None;
        d.sold_out_until = Some(utc(2025, 3, 4, 0, 0));
        assert!(d.is_sold_out_at(utc(2000, 1, 1, 0, 0)));
        assert!(!d.is_sold_out_at(utc(2025, 3, 4, 0, 0)));
    }

    #[test]
    fn range_is_ignored_when_flag_is_off() {
        let mut d = dish();
        d.sold_out_from = Some(utc(2025, 3, 4, 0, 0));
        d.sold_out_until = Some(utc(2025, 3, 6, 0, 0));
        assert!(!d.is_sold_out_at(utc(2025, 3, 5, 0, 0)));
    }

    #[test]
    fn create_payload_validation() {
        let ok = DishCreate {
            name: "Tarte Tatin".into(),
            price: dec("6.90"),
            description: None,
            photo: None,
            availability: vec![AvailabilityWindow::new(Weekday::Fri, hm(18, 0), hm(22, 0))],
            sort_order: None,
        };
        assert!(ok.validate().is_ok());

        let mut bad = ok.clone();
        bad.price = dec("-1");
        assert!(bad.validate().is_err());

        let mut bad = ok.clone();
        bad.price = dec("1.005");
        assert!(bad.validate().is_err());

        // NUMERIC(10, 2) bound
        let mut bad = ok.clone();
        bad.price = dec("100000000.00");
        assert!(bad.validate().is_err());
        let mut top = ok.clone();
        top.price = dec("99999999.99");
        assert!(top.validate().is_ok());

        let mut bad = ok;
        bad.availability = vec![AvailabilityWindow::new(Weekday::Fri, hm(22, 0), hm(18, 0))];
        assert!(bad.validate().is_err());
    }

    #[test]
    fn sold_out_update_range_check() {
        let update = SoldOutUpdate {
            sold_out: true,
            sold_out_from: Some(utc(2025, 3, 6, 0, 0)),
            sold_out_until: Some(utc(2025, 3, 4, 0, 0)),
        };
        assert!(!update.has_valid_range());
    }

    #[test]
    fn all_day_window_covers_late_evening() {
        let w = AvailabilityWindow::all_day(Weekday::Sun);
        assert!(w.contains(Weekday::Sun, hm(23, 59)));
        assert!(w.contains(Weekday::Sun, NaiveTime::MIN));
        assert_eq!(format_window(&w), "Sun 00:00-23:59");
    }
}
