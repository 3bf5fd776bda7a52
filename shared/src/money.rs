//! Money helpers
//!
//! Amounts are `Decimal` euros with two decimal places. Display follows the
//! French convention: space as thousands separator, comma as decimal mark,
//! trailing euro sign (`1 234,50 €`).

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to cents, half away from zero
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Largest amount a `NUMERIC(10, 2)` column holds
pub fn max_amount() -> Decimal {
    Decimal::new(9_999_999_999, 2)
}

/// Non-negative and within [`max_amount`]
pub fn is_storable_amount(amount: Decimal) -> bool {
    amount >= Decimal::ZERO && amount <= max_amount()
}

/// Format an amount as `1 234,50 €`
pub fn format_eur(amount: Decimal) -> String {
    let rounded = round_cents(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped},{frac_part} €")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_cents(d("2.345")), d("2.35"));
        assert_eq!(round_cents(d("2.344")), d("2.34"));
        assert_eq!(round_cents(d("-2.345")), d("-2.35"));
    }

    #[test]
    fn storable_amounts_fit_numeric_10_2() {
        assert_eq!(max_amount(), d("99999999.99"));
        assert!(is_storable_amount(d("0")));
        assert!(is_storable_amount(d("99999999.99")));
        assert!(!is_storable_amount(d("100000000")));
        assert!(!is_storable_amount(d("-0.01")));
    }

    #[test]
    fn formats_french_style() {
        assert_eq!(format_eur(d("0")), "0,00 €");
        assert_eq!(format_eur(d("7.5")), "7,50 €");
        assert_eq!(format_eur(d("999.99")), "999,99 €");
        assert_eq!(format_eur(d("1234.5")), "1 234,50 €");
        assert_eq!(format_eur(d("1234567.891")), "1 234 567,89 €");
        assert_eq!(format_eur(d("-42")), "-42,00 €");
    }
}
