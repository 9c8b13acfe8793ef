//! Money calculation utilities using rust_decimal for precision
//!
//! Monetary values are stored and serialized as `f64`; all arithmetic runs
//! through `Decimal` and converts back at the edge. Receipt totals and tax
//! lines are recomputed here for display only — stored totals stay
//! authoritative.

use rust_decimal::prelude::*;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed unit price
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per sale line
pub const MAX_QUANTITY: i64 = 9999;

/// Convert f64 to Decimal for calculation
///
/// NaN, infinities and out-of-range values collapse to zero; inputs are
/// validated before they get here.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Line total: unit price * quantity
pub fn line_total(price: f64, quantity: i64) -> Decimal {
    (to_decimal(price) * Decimal::from(quantity))
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Tax on a subtotal at a percent rate (e.g. 7.0 for 7%).
/// Prices are tax-exclusive; the tax line is added on top.
pub fn tax_amount(subtotal: Decimal, rate_percent: f64) -> Decimal {
    (subtotal * to_decimal(rate_percent) / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Compare two monetary values for equality (within 0.01 tolerance)
pub fn money_eq(a: f64, b: f64) -> bool {
    let diff = (to_decimal(a) - to_decimal(b)).abs();
    diff < MONEY_TOLERANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_decimal_precision() {
        // Classic floating point problem: 0.1 + 0.2 != 0.3
        let a = 0.1_f64;
        let b = 0.2_f64;
        assert_ne!(a + b, 0.3);

        let sum_dec = to_decimal(a) + to_decimal(b);
        assert_eq!(to_f64(sum_dec), 0.3);
    }

    #[test]
    fn test_accumulation_precision() {
        // Sum 0.01 one thousand times
        let mut total = Decimal::ZERO;
        for _ in 0..1000 {
            total += to_decimal(0.01);
        }
        assert_eq!(to_f64(total), 10.0);
    }

    #[test]
    fn test_line_total() {
        assert_eq!(to_f64(line_total(10.99, 3)), 32.97);
        assert_eq!(to_f64(line_total(0.01, 100)), 1.0);
        assert_eq!(to_f64(line_total(5.0, 0)), 0.0);
    }

    #[test]
    fn test_tax_amount() {
        // 7% on 32.97 = 2.3079 -> 2.31
        assert_eq!(to_f64(tax_amount(to_decimal(32.97), 7.0)), 2.31);
        assert_eq!(to_f64(tax_amount(to_decimal(100.0), 0.0)), 0.0);
        assert_eq!(to_f64(tax_amount(to_decimal(100.0), 10.0)), 10.0);
    }

    #[test]
    fn test_rounding_half_up() {
        // 0.005 rounds up, 0.004 rounds down
        assert_eq!(to_f64(Decimal::new(5, 3)), 0.01);
        assert_eq!(to_f64(Decimal::new(4, 3)), 0.0);
    }

    #[test]
    fn test_money_eq() {
        assert!(money_eq(100.0, 100.0));
        assert!(money_eq(100.004, 100.006));
        assert!(!money_eq(100.0, 100.02));
    }

    #[test]
    fn test_to_decimal_nan_becomes_zero() {
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
        assert_eq!(to_decimal(f64::INFINITY), Decimal::ZERO);
        assert_eq!(to_decimal(f64::NEG_INFINITY), Decimal::ZERO);
    }
}
