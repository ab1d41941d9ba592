//! # Money and Quantity Arithmetic
//!
//! Monetary values and stock quantities are decimals stored as `REAL`.
//!
//! ## Representation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE PRECISION MATTERS                                                │
//! │                                                                         │
//! │  Internal arithmetic:   f64                                             │
//! │    price × qty, subtotal accumulation, counted − system                 │
//! │                                                                         │
//! │  Equality:              |a − b| <= QTY_EPSILON (0.0001)                 │
//! │    absorbs float noise, never a business-meaningful difference          │
//! │                                                                         │
//! │  On the wire:           "12.50"  (string, two fraction digits)          │
//! │    terminals never parse a binary float for a monetary sum              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use harbor_core::money::Money;
//!
//! let unit_price = Money::from_amount(2.5);
//! let line_total = unit_price.multiply_quantity(3.0);
//! assert_eq!(line_total.to_string(), "7.50");
//! ```

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Tolerance for quantity and amount comparisons.
pub const QTY_EPSILON: f64 = 0.0001;

/// True when a quantity difference is float noise rather than a real change.
///
/// ## Example
/// ```rust
/// use harbor_core::money::is_negligible;
///
/// assert!(is_negligible(0.00005));
/// assert!(!is_negligible(-3.0));
/// ```
#[inline]
pub fn is_negligible(diff: f64) -> bool {
    diff.abs() <= QTY_EPSILON
}

/// Compares two quantities with [`QTY_EPSILON`] tolerance.
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    is_negligible(a - b)
}

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the store's single currency.
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► OrderItem.unit_price ──► OrderItem.line_total
///                                                   │
///                                     Σ line totals ▼
///                           Order.subtotal = Order.total ──► Payment.amount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(f64);

impl Money {
    /// Creates a Money value from a decimal amount.
    #[inline]
    pub const fn from_amount(amount: f64) -> Self {
        Money(amount)
    }

    /// Returns the raw decimal amount.
    #[inline]
    pub const fn amount(&self) -> f64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0.0)
    }

    /// Checks if the value is zero within [`QTY_EPSILON`].
    #[inline]
    pub fn is_zero(&self) -> bool {
        is_negligible(self.0)
    }

    /// Line total for a quantity of this unit price.
    ///
    /// ## Example
    /// ```rust
    /// use harbor_core::money::Money;
    ///
    /// let line_total = Money::from_amount(1.25).multiply_quantity(0.5);
    /// assert!(line_total.approx_eq(Money::from_amount(0.625)));
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: f64) -> Self {
        Money(self.0 * qty)
    }

    /// Equality within [`QTY_EPSILON`].
    #[inline]
    pub fn approx_eq(&self, other: Money) -> bool {
        approx_eq(self.0, other.0)
    }
}

/// Two fraction digits, no currency symbol. This is also the wire format.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // -0.00 would otherwise leak out of tiny negative float noise
        let value = if is_negligible(self.0) { 0.0 } else { self.0 };
        write!(f, "{:.2}", value)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Serde: string on the way out, string or number on the way in
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct MoneyVisitor;

        impl Visitor<'_> for MoneyVisitor {
            type Value = Money;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal amount as a string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
                v.trim()
                    .parse::<f64>()
                    .map(Money)
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Money, E> {
                Ok(Money(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Money, E> {
                Ok(Money(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Money, E> {
                Ok(Money(v as f64))
            }
        }

        deserializer.deserialize_any(MoneyVisitor)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_digits() {
        assert_eq!(Money::from_amount(10.5).to_string(), "10.50");
        assert_eq!(Money::from_amount(0.0).to_string(), "0.00");
        assert_eq!(Money::from_amount(-0.00001).to_string(), "0.00");
        assert_eq!(Money::from_amount(1234.567).to_string(), "1234.57");
    }

    #[test]
    fn test_float_noise_is_negligible() {
        let total: Money = [0.1, 0.2].iter().map(|a| Money::from_amount(*a)).sum();
        assert!(total.approx_eq(Money::from_amount(0.3)));
        assert_eq!(total.to_string(), "0.30");
    }

    #[test]
    fn test_epsilon_boundary() {
        assert!(is_negligible(QTY_EPSILON));
        assert!(!is_negligible(0.0002));
        assert!(approx_eq(7.0, 7.00005));
        assert!(!approx_eq(10.0, 7.0));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Money::from_amount(7.5)).unwrap();
        assert_eq!(json, "\"7.50\"");
    }

    #[test]
    fn test_deserializes_string_or_number() {
        let from_str: Money = serde_json::from_str("\"12.25\"").unwrap();
        let from_num: Money = serde_json::from_str("12.25").unwrap();
        let from_int: Money = serde_json::from_str("12").unwrap();

        assert!(from_str.approx_eq(Money::from_amount(12.25)));
        assert!(from_num.approx_eq(from_str));
        assert!(from_int.approx_eq(Money::from_amount(12.0)));
        assert!(serde_json::from_str::<Money>("\"abc\"").is_err());
    }
}
