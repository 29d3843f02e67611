//! # Money Module
//!
//! Provides the `Money` type for prices, markdown amounts and totals.
//!
//! ## Floating Point, On Purpose
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DOUBLE-PRECISION AMOUNTS                                               │
//! │                                                                         │
//! │  Every amount is an f64 and no step of the pricing pipeline rounds:    │
//! │    Ground Beef $5.99/lb × 1.5 lb = 8.985   (not $8.99)                 │
//! │                                                                         │
//! │  Existing totals are compared against raw double results, so the       │
//! │  arithmetic must stay exactly as written in the evaluators.            │
//! │  Rounding to cents happens ONLY for display (`Display`, `to_cents`).   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! let price = Money::new(1.89);
//! let total = price * 2.0;             // 3.78
//! let marked_down = price - Money::new(0.20);
//! assert!((marked_down.amount() - 1.69).abs() < 1e-9);
//! assert_eq!(format!("{}", total), "$3.78");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in major currency units (dollars), single currency.
///
/// ## Design Decisions
/// - **f64**: matches the double-precision totals the checkout must reproduce
/// - **Signed**: a misconfigured markdown may push a price below zero and
///   that value is kept, not clamped
/// - **Transparent serde**: serialized as a bare number
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► effective price (− markdowns) ──► line total ──► total
///                                         ▲
/// NForX bundle price ─────────────────────┘ (replaces bundled sub-total)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(f64);

impl Money {
    /// Creates a Money value from an amount in major units.
    #[inline]
    pub const fn new(amount: f64) -> Self {
        Money(amount)
    }

    /// Returns the raw amount.
    #[inline]
    pub const fn amount(&self) -> f64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0.0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < 0.0
    }

    /// Checks that the amount is a real number (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.0.is_finite()
    }

    /// Returns `percent` percent of this amount.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::new(4.0).percent(50.0), Money::new(2.0));
    /// ```
    #[inline]
    pub fn percent(&self, percent: f64) -> Money {
        Money(self.0 * (percent / 100.0))
    }

    /// Rounds to whole cents, half away from zero. Display only.
    ///
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::new(8.985).to_cents(), 899);
    /// assert_eq!(Money::new(-0.125).to_cents(), -13);
    /// ```
    pub fn to_cents(&self) -> i64 {
        (self.0 * 100.0).round() as i64
    }

    /// Returns the amount rounded to two decimals. Display only.
    pub fn rounded(&self) -> Money {
        Money(self.to_cents() as f64 / 100.0)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money rounded to cents, e.g. `$8.99` or `-$0.50`.
///
/// ## Note
/// For receipts and logs only. Totals keep full precision.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = self.to_cents();
        let sign = if cents < 0 { "-" } else { "" };
        let cents = cents.abs();
        write!(f, "{}${}.{:02}", sign, cents / 100, cents % 100)
    }
}

impl From<f64> for Money {
    fn from(amount: f64) -> Self {
        Money(amount)
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

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a quantity or weight.
impl Mul<f64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, factor: f64) -> Self {
        Money(self.0 * factor)
    }
}

/// Multiplication by a unit count.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0 * f64::from(qty))
    }
}

/// Left-to-right summation starting from zero.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::new(10.99)), "$10.99");
        assert_eq!(format!("{}", Money::new(5.0)), "$5.00");
        assert_eq!(format!("{}", Money::new(-5.5)), "-$5.50");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
        assert_eq!(format!("{}", Money::new(8.985)), "$8.99");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::new(10.0);
        let b = Money::new(5.0);

        assert_eq!(a + b, Money::new(15.0));
        assert_eq!(a - b, Money::new(5.0));
        assert_eq!(a * 3u32, Money::new(30.0));
        assert_eq!(a * 0.5, Money::new(5.0));
        assert_eq!(-b, Money::new(-5.0));
    }

    #[test]
    fn test_no_rounding_in_arithmetic() {
        // $5.99/lb × 1.5 lb stays unrounded
        let line = Money::new(5.99) * 1.5;
        assert_eq!(line.amount(), 5.99 * 1.5);
        assert_ne!(line, line.rounded());
    }

    #[test]
    fn test_sum_is_left_to_right() {
        let amounts = [Money::new(0.1), Money::new(0.2), Money::new(0.3)];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.amount(), 0.0 + 0.1 + 0.2 + 0.3);
    }

    #[test]
    fn test_percent() {
        assert_eq!(Money::new(4.0).percent(50.0), Money::new(2.0));
        assert_eq!(Money::new(4.0).percent(0.0), Money::zero());
        assert_eq!(Money::new(4.0).percent(100.0), Money::new(4.0));
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::new(-0.1).is_negative());
        assert!(!Money::new(0.1).is_negative());
        assert!(!Money::new(f64::NAN).is_finite());
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&Money::new(1.5)).unwrap();
        assert_eq!(json, "1.5");
        let parsed: Money = serde_json::from_str("2.25").unwrap();
        assert_eq!(parsed, Money::new(2.25));
    }
}
