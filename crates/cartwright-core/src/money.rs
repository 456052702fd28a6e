//! # Money
//!
//! Every price, line total and order-total adjustment is a [`Money`]: a
//! signed count of minor currency units.
//!
//! ## Rounding
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  quantity × price        exact, integer                                 │
//! │  Σ line totals           exact, integer                                 │
//! │  Σ adjustments           exact, integer                                 │
//! │  basis_points(bps)       the only place a half-cent is rounded          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Range
//! The arithmetic operators are plain `i64` arithmetic. Amounts stay exact up
//! to `i64::MAX` cents (about 92 quadrillion dollars); past that an operation
//! panics in debug builds and wraps in release builds. Line quantities are
//! range-checked by the store, but `quantity × price` is not.
//!
//! ## Usage
//! ```rust
//! use cartwright_core::money::Money;
//!
//! let coffee = Money::from_cents(1450);
//! let line = coffee * 2;
//! let total = line + Money::from_cents(399);
//! assert_eq!(total.to_string(), "$32.99");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Signed amount in minor currency units. Negative values are discounts.
///
/// No currency is attached; one cart is assumed to price in one currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns `bps` basis points of this amount (1000 bps = 10%).
    ///
    /// Computed in i128, so the intermediate product cannot overflow. The
    /// half-cent rounds away from zero, which keeps a discount and the
    /// matching surcharge symmetric.
    ///
    /// ## Example
    /// ```rust
    /// use cartwright_core::money::Money;
    ///
    /// let sub_total = Money::from_cents(1000);
    /// assert_eq!(sub_total.basis_points(825).cents(), 83);
    /// assert_eq!(sub_total.basis_points(-825).cents(), -83);
    /// ```
    pub fn basis_points(&self, bps: i64) -> Money {
        let raw = self.0 as i128 * bps as i128;
        let half = if raw < 0 { -5000 } else { 5000 };
        Money::from_cents(((raw + half) / 10000) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// `$D.CC` with a leading minus for negatives. Meant for logs; localised
/// formatting belongs to the UI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let magnitude = self.0.unsigned_abs();
        write!(f, "{}${}.{:02}", sign, magnitude / 100, magnitude % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
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

/// Price × quantity. Unchecked, see the module docs on range.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, quantity: i64) -> Self {
        Money(self.0 * quantity)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
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
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_cents(500).to_string(), "$5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::from_cents(-7).to_string(), "-$0.07");
        assert_eq!(Money::zero().to_string(), "$0.00");
        assert_eq!(
            Money::from_cents(i64::MIN).to_string(),
            "-$92233720368547758.08"
        );
    }

    #[test]
    fn test_line_arithmetic() {
        let price = Money::from_cents(1000);
        let voucher = Money::from_cents(-500);

        assert_eq!((price * 3 + voucher).cents(), 2500);
        assert_eq!((price - voucher).cents(), 1500);
        assert_eq!((-voucher).cents(), 500);

        let mut running = Money::default();
        running += price;
        running -= Money::from_cents(1);
        assert_eq!(running.cents(), 999);
    }

    #[test]
    fn test_sum() {
        let amounts = [
            Money::from_cents(10),
            Money::from_cents(36),
            Money::from_cents(-6),
        ];
        let total: Money = amounts.iter().sum();
        assert_eq!(total.cents(), 40);

        let empty: Money = std::iter::empty::<Money>().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_basis_points_rounds_half_away_from_zero() {
        let amount = Money::from_cents(1000);
        assert_eq!(amount.basis_points(1000).cents(), 100);
        // 82.5 cents
        assert_eq!(amount.basis_points(825).cents(), 83);
        assert_eq!(amount.basis_points(-825).cents(), -83);
        assert_eq!(Money::from_cents(-1000).basis_points(825).cents(), -83);
    }

    #[test]
    fn test_basis_points_on_large_amounts() {
        // i64 product would overflow; the i128 path does not
        let amount = Money::from_cents(i64::MAX / 2);
        assert_eq!(amount.basis_points(10000), amount);
    }
}
