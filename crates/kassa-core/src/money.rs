//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Integer Money
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  All amounts are integer kopecks (1/100 of a rouble).                   │
//! │                                                                         │
//! │  Discounts are rounded half-up to a WHOLE rouble:                       │
//! │    5% of 610.00 ₽ = 30.50 ₽  →  31.00 ₽                                │
//! │    5% of 609.00 ₽ = 30.45 ₽  →  30.00 ₽                                │
//! │                                                                         │
//! │  Percentages are basis points (see `Percent`), so the whole             │
//! │  computation stays in i128 integer math.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kassa_core::money::Money;
//! use kassa_core::types::Percent;
//!
//! let price = Money::from_major(600);
//! let discount = price.percent_of(Percent::from_percent(5));
//! assert_eq!(discount, Money::from_major(30));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Percent;

/// Minor units in one major unit (kopecks per rouble).
pub const MINOR_PER_MAJOR: i64 = 100;

/// Basis points in 100%.
const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor currency units.
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► CartLine.price ──► Cart.subtotal ──► cart_total
///                                                          │
///        Discount / Promocode / Combo pricing ◄────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (kopecks).
    ///
    /// ```rust
    /// use kassa_core::money::Money;
    ///
    /// let price = Money::from_minor(12_050); // 120.50 ₽
    /// assert_eq!(price.minor(), 12_050);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole major units (roubles).
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the whole major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is greater than zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Clamps negative values to zero.
    #[inline]
    pub fn non_negative(self) -> Self {
        self.max(Money::zero())
    }

    /// Multiplies money by a quantity.
    ///
    /// ```rust
    /// use kassa_core::money::Money;
    ///
    /// let line_total = Money::from_major(150).multiply_quantity(3);
    /// assert_eq!(line_total, Money::from_major(450));
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Rounds half-up (away from zero) to a whole major unit.
    ///
    /// ```rust
    /// use kassa_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(3_050).round_to_major(), Money::from_major(31));
    /// assert_eq!(Money::from_minor(3_049).round_to_major(), Money::from_major(30));
    /// ```
    pub fn round_to_major(&self) -> Self {
        Money(round_half_up(self.0 as i128, MINOR_PER_MAJOR as i128) as i64 * MINOR_PER_MAJOR)
    }

    /// Scales the amount by `bps / 10000` and rounds half-up to a whole major unit.
    pub fn scaled_by_bps(&self, bps: u32) -> Self {
        let divisor = BPS_SCALE * MINOR_PER_MAJOR as i128;
        let major = round_half_up(self.0 as i128 * bps as i128, divisor);
        Money(major as i64 * MINOR_PER_MAJOR)
    }

    /// Returns `percent` of this amount, rounded half-up to a whole major unit.
    ///
    /// This is the discount amount for a percent rule, not the discounted price.
    #[inline]
    pub fn percent_of(&self, percent: Percent) -> Self {
        self.scaled_by_bps(percent.bps())
    }

    /// Returns the price after taking `percent` off, rounded half-up to a whole major unit.
    ///
    /// ```rust
    /// use kassa_core::money::Money;
    /// use kassa_core::types::Percent;
    ///
    /// let bundle = Money::from_major(450);
    /// assert_eq!(bundle.discounted_by(Percent::from_percent(10)), Money::from_major(405));
    /// ```
    #[inline]
    pub fn discounted_by(&self, percent: Percent) -> Self {
        self.scaled_by_bps(percent.complement().bps())
    }
}

/// Integer division rounding half away from zero.
fn round_half_up(numerator: i128, divisor: i128) -> i128 {
    let half = divisor / 2;
    if numerator >= 0 {
        (numerator + half) / divisor
    } else {
        -((-numerator + half) / divisor)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount as `1234.50 ₽`.
///
/// This is for logs. The UI formats amounts with the user's locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02} ₽", sign, self.major().abs(), self.minor_part())
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

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
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
    fn test_from_major_and_minor() {
        let money = Money::from_minor(12_050);
        assert_eq!(money.major(), 120);
        assert_eq!(money.minor_part(), 50);
        assert_eq!(Money::from_major(600).minor(), 60_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(12_050).to_string(), "120.50 ₽");
        assert_eq!(Money::from_major(30).to_string(), "30.00 ₽");
        assert_eq!(Money::from_minor(-550).to_string(), "-5.50 ₽");
        assert_eq!(Money::zero().to_string(), "0.00 ₽");
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_major(10);
        let b = Money::from_major(5);

        assert_eq!(a + b, Money::from_major(15));
        assert_eq!(a - b, Money::from_major(5));
        assert_eq!(a * 3, Money::from_major(30));

        let total: Money = [a, b, b].iter().sum();
        assert_eq!(total, Money::from_major(20));
    }

    #[test]
    fn test_percent_of_rounds_half_up_to_whole_unit() {
        // 5% of 600 = 30
        assert_eq!(
            Money::from_major(600).percent_of(Percent::from_percent(5)),
            Money::from_major(30)
        );
        // 5% of 610 = 30.5 -> 31
        assert_eq!(
            Money::from_major(610).percent_of(Percent::from_percent(5)),
            Money::from_major(31)
        );
        // 5% of 609 = 30.45 -> 30
        assert_eq!(
            Money::from_major(609).percent_of(Percent::from_percent(5)),
            Money::from_major(30)
        );
    }

    #[test]
    fn test_discounted_by_rounds_the_result() {
        // 15% off 333 = 283.05 -> 283
        assert_eq!(
            Money::from_major(333).discounted_by(Percent::from_percent(15)),
            Money::from_major(283)
        );
        // 50% off 5 = 2.5 -> 3
        assert_eq!(
            Money::from_major(5).discounted_by(Percent::from_percent(50)),
            Money::from_major(3)
        );
    }

    #[test]
    fn test_round_to_major_negative_is_symmetric() {
        assert_eq!(Money::from_minor(-3_050).round_to_major(), Money::from_major(-31));
        assert_eq!(Money::from_minor(-3_049).round_to_major(), Money::from_major(-30));
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(Money::from_major(-3).non_negative(), Money::zero());
        assert_eq!(Money::from_major(3).non_negative(), Money::from_major(3));
    }
}
