//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Tax engines add many small amounts per order:                          │
//! │    3 line items × 2 rates = 6 rounding sites                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    Every ItemTax amount is rounded exactly once, in integer math       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use levy_core::money::Money;
//! use levy_core::types::BasisPoints;
//!
//! let price = Money::from_cents(1099); // 10.99
//! let tax = price.apply_rate(BasisPoints::from_bps(1000)).unwrap();
//! assert_eq!(tax.cents(), 110);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::types::BasisPoints;

/// Denominator for basis point arithmetic (10000 bps = 100%).
const BPS_SCALE: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for refunds and promotions
/// - **Currency-free**: The order carries the currency; `Money` never mixes
///   values from two orders
/// - **Checked arithmetic only**: No `+`/`-`/`*` operators; every sum and
///   product returns `Option` instead of wrapping or panicking
///
/// ## Where Money is Used
/// ```text
/// LineItem.price × quantity + promo ──┐
///                                     ├──► TaxableItem.amount ──► ItemTax.amount
/// Shipment.cost + promo ──────────────┘                               │
///                                                                     ▼
///                                              OrderTax.additional_total()
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use levy_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion, truncated toward zero.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Checked addition. Returns `None` on overflow.
    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Checked multiplication by a quantity. Returns `None` on overflow.
    ///
    /// ## Example
    /// ```rust
    /// use levy_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.checked_mul(3), Some(Money::from_cents(897)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_mul(2), None);
    /// ```
    #[inline]
    pub fn checked_mul(self, qty: i64) -> Option<Money> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Checked sum of many amounts. Returns `None` if any partial sum
    /// overflows.
    ///
    /// ## Example
    /// ```rust
    /// use levy_core::money::Money;
    ///
    /// let parts = [Money::from_cents(100), Money::from_cents(250)];
    /// assert_eq!(Money::checked_sum(parts), Some(Money::from_cents(350)));
    /// assert_eq!(Money::checked_sum([Money::from_cents(i64::MAX), Money::from_cents(1)]), None);
    /// ```
    pub fn checked_sum<I>(amounts: I) -> Option<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |total, amount| total.checked_add(amount))
    }

    /// Applies a rate on top of this amount (sales tax style).
    ///
    /// `amount × rate`, rounded half away from zero to the minor unit.
    ///
    /// ## Implementation
    /// Integer math in i128: `round(amount_cents × bps / 10000)`.
    /// Returns `None` if the result does not fit in i64.
    ///
    /// ## Example
    /// ```rust
    /// use levy_core::money::Money;
    /// use levy_core::types::BasisPoints;
    ///
    /// let price = Money::from_cents(1000);      // 10.00
    /// let rate = BasisPoints::from_bps(825);    // 8.25%
    ///
    /// // 10.00 × 8.25% = 0.825 → rounds to 0.83
    /// assert_eq!(price.apply_rate(rate).unwrap().cents(), 83);
    /// ```
    pub fn apply_rate(&self, rate: BasisPoints) -> Option<Money> {
        let numerator = self.0 as i128 * rate.bps() as i128;
        Self::from_wide(div_round_half_away(numerator, BPS_SCALE))
    }

    /// Deduces the tax already contained in this amount (VAT style).
    ///
    /// `amount × rate / (1 + rate)`, rounded half away from zero.
    ///
    /// Returns `None` when `1 + rate` is not positive (rate ≤ -100%) or the
    /// result does not fit in i64.
    ///
    /// ## Example
    /// ```rust
    /// use levy_core::money::Money;
    /// use levy_core::types::BasisPoints;
    ///
    /// // 11.00 including 10% VAT contains 1.00 of tax
    /// let gross = Money::from_cents(1100);
    /// let vat = gross.included_portion(BasisPoints::from_bps(1000)).unwrap();
    /// assert_eq!(vat.cents(), 100);
    /// ```
    pub fn included_portion(&self, rate: BasisPoints) -> Option<Money> {
        let denominator = BPS_SCALE + rate.bps() as i128;
        if denominator <= 0 {
            return None;
        }
        let numerator = self.0 as i128 * rate.bps() as i128;
        Self::from_wide(div_round_half_away(numerator, denominator))
    }

    fn from_wide(value: i128) -> Option<Money> {
        i64::try_from(value).ok().map(Money)
    }
}

/// Integer division rounding half away from zero. `denominator` must be > 0.
fn div_round_half_away(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator / denominator;
    let remainder = numerator % denominator;
    if remainder.abs() * 2 >= denominator {
        quotient + numerator.signum()
    } else {
        quotient
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount as `major.minor` without a currency symbol; the
/// currency lives on the order.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
