//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    24.99 * 2 + 18.99 = 68.97000000000001  ❌                             │
//! │    68.97 * 0.1      = 6.897000000000001   → rounds differently per page │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + Basis Point Rates                        │
//! │    6897 cents × 1000 bps / 10000 = 689.7 → 690 cents (half-to-even)    │
//! │    Every page gets the same answer                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bloom_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(2499); // $24.99
//!
//! // Or parse an exact decimal string
//! let same: Money = "24.99".parse().unwrap();
//! assert_eq!(price, same);
//!
//! // Arithmetic operations
//! let doubled = price * 2;                     // $49.98
//! let total = doubled + Money::from_cents(1899); // $68.97
//! assert_eq!(total.to_string(), "$68.97");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::Rate;

/// Basis points in one whole (100%).
pub(crate) const BPS_PER_UNIT: i128 = 10_000;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents for USD).
///
/// ## Design Decisions
/// - **i64 (signed)**: discounts are subtracted, refunds may be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serializes as plain cents**: `{"unit_price": 2499}`
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  LineItem.unit_price ──► × quantity ──► PriceBreakdown.subtotal         │
/// │                                                │                        │
/// │                          discount ◄────────────┤                        │
/// │                          shipping ◄── threshold┤                        │
/// │                          tax      ◄────────────┘                        │
/// │                                                                         │
/// │  PriceBreakdown.total ──► Order.breakdown ──► order status page        │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use bloom_core::money::Money;
    ///
    /// let price = Money::from_cents(1899); // Represents $18.99
    /// assert_eq!(price.cents(), 1899);
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

    /// Returns the major unit (dollars) portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the larger of `self` and zero.
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Multiplies this amount by a rate and rounds to the cent using
    /// Bankers Rounding (round half to even).
    ///
    /// This is the only place the pricing engine rounds. Discounts and tax
    /// both go through it.
    ///
    /// ## Bankers Rounding Explained
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  BANKERS ROUNDING (Round Half to Even)                              │
    /// │                                                                     │
    /// │  Standard rounding always rounds 0.5 UP, causing systematic bias:  │
    /// │    0.5 → 1, 1.5 → 2, 2.5 → 3, 3.5 → 4 (always up = +bias)         │
    /// │                                                                     │
    /// │  Bankers Rounding rounds 0.5 to nearest EVEN number:               │
    /// │    0.5 → 0, 1.5 → 2, 2.5 → 2, 3.5 → 4 (alternates = no bias)      │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use bloom_core::money::Money;
    /// use bloom_core::types::Rate;
    ///
    /// let subtotal = Money::from_cents(6897); // $68.97
    /// let ten_percent = Rate::from_bps(1000);
    ///
    /// // $6.897 → $6.90
    /// assert_eq!(subtotal.apply_rate(ten_percent).unwrap().cents(), 690);
    ///
    /// // $10.00 × 8.25% = $0.825 → $0.82 (half goes to the even cent)
    /// let tax = Money::from_cents(1000).apply_rate(Rate::from_bps(825)).unwrap();
    /// assert_eq!(tax.cents(), 82);
    ///
    /// // Above 100% the result can outgrow the money type
    /// assert!(Money::from_cents(i64::MAX).apply_rate(Rate::from_bps(20_000)).is_none());
    /// ```
    pub fn apply_rate(&self, rate: Rate) -> Option<Money> {
        // i128 keeps cents × bps from overflowing on large amounts
        let product = self.0 as i128 * rate.bps() as i128;
        i64::try_from(div_round_half_even(product, BPS_PER_UNIT))
            .ok()
            .map(Money)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use bloom_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(2499);
    /// assert_eq!(unit_price.multiply_quantity(2).cents(), 4998);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Multiplies money by a quantity, returning `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Subtracts two amounts, returning `None` on overflow.
    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

/// Divides with round-half-to-even on the remainder.
///
/// Euclidean division keeps the remainder non-negative, so the same rule
/// works for negative numerators (refunds).
pub(crate) fn div_round_half_even(numerator: i128, denominator: i128) -> i128 {
    let quotient = numerator.div_euclid(denominator);
    let remainder = numerator.rem_euclid(denominator);
    let twice = remainder * 2;

    if twice > denominator || (twice == denominator && quotient % 2 != 0) {
        quotient + 1
    } else {
        quotient
    }
}

/// Parses a decimal string with at most two fractional digits into an
/// integer count of hundredths.
///
/// Shared by `Money` ("24.99" → 2499 cents) and `Rate` ("8.25" → 825 bps),
/// which have the same textual shape.
pub(crate) fn parse_hundredths(input: &str, field: &str) -> Result<i64, ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = input.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let unsigned = unsigned.strip_prefix('$').unwrap_or(unsigned);

    let (major, minor) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if major.is_empty() && minor.is_empty() {
        return Err(invalid("expected a decimal number such as 24.99"));
    }
    if !major.chars().all(|c| c.is_ascii_digit()) || !minor.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid("expected a decimal number such as 24.99"));
    }
    if minor.len() > 2 {
        return Err(invalid("at most 2 decimal places are allowed"));
    }

    let major_value: i64 = if major.is_empty() {
        0
    } else {
        major.parse().map_err(|_| invalid("value is too large"))?
    };
    let minor_value: i64 = match minor.len() {
        0 => 0,
        1 => minor.parse::<i64>().map_err(|_| invalid("value is too large"))? * 10,
        _ => minor.parse().map_err(|_| invalid("value is too large"))?,
    };

    let hundredths = major_value
        .checked_mul(100)
        .and_then(|v| v.checked_add(minor_value))
        .ok_or_else(|| invalid("value is too large"))?;

    Ok(if negative { -hundredths } else { hundredths })
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$12.34` / `-$5.50`.
///
/// This is for receipts in the CLI and debugging. The storefront formats
/// amounts itself for localization.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Parses `"24.99"`, `"$24.99"`, `"5"`, `"-5.50"`. More than two decimal
/// places is rejected rather than silently rounded.
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hundredths(s, "amount").map(Money)
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

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a quantity.
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

// =============================================================================
// Unit Tests
// =============================================================================
