//! # Shipping Module
//!
//! Shipping methods, their costs, and the free-shipping rule.
//!
//! ## Free Shipping Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  discounted subtotal ──► method == standard?                            │
//! │                               │ yes              │ no                   │
//! │                               ▼                  ▼                      │
//! │                   threshold set and met?     flat cost                  │
//! │                       │ yes       │ no                                  │
//! │                       ▼           ▼                                     │
//! │                     $0.00      flat cost                                │
//! │                                                                         │
//! │  The threshold is compared with the subtotal AFTER the promotion, so   │
//! │  "add $X more for free shipping" already accounts for the discount.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{validate_price, ValidationResult};

// =============================================================================
// Shipping Method
// =============================================================================

/// How an order is delivered. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    /// 5-7 business days.
    #[default]
    Standard,
    /// 2-3 business days.
    Express,
    /// Next business day.
    Overnight,
}

impl ShippingMethod {
    /// All methods in checkout display order.
    pub const ALL: [ShippingMethod; 3] = [
        ShippingMethod::Standard,
        ShippingMethod::Express,
        ShippingMethod::Overnight,
    ];

    /// Human-readable label for the checkout radio group.
    pub fn label(&self) -> &'static str {
        match self {
            ShippingMethod::Standard => "Standard Shipping (5-7 days)",
            ShippingMethod::Express => "Express Shipping (2-3 days)",
            ShippingMethod::Overnight => "Overnight Shipping",
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShippingMethod::Standard => write!(f, "standard"),
            ShippingMethod::Express => write!(f, "express"),
            ShippingMethod::Overnight => write!(f, "overnight"),
        }
    }
}

impl FromStr for ShippingMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(ShippingMethod::Standard),
            "express" => Ok(ShippingMethod::Express),
            "overnight" => Ok(ShippingMethod::Overnight),
            _ => Err(ValidationError::NotAllowed {
                field: "shipping method".to_string(),
                allowed: ShippingMethod::ALL.iter().map(|m| m.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Shipping Option
// =============================================================================

/// A priced shipping method.
///
/// ## Invariants
/// - `flat_cost` is non-negative
/// - `free_threshold` is only ever set for `Standard`
///
/// Fields are private and there is no `Deserialize`, so the invariants can
/// only be established through the constructors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ShippingOption {
    method: ShippingMethod,
    flat_cost: Money,
    free_threshold: Option<Money>,
}

impl ShippingOption {
    /// Creates an option, checking both invariants.
    pub fn new(
        method: ShippingMethod,
        flat_cost: Money,
        free_threshold: Option<Money>,
    ) -> ValidationResult<Self> {
        validate_price(flat_cost, "shipping cost")?;

        if let Some(threshold) = free_threshold {
            if method != ShippingMethod::Standard {
                return Err(ValidationError::InvalidFormat {
                    field: "free shipping threshold".to_string(),
                    reason: format!("only standard shipping can be free, not {}", method),
                });
            }
            validate_price(threshold, "free shipping threshold")?;
        }

        Ok(ShippingOption {
            method,
            flat_cost,
            free_threshold,
        })
    }

    /// Standard shipping, optionally free above a threshold.
    pub fn standard(flat_cost: Money, free_threshold: Option<Money>) -> ValidationResult<Self> {
        Self::new(ShippingMethod::Standard, flat_cost, free_threshold)
    }

    /// Express shipping (never free).
    pub fn express(flat_cost: Money) -> ValidationResult<Self> {
        Self::new(ShippingMethod::Express, flat_cost, None)
    }

    /// Overnight shipping (never free).
    pub fn overnight(flat_cost: Money) -> ValidationResult<Self> {
        Self::new(ShippingMethod::Overnight, flat_cost, None)
    }

    #[inline]
    pub fn method(&self) -> ShippingMethod {
        self.method
    }

    #[inline]
    pub fn flat_cost(&self) -> Money {
        self.flat_cost
    }

    #[inline]
    pub fn free_threshold(&self) -> Option<Money> {
        self.free_threshold
    }

    /// Shipping cost for a given discounted subtotal.
    pub fn cost_for(&self, discounted_subtotal: Money) -> Money {
        match (self.method, self.free_threshold) {
            (ShippingMethod::Standard, Some(threshold)) if discounted_subtotal >= threshold => {
                Money::zero()
            }
            _ => self.flat_cost,
        }
    }
}

// =============================================================================
// Shipping Catalog
// =============================================================================

/// One option per shipping method; what checkout offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct ShippingCatalog {
    standard: ShippingOption,
    express: ShippingOption,
    overnight: ShippingOption,
}

/// Storefront defaults: $5.99 standard (free from $50.00), $9.99 express,
/// $19.99 overnight.
pub const DEFAULT_STANDARD_CENTS: i64 = 599;
pub const DEFAULT_EXPRESS_CENTS: i64 = 999;
pub const DEFAULT_OVERNIGHT_CENTS: i64 = 1999;
pub const DEFAULT_FREE_THRESHOLD_CENTS: i64 = 5000;

impl ShippingCatalog {
    /// Builds a catalog, checking that each option sits in its own slot.
    pub fn new(
        standard: ShippingOption,
        express: ShippingOption,
        overnight: ShippingOption,
    ) -> ValidationResult<Self> {
        for (option, expected) in [
            (&standard, ShippingMethod::Standard),
            (&express, ShippingMethod::Express),
            (&overnight, ShippingMethod::Overnight),
        ] {
            if option.method != expected {
                return Err(ValidationError::InvalidFormat {
                    field: "shipping catalog".to_string(),
                    reason: format!("expected a {} option, got {}", expected, option.method),
                });
            }
        }

        Ok(ShippingCatalog {
            standard,
            express,
            overnight,
        })
    }

    /// The storefront's default shipping prices.
    pub fn storefront() -> Self {
        ShippingCatalog {
            standard: ShippingOption {
                method: ShippingMethod::Standard,
                flat_cost: Money::from_cents(DEFAULT_STANDARD_CENTS),
                free_threshold: Some(Money::from_cents(DEFAULT_FREE_THRESHOLD_CENTS)),
            },
            express: ShippingOption {
                method: ShippingMethod::Express,
                flat_cost: Money::from_cents(DEFAULT_EXPRESS_CENTS),
                free_threshold: None,
            },
            overnight: ShippingOption {
                method: ShippingMethod::Overnight,
                flat_cost: Money::from_cents(DEFAULT_OVERNIGHT_CENTS),
                free_threshold: None,
            },
        }
    }

    /// Returns the option for a method.
    pub fn get(&self, method: ShippingMethod) -> &ShippingOption {
        match method {
            ShippingMethod::Standard => &self.standard,
            ShippingMethod::Express => &self.express,
            ShippingMethod::Overnight => &self.overnight,
        }
    }

    /// All options in display order.
    pub fn options(&self) -> [&ShippingOption; 3] {
        [&self.standard, &self.express, &self.overnight]
    }
}

impl Default for ShippingCatalog {
    fn default() -> Self {
        Self::storefront()
    }
}

// =============================================================================
// Free Shipping Progress
// =============================================================================

/// Data behind the "Add $X more for free shipping" banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FreeShippingProgress {
    pub threshold: Money,
    /// How much more the customer needs to spend; zero once qualified.
    pub remaining: Money,
    /// 0-100, floored.
    pub percent: u8,
    pub qualifies: bool,
}

/// Computes free-shipping progress for a discounted subtotal.
///
/// Returns `None` when the option has no threshold (express, overnight).
///
/// ## Example
/// ```rust
/// use bloom_core::money::Money;
/// use bloom_core::shipping::{free_shipping_progress, ShippingCatalog, ShippingMethod};
///
/// let catalog = ShippingCatalog::storefront();
/// let standard = catalog.get(ShippingMethod::Standard);
///
/// let progress = free_shipping_progress(Money::from_cents(2250), standard).unwrap();
/// assert_eq!(progress.remaining.cents(), 2750); // add $27.50 more
/// assert_eq!(progress.percent, 45);
/// assert!(!progress.qualifies);
/// ```
pub fn free_shipping_progress(
    discounted_subtotal: Money,
    option: &ShippingOption,
) -> Option<FreeShippingProgress> {
    let threshold = option.free_threshold?;
    let qualifies = discounted_subtotal >= threshold;
    let remaining = (threshold - discounted_subtotal).clamp_non_negative();

    let percent = if threshold.is_zero() || qualifies {
        100
    } else {
        let achieved = discounted_subtotal.clamp_non_negative().cents() as i128;
        (achieved * 100 / threshold.cents() as i128).min(100) as u8
    };

    Some(FreeShippingProgress {
        threshold,
        remaining,
        percent,
        qualifies,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> ShippingOption {
        ShippingOption::standard(Money::from_cents(599), Some(Money::from_cents(5000))).unwrap()
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("standard".parse::<ShippingMethod>().unwrap(), ShippingMethod::Standard);
        assert_eq!("EXPRESS".parse::<ShippingMethod>().unwrap(), ShippingMethod::Express);
        assert_eq!(" Overnight ".parse::<ShippingMethod>().unwrap(), ShippingMethod::Overnight);
        assert!("pigeon".parse::<ShippingMethod>().is_err());
        assert_eq!(ShippingMethod::Express.to_string(), "express");
    }

    #[test]
    fn test_threshold_only_for_standard() {
        let err = ShippingOption::new(
            ShippingMethod::Express,
            Money::from_cents(999),
            Some(Money::from_cents(5000)),
        );
        assert!(err.is_err());
        assert!(ShippingOption::express(Money::from_cents(999)).is_ok());
    }

    #[test]
    fn test_negative_costs_rejected() {
        assert!(ShippingOption::overnight(Money::from_cents(-1)).is_err());
        assert!(ShippingOption::standard(Money::from_cents(599), Some(Money::from_cents(-1))).is_err());
    }

    #[test]
    fn test_free_shipping_boundary() {
        let option = standard();
        assert_eq!(option.cost_for(Money::from_cents(5000)), Money::zero());
        assert_eq!(option.cost_for(Money::from_cents(4999)), Money::from_cents(599));
    }

    #[test]
    fn test_express_never_free() {
        let option = ShippingOption::express(Money::from_cents(999)).unwrap();
        assert_eq!(option.cost_for(Money::from_cents(100_000)), Money::from_cents(999));
    }

    #[test]
    fn test_standard_without_threshold_always_charges() {
        let option = ShippingOption::standard(Money::from_cents(599), None).unwrap();
        assert_eq!(option.cost_for(Money::from_cents(100_000)), Money::from_cents(599));
        assert!(free_shipping_progress(Money::from_cents(100), &option).is_none());
    }

    #[test]
    fn test_catalog_defaults_and_slots() {
        let catalog = ShippingCatalog::storefront();
        assert_eq!(catalog.get(ShippingMethod::Standard).flat_cost().cents(), 599);
        assert_eq!(catalog.get(ShippingMethod::Express).flat_cost().cents(), 999);
        assert_eq!(catalog.get(ShippingMethod::Overnight).flat_cost().cents(), 1999);
        assert_eq!(
            catalog.get(ShippingMethod::Standard).free_threshold(),
            Some(Money::from_cents(5000))
        );

        let express = ShippingOption::express(Money::from_cents(999)).unwrap();
        assert!(ShippingCatalog::new(express, express, express).is_err());
    }

    #[test]
    fn test_progress_once_qualified() {
        let progress = free_shipping_progress(Money::from_cents(6207), &standard()).unwrap();
        assert!(progress.qualifies);
        assert_eq!(progress.remaining, Money::zero());
        assert_eq!(progress.percent, 100);
    }

    #[test]
    fn test_progress_floor_percent() {
        let progress = free_shipping_progress(Money::from_cents(4999), &standard()).unwrap();
        assert!(!progress.qualifies);
        assert_eq!(progress.remaining.cents(), 1);
        assert_eq!(progress.percent, 99);
    }
}
