//! # Domain Types
//!
//! Core domain types shared by the pricing engine and its callers.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    LineItem     │   │      Cart       │   │ PriceBreakdown  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  product_id     │◄──│  items (Vec)    │──►│  subtotal       │       │
//! │  │  unit_price     │   │  unique ids     │   │  discount       │       │
//! │  │  quantity > 0   │   └─────────────────┘   │  shipping, tax  │       │
//! │  │  variant_label  │                         │  total          │       │
//! │  └─────────────────┘                         └────────┬────────┘       │
//! │                                                       │                 │
//! │  ┌─────────────────┐                         ┌────────▼────────┐       │
//! │  │      Rate       │                         │      Quote      │       │
//! │  │  bps (u32)      │                         │  breakdown      │       │
//! │  │  800 = 8%       │                         │  promo outcome  │       │
//! │  └─────────────────┘                         └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::{parse_hundredths, Money};
use crate::shipping::{FreeShippingProgress, ShippingMethod};

// =============================================================================
// Rate
// =============================================================================

/// A proportional rate (tax, discount) represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 800 bps = 8% sales tax, 1000 bps = a 10% promotion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Rate(u32);

impl Rate {
    /// Creates a rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Rate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        Rate(0)
    }

    /// Checks if the rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Rate {
    fn default() -> Self {
        Rate::zero()
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
        }
    }
}

/// Parses a percentage such as `"8"`, `"8.25"` or `"8.25%"`.
///
/// ## Example
/// ```rust
/// use bloom_core::types::Rate;
///
/// let rate: Rate = "8.25".parse().unwrap();
/// assert_eq!(rate.bps(), 825);
/// ```
impl FromStr for Rate {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed.strip_suffix('%').unwrap_or(trimmed);
        let bps = parse_hundredths(number, "rate")?;

        u32::try_from(bps)
            .map(Rate)
            .map_err(|_| ValidationError::OutOfRange {
                field: "rate".to_string(),
                min: 0,
                max: u32::MAX as i64,
            })
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product/quantity pairing within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    /// Opaque product identifier, unique within a cart.
    pub product_id: String,

    /// Price of one unit at the time it went into the cart.
    pub unit_price: Money,

    /// Number of units. Always positive in a valid cart.
    pub quantity: i64,

    /// Shade / size shown next to the product ("Ruby Red"). Display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub variant_label: Option<String>,
}

impl LineItem {
    /// Creates a line item without a variant label.
    pub fn new(product_id: impl Into<String>, unit_price: Money, quantity: i64) -> Self {
        LineItem {
            product_id: product_id.into(),
            unit_price,
            quantity,
            variant_label: None,
        }
    }

    /// Sets the variant label.
    pub fn with_variant(mut self, label: impl Into<String>) -> Self {
        self.variant_label = Some(label.into());
        self
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// An immutable cart snapshot handed to the pricing engine.
///
/// ## Invariants (checked by the engine, not by construction)
/// - At least one line item
/// - `product_id` unique across items
/// - Every quantity > 0
///
/// Item order is what the customer sees; it never affects the price.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cart {
    pub items: Vec<LineItem>,
}

impl Cart {
    /// Creates a cart from line items.
    pub fn new(items: Vec<LineItem>) -> Self {
        Cart { items }
    }

    /// Returns the line items in display order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Checks if the cart has no line items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines, saturating at `i64::MAX`.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).fold(0, i64::saturating_add)
    }
}

impl FromIterator<LineItem> for Cart {
    fn from_iter<I: IntoIterator<Item = LineItem>>(iter: I) -> Self {
        Cart::new(iter.into_iter().collect())
    }
}

// =============================================================================
// Price Breakdown
// =============================================================================

/// Full decomposition of a cart's price.
///
/// ## Invariant
/// `total == subtotal - discount_amount + shipping_cost + tax_amount`,
/// exactly, in cents. The engine builds `total` from the other four fields,
/// so this holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PriceBreakdown {
    pub subtotal: Money,
    /// Subtracted from the subtotal.
    pub discount_amount: Money,
    pub shipping_cost: Money,
    pub tax_amount: Money,
    pub total: Money,
}

impl PriceBreakdown {
    /// Subtotal after the promotion: the base for free shipping and tax.
    #[inline]
    pub fn discounted_subtotal(&self) -> Money {
        self.subtotal - self.discount_amount
    }

    /// Checks the breakdown identity.
    pub fn is_balanced(&self) -> bool {
        self.subtotal
            .checked_sub(self.discount_amount)
            .and_then(|amount| amount.checked_add(self.shipping_cost))
            .and_then(|amount| amount.checked_add(self.tax_amount))
            == Some(self.total)
    }

    /// True when shipping was waived.
    #[inline]
    pub fn has_free_shipping(&self) -> bool {
        self.shipping_cost.is_zero()
    }
}

// =============================================================================
// Quote
// =============================================================================

/// What the pricing engine returns: the breakdown plus promotion feedback.
///
/// ## Promotion Feedback
/// ```text
/// submitted_code   promotion_applied   Storefront shows
/// ──────────────   ─────────────────   ─────────────────────────────
/// None             false               nothing
/// Some("save10")   true                "Promo code applied! SAVE10"
/// Some("BADCODE")  false               "Invalid promo code"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Quote {
    pub breakdown: PriceBreakdown,

    /// Whether a recognised promotion was applied.
    pub promotion_applied: bool,

    /// The normalized code that matched, if any.
    pub applied_code: Option<String>,

    /// The trimmed code the caller supplied, if it was not blank.
    pub submitted_code: Option<String>,

    /// Shipping method the breakdown was priced with.
    pub shipping_method: ShippingMethod,

    /// Progress towards free shipping, when the method has a threshold.
    pub free_shipping: Option<FreeShippingProgress>,
}

impl Quote {
    /// True when the customer typed a code that nothing matched.
    pub fn promotion_rejected(&self) -> bool {
        self.submitted_code.is_some() && !self.promotion_applied
    }

    /// Grand total.
    #[inline]
    pub fn total(&self) -> Money {
        self.breakdown.total
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_from_bps() {
        let rate = Rate::from_bps(825);
        assert_eq!(rate.bps(), 825);
        assert!((rate.percentage() - 8.25).abs() < 0.001);
    }

    #[test]
    fn test_rate_parse_and_display() {
        assert_eq!("8".parse::<Rate>().unwrap().bps(), 800);
        assert_eq!("8.25%".parse::<Rate>().unwrap().bps(), 825);
        assert_eq!("0.5".parse::<Rate>().unwrap().bps(), 50);
        assert!("-1".parse::<Rate>().is_err());
        assert!("eight".parse::<Rate>().is_err());

        assert_eq!(Rate::from_bps(800).to_string(), "8%");
        assert_eq!(Rate::from_bps(825).to_string(), "8.25%");
        assert_eq!(Rate::from_bps(5).to_string(), "0.05%");
    }

    #[test]
    fn test_line_item_total_and_variant() {
        let item = LineItem::new("velvet-matte", Money::from_cents(2499), 2).with_variant("Ruby Red");
        assert_eq!(item.line_total().cents(), 4998);
        assert_eq!(item.variant_label.as_deref(), Some("Ruby Red"));
    }

    #[test]
    fn test_cart_counts() {
        let cart: Cart = vec![
            LineItem::new("1", Money::from_cents(2499), 2),
            LineItem::new("2", Money::from_cents(1899), 1),
        ]
        .into_iter()
        .collect();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_quantity(), 3);
        assert!(!cart.is_empty());
        assert!(Cart::default().is_empty());
    }

    #[test]
    fn test_total_quantity_saturates() {
        let cart = Cart::new(vec![
            LineItem::new("a", Money::from_cents(100), i64::MAX),
            LineItem::new("b", Money::from_cents(100), 5),
        ]);
        assert_eq!(cart.total_quantity(), i64::MAX);
    }

    #[test]
    fn test_cart_json_shape() {
        let json = r#"{"items":[{"product_id":"1","unit_price":2499,"quantity":2}]}"#;
        let cart: Cart = serde_json::from_str(json).unwrap();
        assert_eq!(cart.items[0].unit_price, Money::from_cents(2499));
        assert_eq!(cart.items[0].variant_label, None);
    }

    #[test]
    fn test_breakdown_identity_helpers() {
        let breakdown = PriceBreakdown {
            subtotal: Money::from_cents(6897),
            discount_amount: Money::from_cents(690),
            shipping_cost: Money::zero(),
            tax_amount: Money::from_cents(497),
            total: Money::from_cents(6704),
        };
        assert!(breakdown.is_balanced());
        assert!(breakdown.has_free_shipping());
        assert_eq!(breakdown.discounted_subtotal().cents(), 6207);

        let off_by_one = PriceBreakdown {
            total: Money::from_cents(6705),
            ..breakdown
        };
        assert!(!off_by_one.is_balanced());
    }
}
