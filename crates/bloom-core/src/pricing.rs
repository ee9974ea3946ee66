//! # Pricing Engine
//!
//! The one place a cart becomes a price.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        compute_breakdown                                │
//! │                                                                         │
//! │  Cart ──► validate ──► subtotal ──────────────────────────┐             │
//! │                           │                               │             │
//! │  raw code ──► resolve ──► discount = round(subtotal×rate) │             │
//! │                           │                               │             │
//! │                 discounted = subtotal - discount          │             │
//! │                      │                  │                 │             │
//! │                      ▼                  ▼                 │             │
//! │          shipping(discounted)   tax = round(discounted×r) │             │
//! │                      │                  │                 │             │
//! │                      └───────┬──────────┘                 │             │
//! │                              ▼                            ▼             │
//! │            total = subtotal - discount + shipping + tax                 │
//! │                                                                         │
//! │  Shipping is never taxed. Both free shipping and tax use the            │
//! │  discounted subtotal.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use bloom_core::money::Money;
//! use bloom_core::pricing::PricingEngine;
//! use bloom_core::shipping::ShippingMethod;
//! use bloom_core::types::{Cart, LineItem};
//!
//! let engine = PricingEngine::storefront();
//! let cart = Cart::new(vec![
//!     LineItem::new("velvet-matte", Money::from_cents(2499), 2),
//!     LineItem::new("glossy-gloss", Money::from_cents(1899), 1),
//! ]);
//!
//! let quote = engine.quote(&cart, Some("save10"), ShippingMethod::Standard).unwrap();
//! assert!(quote.promotion_applied);
//! assert_eq!(quote.breakdown.total.to_string(), "$67.04");
//! ```

use tracing::debug;

use crate::error::{InvalidCartError, PricingResult};
use crate::money::Money;
use crate::promotion::{PromotionCode, PromotionRegistry};
use crate::shipping::{free_shipping_progress, ShippingCatalog, ShippingMethod, ShippingOption};
use crate::types::{Cart, PriceBreakdown, Quote, Rate};
use crate::validation::{validate_cart, validate_rate_bps, ValidationResult};

/// Storefront sales tax: 8%.
pub const DEFAULT_TAX_RATE_BPS: u32 = 800;

// =============================================================================
// Pricing Steps
// =============================================================================

/// Sums `unit_price × quantity` over the cart.
///
/// An empty cart sums to zero. Structural problems (non-positive quantity,
/// negative price, duplicate product) fail with `InvalidCartError`.
pub fn compute_subtotal(cart: &Cart) -> PricingResult<Money> {
    validate_cart(cart)?;

    cart.items().iter().try_fold(Money::zero(), |acc, item| {
        item.unit_price
            .checked_multiply_quantity(item.quantity)
            .and_then(|line| acc.checked_add(line))
            .ok_or_else(|| InvalidCartError::AmountOverflow {
                at: item.product_id.clone(),
            })
    })
}

/// Resolves a user-entered code against the registry.
///
/// No match is a normal outcome, not an error.
pub fn resolve_promotion<'a>(raw: &str, registry: &'a PromotionRegistry) -> Option<&'a PromotionCode> {
    registry.resolve(raw)
}

fn overflow(at: &str) -> InvalidCartError {
    InvalidCartError::AmountOverflow { at: at.to_string() }
}

/// Discount for a subtotal, rounded half-to-even at the cent.
pub fn compute_discount(subtotal: Money, promotion: Option<&PromotionCode>) -> PricingResult<Money> {
    match promotion {
        Some(promo) => subtotal
            .apply_rate(promo.discount_rate())
            .ok_or_else(|| overflow("discount")),
        None => Ok(Money::zero()),
    }
}

/// Shipping cost for the discounted subtotal.
pub fn compute_shipping(discounted_subtotal: Money, option: &ShippingOption) -> Money {
    option.cost_for(discounted_subtotal)
}

/// Tax on the taxable amount, rounded half-to-even at the cent.
pub fn compute_tax(taxable: Money, rate: Rate) -> PricingResult<Money> {
    taxable.apply_rate(rate).ok_or_else(|| overflow("tax"))
}

/// Prices a cart end to end.
///
/// ## Errors
/// - `InvalidCartError::EmptyCart` for a cart with no lines
/// - any structural error from [`compute_subtotal`]
/// - `InvalidCartError::AmountOverflow` if the discounted subtotal, tax or
///   total does not fit in [`Money`]
///
/// An unrecognised `raw_code` is reported on the returned [`Quote`]
/// (`promotion_applied == false`), never as an error.
pub fn compute_breakdown(
    cart: &Cart,
    raw_code: Option<&str>,
    registry: &PromotionRegistry,
    option: &ShippingOption,
    tax_rate: Rate,
) -> PricingResult<Quote> {
    if cart.is_empty() {
        return Err(InvalidCartError::EmptyCart);
    }

    let subtotal = compute_subtotal(cart)?;

    let submitted_code = raw_code
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(str::to_string);
    let promotion = submitted_code
        .as_deref()
        .and_then(|code| resolve_promotion(code, registry));

    let discount_amount = compute_discount(subtotal, promotion)?;
    let discounted_subtotal = subtotal
        .checked_sub(discount_amount)
        .ok_or_else(|| overflow("discount"))?;
    let shipping_cost = compute_shipping(discounted_subtotal, option);
    let tax_amount = compute_tax(discounted_subtotal, tax_rate)?;
    let total = discounted_subtotal
        .checked_add(shipping_cost)
        .and_then(|amount| amount.checked_add(tax_amount))
        .ok_or_else(|| overflow("total"))?;

    let breakdown = PriceBreakdown {
        subtotal,
        discount_amount,
        shipping_cost,
        tax_amount,
        total,
    };

    match (&submitted_code, promotion) {
        (Some(code), None) => debug!(code = %code, "Promotion code not recognised"),
        (_, Some(promo)) => debug!(code = promo.code(), discount = %discount_amount, "Promotion applied"),
        _ => {}
    }
    debug!(
        items = cart.len(),
        subtotal = %subtotal,
        shipping = %shipping_cost,
        method = %option.method(),
        tax = %tax_amount,
        total = %total,
        "Cart priced"
    );

    Ok(Quote {
        breakdown,
        promotion_applied: promotion.is_some(),
        applied_code: promotion.map(|p| p.code().to_string()),
        submitted_code,
        shipping_method: option.method(),
        free_shipping: free_shipping_progress(discounted_subtotal, option),
    })
}

// =============================================================================
// Pricing Engine
// =============================================================================

/// A store's pricing policy bundled for repeated quoting.
///
/// Holds no mutable state; `quote` takes `&self`, so one engine can price
/// many carts from many threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingEngine {
    promotions: PromotionRegistry,
    shipping: ShippingCatalog,
    tax_rate: Rate,
}

impl PricingEngine {
    /// Bundles a policy, rejecting a tax rate outside 0..=100%.
    pub fn new(
        promotions: PromotionRegistry,
        shipping: ShippingCatalog,
        tax_rate: Rate,
    ) -> ValidationResult<Self> {
        validate_rate_bps(tax_rate.bps(), "tax rate")?;
        Ok(PricingEngine {
            promotions,
            shipping,
            tax_rate,
        })
    }

    /// Default storefront policy: SAVE10, default shipping catalog, 8% tax.
    pub fn storefront() -> Self {
        PricingEngine {
            promotions: PromotionRegistry::storefront(),
            shipping: ShippingCatalog::storefront(),
            tax_rate: Rate::from_bps(DEFAULT_TAX_RATE_BPS),
        }
    }

    /// Prices a cart with the given code and shipping method.
    pub fn quote(
        &self,
        cart: &Cart,
        raw_code: Option<&str>,
        method: ShippingMethod,
    ) -> PricingResult<Quote> {
        compute_breakdown(
            cart,
            raw_code,
            &self.promotions,
            self.shipping.get(method),
            self.tax_rate,
        )
    }

    pub fn promotions(&self) -> &PromotionRegistry {
        &self.promotions
    }

    pub fn shipping(&self) -> &ShippingCatalog {
        &self.shipping
    }

    pub fn tax_rate(&self) -> Rate {
        self.tax_rate
    }
}

impl Default for PricingEngine {
    fn default() -> Self {
        Self::storefront()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::types::LineItem;
    use std::sync::Arc;

    fn item(id: &str, cents: i64, qty: i64) -> LineItem {
        LineItem::new(id, Money::from_cents(cents), qty)
    }

    fn standard() -> ShippingOption {
        ShippingOption::standard(Money::from_cents(599), Some(Money::from_cents(5000))).unwrap()
    }

    fn tax() -> Rate {
        Rate::from_bps(800)
    }

    fn lipstick_and_gloss() -> Cart {
        Cart::new(vec![
            item("1", 2499, 2).with_variant("Ruby Red"),
            item("2", 1899, 1).with_variant("Clear Shine"),
        ])
    }

    #[test]
    fn test_subtotal_is_additive() {
        let cart = Cart::new(vec![item("a", 2499, 2), item("b", 1899, 1), item("c", 0, 4)]);
        let expected: Money = cart.items().iter().map(|i| i.line_total()).sum();
        assert_eq!(compute_subtotal(&cart).unwrap(), expected);
        assert_eq!(expected.cents(), 6897);
    }

    #[test]
    fn test_subtotal_of_empty_cart_is_zero() {
        assert_eq!(compute_subtotal(&Cart::default()).unwrap(), Money::zero());
    }

    #[test]
    fn test_subtotal_rejects_non_positive_quantity() {
        let cart = Cart::new(vec![item("a", 2499, 1), item("b", 1899, -2)]);
        assert_eq!(
            compute_subtotal(&cart),
            Err(InvalidCartError::NonPositiveQuantity {
                product_id: "b".to_string(),
                quantity: -2,
            })
        );
    }

    #[test]
    fn test_subtotal_overflow_is_reported() {
        let cart = Cart::new(vec![item("huge", i64::MAX / 2, 3)]);
        assert!(matches!(
            compute_subtotal(&cart),
            Err(InvalidCartError::AmountOverflow { .. })
        ));
    }

    #[test]
    fn test_discount_without_promotion_is_zero() {
        assert_eq!(compute_discount(Money::from_cents(6897), None), Ok(Money::zero()));
    }

    #[test]
    fn test_breakdown_overflow_past_subtotal_is_reported() {
        // The subtotal fits; adding shipping and tax does not
        let cart = Cart::new(vec![item("big", i64::MAX - 100, 1)]);
        let result = compute_breakdown(&cart, None, &PromotionRegistry::storefront(), &standard(), tax());
        assert_eq!(
            result,
            Err(InvalidCartError::AmountOverflow {
                at: "total".to_string()
            })
        );

        // SAVE10 brings the same cart back into range
        let quote = compute_breakdown(&cart, Some("SAVE10"), &PromotionRegistry::storefront(), &standard(), tax())
            .unwrap();
        assert!(quote.breakdown.is_balanced());
    }

    #[test]
    fn test_tax_overflow_is_reported() {
        let result = compute_tax(Money::from_cents(i64::MAX), Rate::from_bps(20_000));
        assert_eq!(
            result,
            Err(InvalidCartError::AmountOverflow {
                at: "tax".to_string()
            })
        );
    }

    #[test]
    fn test_engine_rejects_tax_rate_above_100_percent() {
        let result = PricingEngine::new(
            PromotionRegistry::storefront(),
            ShippingCatalog::storefront(),
            Rate::from_bps(10_001),
        );
        assert!(matches!(result, Err(ValidationError::OutOfRange { .. })));

        let engine = PricingEngine::new(
            PromotionRegistry::storefront(),
            ShippingCatalog::storefront(),
            Rate::from_bps(10_000),
        )
        .unwrap();
        assert_eq!(engine.tax_rate().bps(), 10_000);
    }

    #[test]
    fn test_lipstick_and_gloss_with_save10() {
        let registry = PromotionRegistry::storefront();
        let quote = compute_breakdown(
            &lipstick_and_gloss(),
            Some("SAVE10"),
            &registry,
            &standard(),
            tax(),
        )
        .unwrap();

        let b = quote.breakdown;
        assert_eq!(b.subtotal.cents(), 6897);
        assert_eq!(b.discount_amount.cents(), 690);
        assert_eq!(b.discounted_subtotal().cents(), 6207);
        assert_eq!(b.shipping_cost.cents(), 0);
        assert_eq!(b.tax_amount.cents(), 497);
        assert_eq!(b.total.cents(), 6704);
        assert!(b.is_balanced());

        assert!(quote.promotion_applied);
        assert!(!quote.promotion_rejected());
        assert_eq!(quote.applied_code.as_deref(), Some("SAVE10"));
        assert_eq!(quote.shipping_method, ShippingMethod::Standard);
        assert!(quote.free_shipping.unwrap().qualifies);
    }

    #[test]
    fn test_single_item_under_threshold_without_code() {
        let cart = Cart::new(vec![item("nude-gloss", 2250, 1)]);
        let quote = compute_breakdown(&cart, None, &PromotionRegistry::storefront(), &standard(), tax())
            .unwrap();

        let b = quote.breakdown;
        assert_eq!(b.subtotal.cents(), 2250);
        assert_eq!(b.discount_amount.cents(), 0);
        assert_eq!(b.shipping_cost.cents(), 599);
        assert_eq!(b.tax_amount.cents(), 180);
        assert_eq!(b.total.cents(), 3029);

        assert!(!quote.promotion_applied);
        assert!(!quote.promotion_rejected());
        assert_eq!(quote.submitted_code, None);
        assert_eq!(quote.free_shipping.unwrap().remaining.cents(), 2750);
    }

    #[test]
    fn test_unknown_code_is_not_an_error() {
        let quote = compute_breakdown(
            &lipstick_and_gloss(),
            Some("BADCODE"),
            &PromotionRegistry::storefront(),
            &standard(),
            tax(),
        )
        .unwrap();

        assert!(!quote.promotion_applied);
        assert!(quote.promotion_rejected());
        assert_eq!(quote.breakdown.discount_amount, Money::zero());
        assert_eq!(quote.submitted_code.as_deref(), Some("BADCODE"));
        assert_eq!(quote.applied_code, None);
    }

    #[test]
    fn test_blank_code_counts_as_no_code() {
        let quote = compute_breakdown(
            &lipstick_and_gloss(),
            Some("   "),
            &PromotionRegistry::storefront(),
            &standard(),
            tax(),
        )
        .unwrap();
        assert_eq!(quote.submitted_code, None);
        assert!(!quote.promotion_rejected());
    }

    #[test]
    fn test_empty_cart_rejected() {
        let result = compute_breakdown(
            &Cart::default(),
            None,
            &PromotionRegistry::storefront(),
            &standard(),
            tax(),
        );
        assert_eq!(result, Err(InvalidCartError::EmptyCart));
    }

    #[test]
    fn test_free_shipping_boundary_uses_discounted_subtotal() {
        let registry = PromotionRegistry::storefront();

        // Exactly $50.00 → free
        let at = Cart::new(vec![item("a", 5000, 1)]);
        let quote = compute_breakdown(&at, None, &registry, &standard(), tax()).unwrap();
        assert_eq!(quote.breakdown.shipping_cost, Money::zero());

        // $49.99 → flat cost
        let under = Cart::new(vec![item("a", 4999, 1)]);
        let quote = compute_breakdown(&under, None, &registry, &standard(), tax()).unwrap();
        assert_eq!(quote.breakdown.shipping_cost.cents(), 599);

        // $54.00 raw, $48.60 after SAVE10 → charged, because the discount
        // pulls it under the threshold
        let pulled_under = Cart::new(vec![item("a", 5400, 1)]);
        let quote =
            compute_breakdown(&pulled_under, Some("save10"), &registry, &standard(), tax()).unwrap();
        assert_eq!(quote.breakdown.discounted_subtotal().cents(), 4860);
        assert_eq!(quote.breakdown.shipping_cost.cents(), 599);
    }

    #[test]
    fn test_shipping_is_not_taxed() {
        let engine = PricingEngine::storefront();
        let cart = Cart::new(vec![item("a", 1000, 1)]);

        let standard = engine.quote(&cart, None, ShippingMethod::Standard).unwrap();
        let overnight = engine.quote(&cart, None, ShippingMethod::Overnight).unwrap();

        assert_eq!(standard.breakdown.tax_amount, overnight.breakdown.tax_amount);
        assert_eq!(overnight.breakdown.shipping_cost.cents(), 1999);
        assert!(overnight.free_shipping.is_none());
    }

    #[test]
    fn test_breakdown_identity_across_carts() {
        let engine = PricingEngine::storefront();
        let codes = [None, Some("SAVE10"), Some("nope")];

        for cents in [1, 99, 1999, 2250, 4999, 5000, 5556, 12_345] {
            for qty in 1..=4 {
                for code in codes {
                    for method in ShippingMethod::ALL {
                        let cart = Cart::new(vec![item("x", cents, qty), item("y", 1899, 1)]);
                        let quote = engine.quote(&cart, code, method).unwrap();
                        assert!(quote.breakdown.is_balanced(), "{:?}", quote.breakdown);
                        assert!(!quote.breakdown.tax_amount.is_negative());
                        assert!(!quote.breakdown.shipping_cost.is_negative());
                    }
                }
            }
        }
    }

    #[test]
    fn test_quoting_is_idempotent_and_does_not_touch_the_cart() {
        let engine = PricingEngine::storefront();
        let cart = lipstick_and_gloss();
        let before = cart.clone();

        let first = engine.quote(&cart, Some("SAVE10"), ShippingMethod::Express).unwrap();
        let second = engine.quote(&cart, Some("SAVE10"), ShippingMethod::Express).unwrap();

        assert_eq!(first, second);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_cart_order_does_not_change_price() {
        let engine = PricingEngine::storefront();
        let forward = lipstick_and_gloss();
        let mut reversed = forward.clone();
        reversed.items.reverse();

        assert_eq!(
            engine.quote(&forward, Some("SAVE10"), ShippingMethod::Standard).unwrap().breakdown,
            engine.quote(&reversed, Some("SAVE10"), ShippingMethod::Standard).unwrap().breakdown
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_quotes_share_one_engine() {
        let engine = Arc::new(PricingEngine::storefront());

        let handles: Vec<_> = (1..=32)
            .map(|qty| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    let cart = Cart::new(vec![item("lipstick", 2499, qty)]);
                    let quote = engine.quote(&cart, Some("save10"), ShippingMethod::Standard).unwrap();
                    (qty, quote)
                })
            })
            .collect();

        for handle in handles {
            let (qty, quote) = handle.await.unwrap();
            let expected = engine
                .quote(
                    &Cart::new(vec![item("lipstick", 2499, qty)]),
                    Some("SAVE10"),
                    ShippingMethod::Standard,
                )
                .unwrap();
            assert_eq!(quote, expected);
        }
    }
}
