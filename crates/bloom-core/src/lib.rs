//! # bloom-core: Order Pricing for the Bloom Storefront
//!
//! Everything the storefront needs to turn a cart into a trustworthy price:
//! subtotal, promotion discount, shipping, tax and total, computed once and
//! computed the same way on every page.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Bloom Storefront Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Storefront pages (TypeScript, ts-rs types)        │   │
//! │  │    Cart ──► Checkout ──► Order Status ──► Cancel Order          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bloom-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌───────────┐  ┌──────────────┐  │   │
//! │  │   │  basket  │  │ pricing  │  │   order   │  │ cancellation │  │   │
//! │  │   │  Basket  │─►│ Pricing  │─►│   Order   │─►│ Cancellation │  │   │
//! │  │   │          │  │ Engine   │  │ timeline  │  │ Flow         │  │   │
//! │  │   └──────────┘  └────┬─────┘  └───────────┘  └──────────────┘  │   │
//! │  │                      │                                          │   │
//! │  │        money · types · promotion · shipping · validation        │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • INTEGER CENTS • SAME INPUT = SAME QUOTE             │   │
//! │  └─────────────────────────────▲───────────────────────────────────┘   │
//! │                                │ StoreConfig::pricing_engine()          │
//! │  ┌─────────────────────────────┴───────────────────────────────────┐   │
//! │  │        bloom-config (store.toml + BLOOM_* environment)          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money in integer cents, banker's rounding
//! - [`types`] - Rate, LineItem, Cart, PriceBreakdown, Quote
//! - [`promotion`] - Promotion codes and the registry
//! - [`shipping`] - Shipping methods, flat costs, free-shipping threshold
//! - [`pricing`] - The pricing engine
//! - [`basket`] - The editable cart that produces snapshots
//! - [`order`] - Placed orders and the tracking timeline
//! - [`cancellation`] - The cancel-order wizard
//! - [`validation`] - Field and cart checks
//! - [`error`] - Error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bloom_core::{Cart, LineItem, Money, PricingEngine};
//! use bloom_core::shipping::ShippingMethod;
//!
//! let cart = Cart::new(vec![
//!     LineItem::new("velvet-matte-lipstick", Money::from_cents(2499), 2),
//!     LineItem::new("hydrating-lip-gloss", Money::from_cents(1899), 1),
//! ]);
//!
//! let quote = PricingEngine::storefront()
//!     .quote(&cart, Some("SAVE10"), ShippingMethod::Standard)
//!     .unwrap();
//!
//! assert_eq!(quote.breakdown.subtotal.cents(), 6897);
//! assert_eq!(quote.breakdown.discount_amount.cents(), 690);
//! assert!(quote.breakdown.shipping_cost.is_zero());
//! assert_eq!(quote.breakdown.tax_amount.cents(), 497);
//! assert_eq!(quote.breakdown.total.to_string(), "$67.04");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod basket;
pub mod cancellation;
pub mod error;
pub mod money;
pub mod order;
pub mod pricing;
pub mod promotion;
pub mod shipping;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use basket::Basket;
pub use error::{CancellationError, CoreError, CoreResult, InvalidCartError, ValidationError};
pub use money::Money;
pub use order::{Order, OrderStatus};
pub use pricing::PricingEngine;
pub use promotion::{PromotionCode, PromotionRegistry};
pub use shipping::{ShippingCatalog, ShippingMethod, ShippingOption};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a basket.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// Stops a typo like 1000 for 10 from reaching checkout.
pub const MAX_ITEM_QUANTITY: i64 = 999;
