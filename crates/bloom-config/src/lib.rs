//! # bloom-config: Store Pricing Policy
//!
//! Loads the policy the pricing engine runs with: tax rate, shipping prices,
//! the free-shipping threshold and the promotion codes on offer.
//!
//! ## Where Values Come From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. Built-in defaults    8% tax, $5.99/$9.99/$19.99, free from $50.00, │
//! │                          SAVE10                                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  2. store.toml           <config dir>/com.bloom.storefront/store.toml  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  3. Environment          BLOOM_STORE_NAME, BLOOM_TAX_RATE,             │
//! │                          BLOOM_FREE_SHIPPING_THRESHOLD,                │
//! │                          BLOOM_PROMO_CODES                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  4. validate()  ──►  StoreConfig::pricing_engine()  ──►  PricingEngine │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//! - [`config`] - `StoreConfig` and its sections
//! - [`error`] - Configuration errors

pub mod config;
pub mod error;

pub use config::{PricingSettings, ShippingSettings, StoreConfig, StoreSettings};
pub use error::{ConfigError, ConfigResult};
