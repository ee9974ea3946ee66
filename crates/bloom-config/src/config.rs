//! # Store Configuration
//!
//! Pricing policy for one storefront, read from `store.toml` with
//! environment overrides.
//!
//! ## Environment Variables
//! ```text
//! ┌──────────────────────────────────┬──────────────────┬──────────────────┐
//! │ Variable                         │ Format           │ Overrides        │
//! ├──────────────────────────────────┼──────────────────┼──────────────────┤
//! │ BLOOM_STORE_NAME                 │ text             │ store.name       │
//! │ BLOOM_TAX_RATE                   │ percent, "8.25"  │ tax_rate_bps     │
//! │ BLOOM_FREE_SHIPPING_THRESHOLD    │ dollars, "50.00" │ free threshold   │
//! │ BLOOM_PROMO_CODES                │ "CODE:bps,..."   │ [[promotions]]   │
//! └──────────────────────────────────┴──────────────────┴──────────────────┘
//! ```
//!
//! Unparseable values are logged and ignored; the file value stays.

use std::path::{Path, PathBuf};

use bloom_core::pricing::DEFAULT_TAX_RATE_BPS;
use bloom_core::promotion::{PromotionEntry, SAVE10_BPS, SAVE10_CODE};
use bloom_core::shipping::{
    DEFAULT_EXPRESS_CENTS, DEFAULT_FREE_THRESHOLD_CENTS, DEFAULT_OVERNIGHT_CENTS,
    DEFAULT_STANDARD_CENTS,
};
use bloom_core::validation::validate_rate_bps;
use bloom_core::{
    Money, PricingEngine, PromotionCode, PromotionRegistry, Rate, ShippingCatalog,
    ShippingOption,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

pub const ENV_STORE_NAME: &str = "BLOOM_STORE_NAME";
pub const ENV_TAX_RATE: &str = "BLOOM_TAX_RATE";
pub const ENV_FREE_SHIPPING_THRESHOLD: &str = "BLOOM_FREE_SHIPPING_THRESHOLD";
pub const ENV_PROMO_CODES: &str = "BLOOM_PROMO_CODES";

/// File name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "store.toml";

// =============================================================================
// Store Settings
// =============================================================================

/// Storefront identity and display currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    /// ISO 4217 code. Amounts are always in this currency's minor units.
    #[serde(default = "default_currency_code")]
    pub currency_code: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_store_name() -> String {
    "Bloom".to_string()
}

fn default_currency_code() -> String {
    "USD".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency_code: default_currency_code(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

// =============================================================================
// Pricing Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingSettings {
    /// Sales tax in basis points (800 = 8%).
    #[serde(default = "default_tax_rate_bps")]
    pub tax_rate_bps: u32,
}

fn default_tax_rate_bps() -> u32 {
    DEFAULT_TAX_RATE_BPS
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            tax_rate_bps: default_tax_rate_bps(),
        }
    }
}

// =============================================================================
// Shipping Settings
// =============================================================================

/// Flat shipping prices in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingSettings {
    #[serde(default = "default_standard_cents")]
    pub standard_cents: i64,

    #[serde(default = "default_express_cents")]
    pub express_cents: i64,

    #[serde(default = "default_overnight_cents")]
    pub overnight_cents: i64,

    /// Standard shipping is free when the discounted subtotal reaches this.
    #[serde(default = "default_free_threshold_cents")]
    pub free_threshold_cents: i64,

    /// Set to false to charge standard shipping on every order.
    #[serde(default = "default_true")]
    pub free_shipping_enabled: bool,
}

fn default_standard_cents() -> i64 {
    DEFAULT_STANDARD_CENTS
}
fn default_express_cents() -> i64 {
    DEFAULT_EXPRESS_CENTS
}
fn default_overnight_cents() -> i64 {
    DEFAULT_OVERNIGHT_CENTS
}
fn default_free_threshold_cents() -> i64 {
    DEFAULT_FREE_THRESHOLD_CENTS
}
fn default_true() -> bool {
    true
}

impl Default for ShippingSettings {
    fn default() -> Self {
        ShippingSettings {
            standard_cents: default_standard_cents(),
            express_cents: default_express_cents(),
            overnight_cents: default_overnight_cents(),
            free_threshold_cents: default_free_threshold_cents(),
            free_shipping_enabled: true,
        }
    }
}

impl ShippingSettings {
    /// Builds the shipping catalog, validating every price.
    pub fn catalog(&self) -> ConfigResult<ShippingCatalog> {
        let threshold = self
            .free_shipping_enabled
            .then(|| Money::from_cents(self.free_threshold_cents));

        let catalog = ShippingCatalog::new(
            ShippingOption::standard(Money::from_cents(self.standard_cents), threshold)?,
            ShippingOption::express(Money::from_cents(self.express_cents))?,
            ShippingOption::overnight(Money::from_cents(self.overnight_cents))?,
        )?;
        Ok(catalog)
    }
}

fn default_promotions() -> Vec<PromotionEntry> {
    vec![PromotionEntry {
        code: SAVE10_CODE.to_string(),
        discount_bps: SAVE10_BPS,
    }]
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Complete store configuration.
///
/// ## Example Config File
/// ```toml
/// [store]
/// name = "Bloom"
/// currency_code = "USD"
/// currency_symbol = "$"
///
/// [pricing]
/// tax_rate_bps = 800
///
/// [shipping]
/// standard_cents = 599
/// express_cents = 999
/// overnight_cents = 1999
/// free_threshold_cents = 5000
///
/// [[promotions]]
/// code = "SAVE10"
/// discount_bps = 1000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub pricing: PricingSettings,

    #[serde(default)]
    pub shipping: ShippingSettings,

    #[serde(default = "default_promotions")]
    pub promotions: Vec<PromotionEntry>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            store: StoreSettings::default(),
            pricing: PricingSettings::default(),
            shipping: ShippingSettings::default(),
            promotions: default_promotions(),
        }
    }
}

impl StoreConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (store.toml); a missing file is not an error
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading store config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a config file without environment overrides or validation.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Saves configuration to file, creating the directory if needed.
    ///
    /// Returns the path written.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&path, self.to_toml()?)?;

        info!(?path, "Store config saved");
        Ok(path)
    }

    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks the policy is something the pricing engine can run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store name must not be empty".into()));
        }

        let code = self.store.currency_code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(ConfigError::Invalid(format!(
                "currency_code must be a three-letter ISO code, got: {}",
                self.store.currency_code
            )));
        }

        validate_rate_bps(self.pricing.tax_rate_bps, "tax rate")?;

        self.pricing_engine().map(|_| ())
    }

    /// Applies `BLOOM_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key/value source.
    ///
    /// `lookup` returns the raw value for a variable name, or `None` when
    /// unset.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup(ENV_STORE_NAME) {
            debug!(name = %name, "Overriding store name from environment");
            self.store.name = name;
        }

        if let Some(raw) = lookup(ENV_TAX_RATE) {
            match raw.parse::<Rate>() {
                Ok(rate) => {
                    debug!(rate = %rate, "Overriding tax rate from environment");
                    self.pricing.tax_rate_bps = rate.bps();
                }
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_TAX_RATE),
            }
        }

        if let Some(raw) = lookup(ENV_FREE_SHIPPING_THRESHOLD) {
            match raw.parse::<Money>() {
                Ok(threshold) => {
                    debug!(threshold = %threshold, "Overriding free shipping threshold from environment");
                    self.shipping.free_threshold_cents = threshold.cents();
                    self.shipping.free_shipping_enabled = true;
                }
                Err(e) => warn!(
                    value = %raw,
                    error = %e,
                    "Ignoring invalid {}",
                    ENV_FREE_SHIPPING_THRESHOLD
                ),
            }
        }

        if let Some(raw) = lookup(ENV_PROMO_CODES) {
            match parse_promo_codes(&raw) {
                Ok(promotions) => {
                    debug!(count = promotions.len(), "Overriding promotion codes from environment");
                    self.promotions = promotions;
                }
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid {}", ENV_PROMO_CODES),
            }
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "bloom", "storefront")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Conversion to Engine Types
    // =========================================================================

    pub fn tax_rate(&self) -> Rate {
        Rate::from_bps(self.pricing.tax_rate_bps)
    }

    /// Builds the promotion registry, rejecting invalid or duplicate codes.
    pub fn promotion_registry(&self) -> ConfigResult<PromotionRegistry> {
        let promotions = self
            .promotions
            .iter()
            .map(PromotionCode::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PromotionRegistry::from_promotions(promotions)?)
    }

    /// The pricing engine this configuration describes.
    pub fn pricing_engine(&self) -> ConfigResult<PricingEngine> {
        Ok(PricingEngine::new(
            self.promotion_registry()?,
            self.shipping.catalog()?,
            self.tax_rate(),
        )?)
    }
}

/// Parses `CODE:bps,CODE:bps`. An empty string means no promotions.
pub fn parse_promo_codes(raw: &str) -> ConfigResult<Vec<PromotionEntry>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (code, bps) = entry.split_once(':').ok_or_else(|| {
                ConfigError::Invalid(format!("promotion '{}' must look like CODE:bps", entry))
            })?;
            let discount_bps = bps.trim().parse::<u32>().map_err(|_| {
                ConfigError::Invalid(format!("promotion '{}' has a non-numeric discount", entry))
            })?;
            Ok(PromotionEntry {
                code: code.trim().to_string(),
                discount_bps,
            })
        })
        .collect()
}
