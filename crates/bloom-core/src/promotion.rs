//! # Promotion Module
//!
//! Promotion codes and the registry the pricing engine resolves them against.
//!
//! ## Resolution
//! ```text
//! customer types "  save10 "
//!      │
//!      ▼
//! normalize: trim + uppercase ──► "SAVE10"
//!      │
//!      ▼
//! registry lookup
//!      ├── hit  ──► Some(PromotionCode { SAVE10, 10% })
//!      └── miss ──► None   (not an error: UI says "Invalid promo code")
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::Rate;
use crate::validation::{validate_discount_rate, validate_promotion_code, ValidationResult};

/// Normalizes user-entered or configured codes for comparison.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

// =============================================================================
// Promotion Code
// =============================================================================

/// A recognised promotion.
///
/// `code` is stored normalized (trimmed, upper case) so matching is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct PromotionCode {
    code: String,
    discount_rate: Rate,
}

impl PromotionCode {
    /// Creates a promotion, validating the code and a rate in [0, 1).
    ///
    /// ## Example
    /// ```rust
    /// use bloom_core::promotion::PromotionCode;
    /// use bloom_core::types::Rate;
    ///
    /// let promo = PromotionCode::new("save10", Rate::from_bps(1000)).unwrap();
    /// assert_eq!(promo.code(), "SAVE10");
    ///
    /// assert!(PromotionCode::new("FREE", Rate::from_bps(10_000)).is_err());
    /// ```
    pub fn new(code: &str, discount_rate: Rate) -> ValidationResult<Self> {
        validate_promotion_code(code)?;
        validate_discount_rate(discount_rate)?;

        Ok(PromotionCode {
            code: normalize_code(code),
            discount_rate,
        })
    }

    #[inline]
    pub fn code(&self) -> &str {
        &self.code
    }

    #[inline]
    pub fn discount_rate(&self) -> Rate {
        self.discount_rate
    }
}

// =============================================================================
// Promotion Registry
// =============================================================================

/// Code → promotion mapping the engine resolves against.
///
/// The engine only ever reads a registry; loading one from configuration or
/// a store is the caller's job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromotionRegistry {
    codes: HashMap<String, PromotionCode>,
}

/// The storefront's launch promotion.
pub const SAVE10_CODE: &str = "SAVE10";
pub const SAVE10_BPS: u32 = 1000;

impl PromotionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The default storefront registry: `SAVE10` for 10% off.
    pub fn storefront() -> Self {
        let mut registry = Self::new();
        registry.codes.insert(
            SAVE10_CODE.to_string(),
            PromotionCode {
                code: SAVE10_CODE.to_string(),
                discount_rate: Rate::from_bps(SAVE10_BPS),
            },
        );
        registry
    }

    /// Adds a promotion.
    ///
    /// Two codes that differ only by case or surrounding whitespace are the
    /// same code, so the second one is rejected.
    pub fn insert(&mut self, promotion: PromotionCode) -> ValidationResult<()> {
        if self.codes.contains_key(promotion.code()) {
            return Err(ValidationError::Duplicate {
                field: "promotion code".to_string(),
                value: promotion.code().to_string(),
            });
        }

        self.codes.insert(promotion.code().to_string(), promotion);
        Ok(())
    }

    /// Builds a registry from promotions, rejecting duplicates.
    pub fn from_promotions<I>(promotions: I) -> ValidationResult<Self>
    where
        I: IntoIterator<Item = PromotionCode>,
    {
        let mut registry = Self::new();
        for promotion in promotions {
            registry.insert(promotion)?;
        }
        Ok(registry)
    }

    /// Looks up a raw, user-entered code.
    pub fn resolve(&self, raw: &str) -> Option<&PromotionCode> {
        let normalized = normalize_code(raw);
        if normalized.is_empty() {
            return None;
        }
        self.codes.get(&normalized)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Promotions sorted by code, for stable listings.
    pub fn promotions(&self) -> Vec<&PromotionCode> {
        let mut all: Vec<&PromotionCode> = self.codes.values().collect();
        all.sort_by(|a, b| a.code.cmp(&b.code));
        all
    }
}

/// Promotion entry as it appears in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PromotionEntry {
    pub code: String,
    pub discount_bps: u32,
}

impl TryFrom<&PromotionEntry> for PromotionCode {
    type Error = ValidationError;

    fn try_from(entry: &PromotionEntry) -> Result<Self, Self::Error> {
        PromotionCode::new(&entry.code, Rate::from_bps(entry.discount_bps))
    }
}

impl From<&PromotionCode> for PromotionEntry {
    fn from(promotion: &PromotionCode) -> Self {
        PromotionEntry {
            code: promotion.code.clone(),
            discount_bps: promotion.discount_rate.bps(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_is_case_insensitive_and_trimmed() {
        let registry = PromotionRegistry::storefront();

        for raw in ["SAVE10", "save10", "  Save10  "] {
            let promo = registry.resolve(raw).expect("code should match");
            assert_eq!(promo.code(), "SAVE10");
            assert_eq!(promo.discount_rate().bps(), 1000);
        }
    }

    #[test]
    fn test_unknown_and_blank_codes_resolve_to_none() {
        let registry = PromotionRegistry::storefront();
        assert!(registry.resolve("BADCODE").is_none());
        assert!(registry.resolve("").is_none());
        assert!(registry.resolve("   ").is_none());
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let mut registry = PromotionRegistry::storefront();
        let again = PromotionCode::new(" save10", Rate::from_bps(2000)).unwrap();
        assert!(matches!(
            registry.insert(again),
            Err(ValidationError::Duplicate { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_from_specs() {
        let entries = vec![
            PromotionEntry {
                code: "glow20".to_string(),
                discount_bps: 2000,
            },
            PromotionEntry {
                code: "SAVE10".to_string(),
                discount_bps: 1000,
            },
        ];

        let promotions: Result<Vec<PromotionCode>, _> =
            entries.iter().map(PromotionCode::try_from).collect();
        let registry = PromotionRegistry::from_promotions(promotions.unwrap()).unwrap();

        let codes: Vec<&str> = registry.promotions().iter().map(|p| p.code()).collect();
        assert_eq!(codes, vec!["GLOW20", "SAVE10"]);
    }

    #[test]
    fn test_invalid_specs_rejected() {
        let bad_rate = PromotionEntry {
            code: "ALLFREE".to_string(),
            discount_bps: 10_000,
        };
        assert!(PromotionCode::try_from(&bad_rate).is_err());

        let bad_code = PromotionEntry {
            code: "two words".to_string(),
            discount_bps: 500,
        };
        assert!(PromotionCode::try_from(&bad_code).is_err());
    }
}
