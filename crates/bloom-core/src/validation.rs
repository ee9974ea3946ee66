//! # Validation Module
//!
//! Input validation utilities for the storefront core.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront pages (TypeScript)                                │
//! │  ├── Required fields, quantity steppers that stop at 1                 │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Basket / config / cancellation form (Rust)                   │
//! │  └── THIS MODULE: field rules (quantity, price, rate, code, email)     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pricing engine                                               │
//! │  └── validate_cart: structural snapshot checks → InvalidCartError      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bloom_core::validation::{validate_promotion_code, validate_quantity};
//!
//! assert!(validate_promotion_code("SAVE10").is_ok());
//! assert!(validate_quantity(0).is_err());
//! ```

use std::collections::HashSet;

use crate::error::{InvalidCartError, ValidationError};
use crate::money::Money;
use crate::types::{Cart, Rate};
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest promotion code accepted.
pub const MAX_PROMOTION_CODE_LEN: usize = 32;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a basket quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a non-negative amount (prices, shipping costs, thresholds).
///
/// Zero is allowed: free samples, free shipping.
pub fn validate_price(amount: Money, field: &str) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a rate in basis points: 0 to 10000 (0% to 100%).
pub fn validate_rate_bps(bps: u32, field: &str) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

/// Validates a promotion discount rate: in [0, 1), i.e. 0..=9999 bps.
///
/// A 100% code would make every order free; that is a gift card, not a
/// promotion.
pub fn validate_discount_rate(rate: Rate) -> ValidationResult<()> {
    if rate.bps() >= 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "discount rate".to_string(),
            min: 0,
            max: 9_999,
        });
    }

    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a promotion code as configured by the store.
///
/// ## Rules
/// - Must not be blank
/// - At most MAX_PROMOTION_CODE_LEN characters
/// - ASCII letters, digits, hyphens and underscores only
pub fn validate_promotion_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "promotion code".to_string(),
        });
    }

    if code.len() > MAX_PROMOTION_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "promotion code".to_string(),
            max: MAX_PROMOTION_CODE_LEN,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "promotion code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address well enough for an order lookup form.
///
/// ## Rules
/// - Must not be blank
/// - Exactly one `@`, with text on both sides
/// - No whitespace
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@') => {
            Ok(())
        }
        _ => Err(invalid()),
    }
}

// =============================================================================
// Cart Validator
// =============================================================================

/// Structural checks on a cart snapshot before pricing.
///
/// ## Rules
/// - Every quantity > 0
/// - Every unit price >= 0
/// - `product_id` unique across lines
///
/// Emptiness is NOT checked here: an empty cart has a zero subtotal, and
/// only the full breakdown refuses it.
pub fn validate_cart(cart: &Cart) -> Result<(), InvalidCartError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(cart.len());

    for item in cart.items() {
        if item.quantity <= 0 {
            return Err(InvalidCartError::NonPositiveQuantity {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
            });
        }

        if item.unit_price.is_negative() {
            return Err(InvalidCartError::NegativePrice {
                product_id: item.product_id.clone(),
            });
        }

        if !seen.insert(item.product_id.as_str()) {
            return Err(InvalidCartError::DuplicateProduct(item.product_id.clone()));
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
