//! # Error Types
//!
//! Domain-specific error types for bloom-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bloom-core errors (this file)                                         │
//! │  ├── InvalidCartError  - Cart snapshot rejected by the pricing engine  │
//! │  ├── ValidationError   - Field-level input validation failures         │
//! │  ├── CoreError         - Basket / order business rule failures         │
//! │  └── CancellationError - Cancellation wizard failures                  │
//! │                                                                         │
//! │  bloom-config errors (separate crate)                                  │
//! │  └── ConfigError       - Store policy loading failures                 │
//! │                                                                         │
//! │  NOT an error: an unrecognised promotion code. The engine reports it   │
//! │  on the Quote so the storefront can say "invalid code".                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, order number, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Invalid Cart Error
// =============================================================================

/// A cart snapshot that the pricing engine refuses to price.
///
/// Always a caller bug: the cart owner must fix the snapshot before asking
/// again. Nothing here is transient, so nothing here is retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidCartError {
    /// The cart has no line items.
    ///
    /// An empty cart is its own storefront state ("your cart is empty"),
    /// not something that gets a price breakdown.
    #[error("Cart is empty")]
    EmptyCart,

    /// A line item carries a zero or negative quantity.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart page: user presses "-" on a qty 1 item
    ///      │
    ///      ▼
    /// Basket removes the line (qty 0 is never retained)
    ///      │
    ///      ▼
    /// Snapshot handed to the engine only has positive quantities
    /// ```
    #[error("Quantity for {product_id} must be positive, got {quantity}")]
    NonPositiveQuantity { product_id: String, quantity: i64 },

    /// A line item has a negative unit price.
    #[error("Unit price for {product_id} cannot be negative")]
    NegativePrice { product_id: String },

    /// The same product appears on two lines.
    #[error("Product {0} appears more than once in the cart")]
    DuplicateProduct(String),

    /// An amount does not fit in the money type. `at` names the product
    /// whose line overflowed, or the breakdown step (`discount`, `tax`,
    /// `total`).
    #[error("Cart amount overflow at {at}")]
    AmountOverflow { at: String },
}

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations in the basket and order
/// lifecycle. They should be caught and translated to user-friendly messages.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The product is not in the basket.
    #[error("Product {0} is not in the cart")]
    ItemNotInCart(String),

    /// Basket has reached its maximum number of distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// An order status change that the fulfilment flow does not allow.
    ///
    /// ## When This Occurs
    /// - Moving a shipped order back to processing
    /// - Touching an order that was already delivered or cancelled
    #[error("Order {order_number} cannot move from {from} to {to}")]
    InvalidOrderTransition {
        order_number: String,
        from: String,
        to: String,
    },

    /// Cart snapshot rejected by the pricing engine.
    #[error("Invalid cart: {0}")]
    InvalidCart(#[from] InvalidCartError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user or configuration input doesn't meet
/// requirements. Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed amount, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., two promotions with the same code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Cancellation Error
// =============================================================================

/// Failures of the order cancellation wizard.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CancellationError {
    /// No order matches the number and email given.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// The order has progressed past the point where it can be cancelled.
    #[error("Order {order_number} is {status} and can no longer be cancelled")]
    NotCancellable { order_number: String, status: String },

    /// The customer submitted the form without picking a reason.
    #[error("A cancellation reason is required")]
    ReasonRequired,

    /// The requested action is not available from the current step.
    #[error("Cannot {action} while at the {step} step")]
    InvalidTransition { step: String, action: String },

    /// Lookup form input failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for pricing operations.
pub type PricingResult<T> = Result<T, InvalidCartError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_cart_messages() {
        let err = InvalidCartError::NonPositiveQuantity {
            product_id: "lipstick-ruby".to_string(),
            quantity: 0,
        };
        assert_eq!(
            err.to_string(),
            "Quantity for lipstick-ruby must be positive, got 0"
        );
        assert_eq!(InvalidCartError::EmptyCart.to_string(), "Cart is empty");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "email".to_string(),
        };
        assert_eq!(err.to_string(), "email is required");

        let err = ValidationError::Duplicate {
            field: "promotion code".to_string(),
            value: "SAVE10".to_string(),
        };
        assert_eq!(err.to_string(), "promotion code 'SAVE10' already exists");
    }

    #[test]
    fn test_conversions_into_core_error() {
        let core_err: CoreError = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = InvalidCartError::EmptyCart.into();
        assert!(matches!(core_err, CoreError::InvalidCart(_)));
    }

    #[test]
    fn test_cancellation_messages() {
        let err = CancellationError::NotCancellable {
            order_number: "ORD-2024-001234".to_string(),
            status: "shipped".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Order ORD-2024-001234 is shipped and can no longer be cancelled"
        );
    }
}
