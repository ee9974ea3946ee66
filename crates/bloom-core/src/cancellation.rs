//! # Order Cancellation
//!
//! The three-step "Cancel Order" wizard as an explicit state machine.
//!
//! ## Wizard Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌──────────┐  lookup() ok   ┌──────────────────┐  submit() ok        │
//! │   │  Lookup  │ ─────────────► │ ReasonSelection  │ ─────────────┐      │
//! │   └──────────┘                │ { order }        │              │      │
//! │        ▲                      └──────────────────┘              ▼      │
//! │        │          back()               │              ┌──────────────┐ │
//! │        └───────────────────────────────┘              │  Confirmed   │ │
//! │                                                       │ { request }  │ │
//! │   lookup() errors and submit() without a reason       └──────────────┘ │
//! │   leave the step unchanged.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,ignore
//! let mut flow = CancellationFlow::new();
//! flow.lookup("ORD-2024-001234", "sarah@example.com", &backend)?;
//! show_order(flow.order());
//! let request = flow.submit(Some(CancellationReason::ChangedMind), None)?;
//! backend.cancel(request)?;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};
use ts_rs::TS;

use crate::error::{CancellationError, ValidationError};
use crate::money::Money;
use crate::order::Order;
use crate::validation::validate_email;

/// Longest free-text comment accepted with a cancellation.
pub const MAX_COMMENTS_LEN: usize = 1000;

// =============================================================================
// Order Lookup
// =============================================================================

/// Finds an order by number and the email it was placed with.
///
/// Implemented by whatever owns orders (the order-management backend, a
/// test fixture). Both values must match; a right number with the wrong
/// email is "not found".
pub trait OrderLookup {
    fn find_order(&self, order_number: &str, email: &str) -> Option<Order>;
}

// =============================================================================
// Reasons
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum CancellationReason {
    ChangedMind,
    WrongProduct,
    BetterPrice,
    DeliveryDelay,
    FinancialReasons,
    Other,
}

impl CancellationReason {
    /// Reasons in the order the form lists them.
    pub const ALL: [CancellationReason; 6] = [
        CancellationReason::ChangedMind,
        CancellationReason::WrongProduct,
        CancellationReason::BetterPrice,
        CancellationReason::DeliveryDelay,
        CancellationReason::FinancialReasons,
        CancellationReason::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CancellationReason::ChangedMind => "Changed my mind",
            CancellationReason::WrongProduct => "Ordered wrong product",
            CancellationReason::BetterPrice => "Found better price elsewhere",
            CancellationReason::DeliveryDelay => "Delivery taking too long",
            CancellationReason::FinancialReasons => "Financial reasons",
            CancellationReason::Other => "Other reason",
        }
    }

    /// Form value, e.g. `changed-mind`.
    pub fn value(&self) -> &'static str {
        match self {
            CancellationReason::ChangedMind => "changed-mind",
            CancellationReason::WrongProduct => "wrong-product",
            CancellationReason::BetterPrice => "better-price",
            CancellationReason::DeliveryDelay => "delivery-delay",
            CancellationReason::FinancialReasons => "financial-reasons",
            CancellationReason::Other => "other",
        }
    }
}

impl fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Wizard State
// =============================================================================

/// What the wizard hands to the backend once the customer confirms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CancellationRequest {
    pub order_number: String,
    pub email: String,
    pub reason: CancellationReason,
    pub comments: Option<String>,
    /// The amount charged at checkout, refunded in full.
    pub refund_amount: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum CancellationStep {
    Lookup,
    ReasonSelection { order: Box<Order> },
    Confirmed { request: CancellationRequest },
}

impl CancellationStep {
    fn name(&self) -> &'static str {
        match self {
            CancellationStep::Lookup => "lookup",
            CancellationStep::ReasonSelection { .. } => "reason selection",
            CancellationStep::Confirmed { .. } => "confirmation",
        }
    }
}

/// Drives the cancellation wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancellationFlow {
    step: CancellationStep,
}

impl Default for CancellationFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationFlow {
    /// Starts at the lookup form.
    pub fn new() -> Self {
        CancellationFlow {
            step: CancellationStep::Lookup,
        }
    }

    pub fn step(&self) -> &CancellationStep {
        &self.step
    }

    /// The order found by lookup, while choosing a reason.
    pub fn order(&self) -> Option<&Order> {
        match &self.step {
            CancellationStep::ReasonSelection { order } => Some(order),
            _ => None,
        }
    }

    /// Finds the order and moves to reason selection.
    ///
    /// The found order is then available through [`Self::order`].
    ///
    /// ## Errors
    /// - `Validation` for a blank order number or malformed email
    /// - `OrderNotFound` when number and email do not match an order
    /// - `NotCancellable` once the order has shipped
    pub fn lookup(
        &mut self,
        order_number: &str,
        email: &str,
        orders: &impl OrderLookup,
    ) -> Result<(), CancellationError> {
        self.require(matches!(self.step, CancellationStep::Lookup), "look up an order")?;

        let order_number = order_number.trim();
        if order_number.is_empty() {
            return Err(ValidationError::Required {
                field: "order number".to_string(),
            }
            .into());
        }
        validate_email(email)?;

        let order = orders
            .find_order(order_number, email.trim())
            .ok_or_else(|| CancellationError::OrderNotFound(order_number.to_string()))?;

        if !order.status.is_cancellable() {
            debug!(order = %order.order_number, status = %order.status, "Order not cancellable");
            return Err(CancellationError::NotCancellable {
                order_number: order.order_number.clone(),
                status: order.status.to_string(),
            });
        }

        self.step = CancellationStep::ReasonSelection {
            order: Box::new(order),
        };
        Ok(())
    }

    /// Returns from reason selection to the lookup form.
    pub fn back(&mut self) -> Result<(), CancellationError> {
        self.require(
            matches!(self.step, CancellationStep::ReasonSelection { .. }),
            "go back",
        )?;
        self.step = CancellationStep::Lookup;
        Ok(())
    }

    /// Confirms the cancellation.
    ///
    /// Blank comments are dropped. A missing reason leaves the wizard on
    /// reason selection.
    pub fn submit(
        &mut self,
        reason: Option<CancellationReason>,
        comments: Option<&str>,
    ) -> Result<CancellationRequest, CancellationError> {
        let order = match &self.step {
            CancellationStep::ReasonSelection { order } => order,
            _ => {
                return Err(CancellationError::InvalidTransition {
                    step: self.step.name().to_string(),
                    action: "submit a cancellation".to_string(),
                })
            }
        };

        let reason = reason.ok_or(CancellationError::ReasonRequired)?;

        let comments = comments.map(str::trim).filter(|c| !c.is_empty());
        if comments.is_some_and(|c| c.chars().count() > MAX_COMMENTS_LEN) {
            return Err(ValidationError::TooLong {
                field: "comments".to_string(),
                max: MAX_COMMENTS_LEN,
            }
            .into());
        }

        let request = CancellationRequest {
            order_number: order.order_number.clone(),
            email: order.email.clone(),
            reason,
            comments: comments.map(str::to_string),
            refund_amount: order.breakdown.total,
        };
        info!(order = %request.order_number, reason = reason.value(), "Cancellation requested");

        self.step = CancellationStep::Confirmed {
            request: request.clone(),
        };
        Ok(request)
    }

    fn require(&self, allowed: bool, action: &str) -> Result<(), CancellationError> {
        if allowed {
            Ok(())
        } else {
            Err(CancellationError::InvalidTransition {
                step: self.step.name().to_string(),
                action: action.to_string(),
            })
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
