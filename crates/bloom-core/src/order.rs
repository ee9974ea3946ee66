//! # Orders
//!
//! A placed order, its fulfilment status, and the tracking timeline shown on
//! the order status page.
//!
//! ## Status Progression
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Confirmed ──► Processing ──► Shipped ──► OutForDelivery ──► Delivered  │
//! │      │             │                                                    │
//! │      └──────┬──────┘                                                    │
//! │             ▼                                                           │
//! │         Cancelled  (only before the parcel leaves the warehouse)       │
//! │                                                                         │
//! │  Forward only. Delivered and Cancelled are terminal.                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Cart, LineItem, PriceBreakdown, Quote};
use crate::validation::validate_email;

// =============================================================================
// Order Status
// =============================================================================

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Confirmed,
    Processing,
    Shipped,
    OutForDelivery,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// The five fulfilment stages, in order. Cancelled is not a stage.
    pub const STAGES: [OrderStatus; 5] = [
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];

    /// Position in [`Self::STAGES`]; `None` for Cancelled.
    pub fn stage_index(&self) -> Option<usize> {
        Self::STAGES.iter().position(|s| s == self)
    }

    /// Only orders that have not shipped yet can be cancelled.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Confirmed | OrderStatus::Processing)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Title shown on the tracking timeline.
    pub fn title(&self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "Order Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::OutForDelivery => "Out for Delivery",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// One-line description shown under the title.
    pub fn description(&self) -> &'static str {
        match self {
            OrderStatus::Confirmed => "We've received your order",
            OrderStatus::Processing => "Your order is being prepared",
            OrderStatus::Shipped => "Your order is on its way",
            OrderStatus::OutForDelivery => "Your order is out for delivery",
            OrderStatus::Delivered => "Your order has been delivered",
            OrderStatus::Cancelled => "Your order has been cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "confirmed" => Ok(OrderStatus::Confirmed),
            "processing" => Ok(OrderStatus::Processing),
            "shipped" | "in_transit" => Ok(OrderStatus::Shipped),
            "out_for_delivery" => Ok(OrderStatus::OutForDelivery),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(ValidationError::NotAllowed {
                field: "order status".to_string(),
                allowed: OrderStatus::STAGES
                    .iter()
                    .chain(std::iter::once(&OrderStatus::Cancelled))
                    .map(|s| s.to_string())
                    .collect(),
            }),
        }
    }
}

// =============================================================================
// Order
// =============================================================================

/// One recorded status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StatusChange {
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub at: DateTime<Utc>,
}

/// A placed order.
///
/// Order numbers and tracking numbers come from the order-management
/// backend; this type never invents them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub order_number: String,
    pub email: String,
    pub status: OrderStatus,
    pub items: Vec<LineItem>,
    /// Exactly what the pricing engine quoted at checkout.
    pub breakdown: PriceBreakdown,
    pub applied_code: Option<String>,
    pub tracking_number: Option<String>,
    #[ts(as = "String")]
    pub placed_at: DateTime<Utc>,
    pub history: Vec<StatusChange>,
}

/// One row of the tracking timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrackingStep {
    pub stage: OrderStatus,
    pub title: String,
    pub description: String,
    pub completed: bool,
    /// The stage the order is currently in.
    pub active: bool,
    #[ts(as = "Option<String>")]
    pub reached_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Records a confirmed order from a priced cart.
    ///
    /// The breakdown is copied from the quote; the order page never
    /// re-derives subtotal or tax from the total.
    pub fn place(
        order_number: &str,
        email: &str,
        cart: &Cart,
        quote: &Quote,
        placed_at: DateTime<Utc>,
    ) -> CoreResult<Self> {
        if order_number.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "order number".to_string(),
            }
            .into());
        }
        validate_email(email)?;

        Ok(Order {
            order_number: order_number.trim().to_string(),
            email: email.trim().to_string(),
            status: OrderStatus::Confirmed,
            items: cart.items().to_vec(),
            breakdown: quote.breakdown,
            applied_code: quote.applied_code.clone(),
            tracking_number: None,
            placed_at,
            history: vec![StatusChange {
                status: OrderStatus::Confirmed,
                at: placed_at,
            }],
        })
    }

    /// Moves the order to a new status.
    ///
    /// ## Rules
    /// - Terminal orders (delivered, cancelled) never change
    /// - Fulfilment only moves forward; stages may be skipped
    /// - Cancelled is only reachable from a cancellable status
    pub fn advance(&mut self, to: OrderStatus, at: DateTime<Utc>) -> CoreResult<()> {
        let allowed = match (self.status.stage_index(), to.stage_index()) {
            _ if self.status.is_terminal() => false,
            (Some(_), None) => self.status.is_cancellable(),
            (Some(from), Some(next)) => next > from,
            (None, _) => false,
        };

        if !allowed {
            return Err(CoreError::InvalidOrderTransition {
                order_number: self.order_number.clone(),
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }

        self.status = to;
        self.history.push(StatusChange { status: to, at });
        Ok(())
    }

    /// Sets the carrier tracking number.
    pub fn set_tracking_number(&mut self, tracking_number: &str) {
        self.tracking_number = Some(tracking_number.trim().to_string());
    }

    /// When the order reached a status, if it has.
    pub fn reached_at(&self, status: OrderStatus) -> Option<DateTime<Utc>> {
        self.history.iter().find(|c| c.status == status).map(|c| c.at)
    }

    /// The five-stage tracking timeline.
    ///
    /// Every stage up to the current one is completed, the current one is
    /// active. A cancelled order keeps the stages it reached as completed
    /// and has no active stage.
    pub fn timeline(&self) -> Vec<TrackingStep> {
        let current = self.current_stage_index();

        OrderStatus::STAGES
            .iter()
            .enumerate()
            .map(|(index, stage)| TrackingStep {
                stage: *stage,
                title: stage.title().to_string(),
                description: stage.description().to_string(),
                completed: current.is_some_and(|c| index <= c),
                active: self.status.stage_index() == Some(index),
                reached_at: self.reached_at(*stage),
            })
            .collect()
    }

    /// Progress bar value, 0-100.
    pub fn progress_percent(&self) -> u8 {
        match self.current_stage_index() {
            Some(index) => ((index + 1) * 100 / OrderStatus::STAGES.len()) as u8,
            None => 0,
        }
    }

    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).fold(0, i64::saturating_add)
    }

    /// Latest fulfilment stage reached, looking through history for
    /// cancelled orders.
    fn current_stage_index(&self) -> Option<usize> {
        self.history
            .iter()
            .filter_map(|c| c.status.stage_index())
            .max()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::pricing::PricingEngine;
    use crate::shipping::ShippingMethod;
    use chrono::{Duration, TimeZone};

    fn placed_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 14, 30, 0).unwrap()
    }

    fn order() -> Order {
        let cart = Cart::new(vec![
            LineItem::new("1", Money::from_cents(2499), 2).with_variant("Ruby Red"),
            LineItem::new("2", Money::from_cents(1899), 1).with_variant("Clear Shine"),
        ]);
        let quote = PricingEngine::storefront()
            .quote(&cart, Some("SAVE10"), ShippingMethod::Standard)
            .unwrap();
        Order::place("ORD-2024-001234", "sarah@example.com", &cart, &quote, placed_at()).unwrap()
    }

    #[test]
    fn test_place_records_engine_breakdown() {
        let order = order();
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.breakdown.total.cents(), 6704);
        assert_eq!(order.applied_code.as_deref(), Some("SAVE10"));
        assert_eq!(order.total_quantity(), 3);
        assert_eq!(order.reached_at(OrderStatus::Confirmed), Some(placed_at()));
    }

    #[test]
    fn test_total_quantity_saturates() {
        let mut order = order();
        order.items[0].quantity = i64::MAX;
        assert_eq!(order.total_quantity(), i64::MAX);
    }

    #[test]
    fn test_place_validates_contact_details() {
        let cart = Cart::new(vec![LineItem::new("1", Money::from_cents(2250), 1)]);
        let quote = PricingEngine::storefront()
            .quote(&cart, None, ShippingMethod::Standard)
            .unwrap();

        assert!(Order::place("", "sarah@example.com", &cart, &quote, placed_at()).is_err());
        assert!(Order::place("ORD-1", "not-an-email", &cart, &quote, placed_at()).is_err());
    }

    #[test]
    fn test_forward_progress() {
        let mut order = order();
        let t = placed_at();

        order.advance(OrderStatus::Processing, t + Duration::hours(18)).unwrap();
        order.advance(OrderStatus::Shipped, t + Duration::days(2)).unwrap();
        order.set_tracking_number(" 1Z9999W99999999999 ");

        assert_eq!(order.status, OrderStatus::Shipped);
        assert_eq!(order.tracking_number.as_deref(), Some("1Z9999W99999999999"));
        assert!(order.advance(OrderStatus::Processing, t + Duration::days(3)).is_err());
        assert!(order.advance(OrderStatus::Shipped, t + Duration::days(3)).is_err());
    }

    #[test]
    fn test_cancellation_only_before_shipping() {
        let mut early = order();
        early.advance(OrderStatus::Cancelled, placed_at()).unwrap();
        assert!(early.advance(OrderStatus::Processing, placed_at()).is_err());

        let mut late = order();
        late.advance(OrderStatus::Shipped, placed_at()).unwrap();
        assert!(matches!(
            late.advance(OrderStatus::Cancelled, placed_at()),
            Err(CoreError::InvalidOrderTransition { .. })
        ));
    }

    #[test]
    fn test_delivered_is_terminal() {
        let mut order = order();
        order.advance(OrderStatus::Delivered, placed_at()).unwrap();
        assert!(order.advance(OrderStatus::Cancelled, placed_at()).is_err());
    }

    #[test]
    fn test_timeline_for_shipped_order() {
        let mut order = order();
        order.advance(OrderStatus::Processing, placed_at()).unwrap();
        order.advance(OrderStatus::Shipped, placed_at()).unwrap();

        let timeline = order.timeline();
        let completed: Vec<bool> = timeline.iter().map(|s| s.completed).collect();
        let active: Vec<bool> = timeline.iter().map(|s| s.active).collect();

        assert_eq!(completed, vec![true, true, true, false, false]);
        assert_eq!(active, vec![false, false, true, false, false]);
        assert_eq!(timeline[3].title, "Out for Delivery");
        assert!(timeline[3].reached_at.is_none());
        assert_eq!(order.progress_percent(), 60);
    }

    #[test]
    fn test_timeline_for_cancelled_order() {
        let mut order = order();
        order.advance(OrderStatus::Processing, placed_at()).unwrap();
        order.advance(OrderStatus::Cancelled, placed_at()).unwrap();

        let timeline = order.timeline();
        assert!(timeline.iter().all(|s| !s.active));
        assert_eq!(timeline.iter().filter(|s| s.completed).count(), 2);
        assert_eq!(order.progress_percent(), 40);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("out-for-delivery".parse::<OrderStatus>().unwrap(), OrderStatus::OutForDelivery);
        assert_eq!("In Transit".parse::<OrderStatus>().unwrap(), OrderStatus::Shipped);
        assert_eq!("canceled".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
        assert!("lost".parse::<OrderStatus>().is_err());
        assert_eq!(OrderStatus::OutForDelivery.to_string(), "out_for_delivery");
    }
}
