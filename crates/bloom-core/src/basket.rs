//! # Basket
//!
//! The live shopping cart the customer edits, and the source of the
//! immutable [`Cart`] snapshots the pricing engine prices.
//!
//! ## Basket Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Basket Operations                                    │
//! │                                                                         │
//! │  Storefront Action        Basket Method            State Change         │
//! │  ─────────────────        ─────────────            ────────────         │
//! │                                                                         │
//! │  Add to Bag ─────────────► add_item() ───────────► push or merge qty   │
//! │                                                                         │
//! │  Press + / - ────────────► update_quantity() ────► items[i].qty = n    │
//! │                                                   (n == 0 removes)     │
//! │                                                                         │
//! │  Click Remove ───────────► remove_item() ────────► items.remove(i)     │
//! │                                                                         │
//! │  Checkout ───────────────► snapshot() ───────────► Cart (for pricing)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Cart, LineItem};
use crate::validation::{validate_price, validate_quantity};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// The customer's editable cart.
///
/// ## Invariants
/// - Lines are unique by `product_id` (adding the same product again
///   increases its quantity)
/// - Every quantity is in 1..=MAX_ITEM_QUANTITY; setting 0 removes the line
/// - At most MAX_CART_ITEMS distinct lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Basket {
    items: Vec<LineItem>,
}

impl Basket {
    /// Creates an empty basket.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product, or increases its quantity if already present.
    ///
    /// When merging, the unit price of the existing line is kept: the
    /// price is locked in when the product first entered the cart.
    pub fn add_item(
        &mut self,
        product_id: &str,
        unit_price: Money,
        quantity: i64,
        variant_label: Option<&str>,
    ) -> CoreResult<()> {
        validate_quantity(quantity)?;
        validate_price(unit_price, "unit price")?;

        if product_id.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "product id".to_string(),
            }
            .into());
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_ITEMS,
            });
        }

        let mut item = LineItem::new(product_id, unit_price, quantity);
        item.variant_label = variant_label.map(str::to_string);
        self.items.push(item);
        Ok(())
    }

    /// Sets the quantity of a line.
    ///
    /// ## Behavior
    /// - 0 removes the line
    /// - negative or above MAX_ITEM_QUANTITY is rejected
    /// - unknown product is `CoreError::ItemNotInCart`
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }
        validate_quantity(quantity)?;

        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(())
            }
            None => Err(CoreError::ItemNotInCart(product_id.to_string())),
        }
    }

    /// Removes a line by product id.
    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(CoreError::ItemNotInCart(product_id.to_string()))
        } else {
            Ok(())
        }
    }

    /// Removes every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines (the badge on the bag icon).
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).fold(0, i64::saturating_add)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Freezes the current contents into a cart for pricing.
    pub fn snapshot(&self) -> Cart {
        Cart::new(self.items.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PricingEngine;
    use crate::shipping::ShippingMethod;

    fn lipstick() -> Money {
        Money::from_cents(2499)
    }

    #[test]
    fn test_add_item() {
        let mut basket = Basket::new();
        basket.add_item("velvet-matte", lipstick(), 2, Some("Ruby Red")).unwrap();

        assert_eq!(basket.item_count(), 1);
        assert_eq!(basket.total_quantity(), 2);
        assert_eq!(basket.items()[0].variant_label.as_deref(), Some("Ruby Red"));
    }

    #[test]
    fn test_add_same_product_merges_and_keeps_first_price() {
        let mut basket = Basket::new();
        basket.add_item("velvet-matte", lipstick(), 2, None).unwrap();
        basket.add_item("velvet-matte", Money::from_cents(1999), 3, None).unwrap();

        assert_eq!(basket.item_count(), 1);
        assert_eq!(basket.total_quantity(), 5);
        assert_eq!(basket.items()[0].unit_price, lipstick());
    }

    #[test]
    fn test_add_rejects_bad_input() {
        let mut basket = Basket::new();
        assert!(basket.add_item("a", lipstick(), 0, None).is_err());
        assert!(basket.add_item("a", Money::from_cents(-1), 1, None).is_err());
        assert!(basket.add_item("  ", lipstick(), 1, None).is_err());

        basket.add_item("a", lipstick(), 999, None).unwrap();
        assert!(matches!(
            basket.add_item("a", lipstick(), 1, None),
            Err(CoreError::QuantityTooLarge { requested: 1000, .. })
        ));
    }

    #[test]
    fn test_cart_line_limit() {
        let mut basket = Basket::new();
        for i in 0..MAX_CART_ITEMS {
            basket.add_item(&format!("p{}", i), lipstick(), 1, None).unwrap();
        }
        assert!(matches!(
            basket.add_item("one-too-many", lipstick(), 1, None),
            Err(CoreError::CartTooLarge { .. })
        ));
    }

    #[test]
    fn test_update_to_zero_removes_line() {
        let mut basket = Basket::new();
        basket.add_item("a", lipstick(), 2, None).unwrap();
        basket.add_item("b", Money::from_cents(1899), 1, None).unwrap();

        basket.update_quantity("a", 0).unwrap();

        assert_eq!(basket.item_count(), 1);
        assert!(basket.items().iter().all(|i| i.quantity > 0));
        assert_eq!(basket.items()[0].product_id, "b");
    }

    #[test]
    fn test_update_quantity_errors() {
        let mut basket = Basket::new();
        basket.add_item("a", lipstick(), 2, None).unwrap();

        assert!(matches!(basket.update_quantity("missing", 3), Err(CoreError::ItemNotInCart(_))));
        assert!(basket.update_quantity("a", -1).is_err());
        assert!(basket.update_quantity("a", 1000).is_err());

        basket.update_quantity("a", 7).unwrap();
        assert_eq!(basket.total_quantity(), 7);
    }

    #[test]
    fn test_total_quantity_saturates() {
        let mut basket = Basket::new();
        basket.add_item("a", lipstick(), 2, None).unwrap();
        basket.items.push(LineItem::new("b", lipstick(), i64::MAX));
        assert_eq!(basket.total_quantity(), i64::MAX);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut basket = Basket::new();
        basket.add_item("a", lipstick(), 1, None).unwrap();

        assert!(basket.remove_item("missing").is_err());
        basket.remove_item("a").unwrap();
        assert!(basket.is_empty());

        basket.add_item("a", lipstick(), 1, None).unwrap();
        basket.clear();
        assert!(basket.is_empty());
    }

    #[test]
    fn test_snapshot_prices_and_is_detached() {
        let mut basket = Basket::new();
        basket.add_item("1", lipstick(), 2, Some("Ruby Red")).unwrap();
        basket.add_item("2", Money::from_cents(1899), 1, Some("Clear Shine")).unwrap();

        let snapshot = basket.snapshot();
        basket.clear();

        let quote = PricingEngine::storefront()
            .quote(&snapshot, Some("SAVE10"), ShippingMethod::Standard)
            .unwrap();
        assert_eq!(quote.breakdown.total.cents(), 6704);
        assert_eq!(snapshot.len(), 2);
    }
}
