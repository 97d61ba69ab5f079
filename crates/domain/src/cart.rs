//! Per-user shopping cart.

use common::UserId;
use serde::{Deserialize, Serialize};

use crate::value_objects::{Money, ProductId};

/// A line in a cart.
///
/// The unit price is captured when the item is added; checkout re-reads the
/// current catalog price, so this value is informational until then.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Money,
}

/// A user's basket.
///
/// Owned by exactly one user, created lazily on first access, never deleted —
/// checkout empties it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    user_id: UserId,
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart for a user.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
        }
    }

    /// Returns the owning user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the line items in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns true if the cart has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the derived total from captured prices.
    pub fn total_amount(&self) -> Money {
        self.items
            .iter()
            .fold(Money::zero(), |acc, item| acc + item.unit_price.multiply(item.quantity))
    }

    /// Returns the quantity of a product already in the cart, 0 if absent.
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.items
            .iter()
            .find(|i| &i.product_id == product_id)
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    /// Adds a quantity of a product, merging with an existing line.
    ///
    /// The captured price is refreshed to the given current price, matching
    /// what the catalog showed at the moment of the add.
    pub fn add_item(&mut self, product_id: ProductId, quantity: u32, unit_price: Money) {
        if let Some(line) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(quantity);
            line.unit_price = unit_price;
        } else {
            self.items.push(CartItem {
                product_id,
                quantity,
                unit_price,
            });
        }
    }

    /// Removes a product line. Quietly does nothing if the line is absent.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.items.retain(|i| &i.product_id != product_id);
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
