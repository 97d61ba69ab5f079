//! Order entity with an immutable item snapshot and append-only history.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{Address, Money, ProductId};

use super::OrderStatus;

/// A line item frozen into the order at creation time.
///
/// Name and price are copied from the catalog when the order is created and
/// never re-read afterwards, so later catalog edits or deletions cannot
/// change what the customer bought. The product ID is kept only as a weak
/// reference for restocking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Weak reference to the product, used for restocking only.
    pub product_id: ProductId,

    /// Product name at creation time.
    pub name: String,

    /// Unit price at creation time.
    pub unit_price: Money,

    /// Quantity ordered.
    pub quantity: u32,
}

impl OrderItem {
    /// Creates a new order item snapshot.
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// Returns the total price for this line (quantity * unit price).
    pub fn total_price(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// One entry in the order's append-only status history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: OrderStatus,
    pub comment: String,
    pub at: DateTime<Utc>,
}

/// A persisted order.
///
/// Created once by the orchestrator from a non-empty cart, retained forever
/// for audit. Only the status (and its history) changes after creation; the
/// item snapshot and total are immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    user_id: UserId,
    items: Vec<OrderItem>,
    total_amount: Money,
    shipping_address: Address,
    status: OrderStatus,
    status_history: Vec<StatusEntry>,
}

impl Order {
    /// Creates a new pending order from snapshotted items.
    ///
    /// The total is computed from the snapshot and an initial history entry
    /// is appended.
    pub fn new(
        user_id: UserId,
        items: Vec<OrderItem>,
        shipping_address: Address,
    ) -> Result<Self, DomainError> {
        if items.is_empty() {
            return Err(DomainError::NoItems);
        }
        if let Some(item) = items.iter().find(|i| i.quantity == 0) {
            return Err(DomainError::InvalidQuantity {
                quantity: item.quantity,
            });
        }

        let total_amount = items
            .iter()
            .fold(Money::zero(), |acc, item| acc + item.total_price());

        let mut order = Self {
            id: OrderId::new(),
            user_id,
            items,
            total_amount,
            shipping_address,
            status: OrderStatus::Pending,
            status_history: Vec::new(),
        };
        order.append_history("order created");
        Ok(order)
    }

    /// Returns the order ID.
    pub fn id(&self) -> OrderId {
        self.id
    }

    /// Returns the owning user.
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the snapshotted items.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns the total amount frozen at creation.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns the shipping destination.
    pub fn shipping_address(&self) -> &Address {
        &self.shipping_address
    }

    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the append-only status history, oldest first.
    pub fn status_history(&self) -> &[StatusEntry] {
        &self.status_history
    }

    /// Returns true if the order belongs to the given user.
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }

    /// Settles the order after a verified payment event.
    ///
    /// Legal only from `Pending`.
    pub fn mark_paid(&mut self, comment: impl Into<String>) -> Result<(), DomainError> {
        if !self.status.can_mark_paid() {
            return Err(DomainError::IllegalTransition {
                current: self.status,
                attempted: OrderStatus::Paid,
            });
        }
        self.status = OrderStatus::Paid;
        self.append_history(comment);
        Ok(())
    }

    /// Cancels the order without a refund.
    ///
    /// Legal only from `Pending`; a paid order must go through
    /// [`Order::cancel_via_refund`].
    pub fn cancel(&mut self, comment: impl Into<String>) -> Result<(), DomainError> {
        if !self.status.can_cancel_directly() {
            return Err(DomainError::IllegalTransition {
                current: self.status,
                attempted: OrderStatus::Cancelled,
            });
        }
        self.status = OrderStatus::Cancelled;
        self.append_history(comment);
        Ok(())
    }

    /// Cancels a paid order as part of a completed refund.
    pub fn cancel_via_refund(&mut self, comment: impl Into<String>) -> Result<(), DomainError> {
        if !self.status.can_refund() {
            return Err(DomainError::IllegalTransition {
                current: self.status,
                attempted: OrderStatus::Cancelled,
            });
        }
        self.status = OrderStatus::Cancelled;
        self.append_history(comment);
        Ok(())
    }

    fn append_history(&mut self, comment: impl Into<String>) {
        self.status_history.push(StatusEntry {
            status: self.status,
            comment: comment.into(),
            at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> Address {
        Address::new("1 Main St", "Springfield", "12345", "US")
    }

    fn two_line_order() -> Order {
        Order::new(
            UserId::new(),
            vec![
                OrderItem::new("SKU-001", "Widget", Money::from_cents(1000), 2),
                OrderItem::new("SKU-002", "Gadget", Money::from_cents(2500), 1),
            ],
            address(),
        )
        .unwrap()
    }

    #[test]
    fn new_order_is_pending_with_computed_total() {
        let order = two_line_order();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total_amount().cents(), 4500);
        assert_eq!(order.items().len(), 2);
        assert_eq!(order.status_history().len(), 1);
        assert_eq!(order.status_history()[0].status, OrderStatus::Pending);
    }

    #[test]
    fn empty_order_is_rejected() {
        let result = Order::new(UserId::new(), vec![], address());
        assert!(matches!(result, Err(DomainError::NoItems)));
    }

    #[test]
    fn zero_quantity_line_is_rejected() {
        let result = Order::new(
            UserId::new(),
            vec![OrderItem::new("SKU-001", "Widget", Money::from_cents(100), 0)],
            address(),
        );
        assert!(matches!(
            result,
            Err(DomainError::InvalidQuantity { quantity: 0 })
        ));
    }

    #[test]
    fn mark_paid_appends_history() {
        let mut order = two_line_order();
        order.mark_paid("payment confirmed").unwrap();

        assert_eq!(order.status(), OrderStatus::Paid);
        assert_eq!(order.status_history().len(), 2);
        assert_eq!(order.status_history()[1].status, OrderStatus::Paid);
        assert_eq!(order.status_history()[1].comment, "payment confirmed");
    }

    #[test]
    fn mark_paid_twice_fails() {
        let mut order = two_line_order();
        order.mark_paid("payment confirmed").unwrap();

        let result = order.mark_paid("again");
        assert!(matches!(
            result,
            Err(DomainError::IllegalTransition {
                current: OrderStatus::Paid,
                attempted: OrderStatus::Paid,
            })
        ));
        assert_eq!(order.status_history().len(), 2);
    }

    #[test]
    fn direct_cancel_of_paid_order_fails() {
        let mut order = two_line_order();
        order.mark_paid("payment confirmed").unwrap();

        let result = order.cancel("customer changed mind");
        assert!(matches!(
            result,
            Err(DomainError::IllegalTransition {
                current: OrderStatus::Paid,
                attempted: OrderStatus::Cancelled,
            })
        ));
        assert_eq!(order.status(), OrderStatus::Paid);
    }

    #[test]
    fn refund_cancel_requires_paid() {
        let mut order = two_line_order();

        let result = order.cancel_via_refund("refund processed");
        assert!(matches!(result, Err(DomainError::IllegalTransition { .. })));

        order.mark_paid("payment confirmed").unwrap();
        order.cancel_via_refund("refund processed").unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert_eq!(order.status_history().len(), 3);
    }

    #[test]
    fn cancelled_order_cannot_be_paid() {
        let mut order = two_line_order();
        order.cancel("customer changed mind").unwrap();

        let result = order.mark_paid("late webhook");
        assert!(matches!(
            result,
            Err(DomainError::IllegalTransition {
                current: OrderStatus::Cancelled,
                attempted: OrderStatus::Paid,
            })
        ));
    }

    #[test]
    fn ownership_check() {
        let order = two_line_order();
        assert!(order.is_owned_by(order.user_id()));
        assert!(!order.is_owned_by(UserId::new()));
    }

    #[test]
    fn serialization_roundtrip() {
        let order = two_line_order();
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.id(), order.id());
        assert_eq!(deserialized.total_amount(), order.total_amount());
        assert_eq!(deserialized.items(), order.items());
    }
}
