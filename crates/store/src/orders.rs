//! Order persistence seam.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, UserId};
use domain::Order;
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};

/// Persistence for orders.
///
/// Inserting an order is the checkout sequence's durability checkpoint;
/// orders are never deleted, only their status changes.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a freshly created order.
    async fn insert(&self, order: Order) -> Result<()>;

    /// Looks up an order by ID.
    async fn find(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// Replaces a stored order after a status change.
    async fn update(&self, order: Order) -> Result<()>;

    /// Returns all orders belonging to a user, oldest first.
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>>;
}

/// In-memory order store, keeping insertion order for per-user listings.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<OrderMap>>,
}

#[derive(Debug, Default)]
struct OrderMap {
    by_id: HashMap<OrderId, Order>,
    insertion: Vec<OrderId>,
}

impl InMemoryOrderStore {
    /// Creates an empty order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn count(&self) -> usize {
        self.orders.read().await.by_id.len()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        let id = order.id();
        if orders.by_id.insert(id, order).is_none() {
            orders.insertion.push(id);
        }
        Ok(())
    }

    async fn find(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.by_id.get(&order_id).cloned())
    }

    async fn update(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        let id = order.id();
        match orders.by_id.get_mut(&id) {
            Some(slot) => {
                *slot = order;
                Ok(())
            }
            None => Err(StoreError::not_found("order", id)),
        }
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .insertion
            .iter()
            .filter_map(|id| orders.by_id.get(id))
            .filter(|o| o.user_id() == user_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Address, Money, OrderItem};

    fn order_for(user_id: UserId) -> Order {
        Order::new(
            user_id,
            vec![OrderItem::new("SKU-001", "Widget", Money::from_cents(1000), 1)],
            Address::new("1 Main St", "Springfield", "12345", "US"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn insert_then_find() {
        let store = InMemoryOrderStore::new();
        let order = order_for(UserId::new());
        let id = order.id();

        store.insert(order).await.unwrap();
        assert!(store.find(id).await.unwrap().is_some());
        assert_eq!(store.count().await, 1);
    }

    #[tokio::test]
    async fn update_missing_order_fails() {
        let store = InMemoryOrderStore::new();
        let order = order_for(UserId::new());

        let result = store.update(order).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn update_replaces_status() {
        let store = InMemoryOrderStore::new();
        let mut order = order_for(UserId::new());
        let id = order.id();
        store.insert(order.clone()).await.unwrap();

        order.mark_paid("payment confirmed").unwrap();
        store.update(order).await.unwrap();

        let stored = store.find(id).await.unwrap().unwrap();
        assert_eq!(stored.status(), domain::OrderStatus::Paid);
    }

    #[tokio::test]
    async fn find_by_user_keeps_insertion_order() {
        let store = InMemoryOrderStore::new();
        let user_id = UserId::new();

        let first = order_for(user_id);
        let second = order_for(user_id);
        let other = order_for(UserId::new());

        store.insert(first.clone()).await.unwrap();
        store.insert(other).await.unwrap();
        store.insert(second.clone()).await.unwrap();

        let orders = store.find_by_user(user_id).await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id(), first.id());
        assert_eq!(orders[1].id(), second.id());
    }
}
