//! Payment record persistence seam.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use domain::{PaymentRecord, PaymentStatus};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};

/// Persistence for payment records, keyed by the gateway intent ID.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Persists a new payment record.
    async fn insert(&self, record: PaymentRecord) -> Result<()>;

    /// Looks up a record by its gateway intent ID.
    async fn find_by_intent(&self, intent_id: &str) -> Result<Option<PaymentRecord>>;

    /// Returns the unique succeeded record for an order, if any.
    async fn find_succeeded_for_order(&self, order_id: OrderId) -> Result<Option<PaymentRecord>>;

    /// Replaces a stored record after a status change.
    async fn update(&self, record: PaymentRecord) -> Result<()>;
}

/// In-memory payment store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentStore {
    records: Arc<RwLock<HashMap<String, PaymentRecord>>>,
}

impl InMemoryPaymentStore {
    /// Creates an empty payment store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, record: PaymentRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.intent_id.clone(), record);
        Ok(())
    }

    async fn find_by_intent(&self, intent_id: &str) -> Result<Option<PaymentRecord>> {
        Ok(self.records.read().await.get(intent_id).cloned())
    }

    async fn find_succeeded_for_order(&self, order_id: OrderId) -> Result<Option<PaymentRecord>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|r| r.order_id == order_id && r.status == PaymentStatus::Succeeded)
            .cloned())
    }

    async fn update(&self, record: PaymentRecord) -> Result<()> {
        let mut records = self.records.write().await;
        match records.get_mut(&record.intent_id) {
            Some(slot) => {
                *slot = record;
                Ok(())
            }
            None => Err(StoreError::not_found("payment", &record.intent_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::UserId;
    use domain::Money;

    fn pending(order_id: OrderId, intent_id: &str) -> PaymentRecord {
        PaymentRecord::pending(
            order_id,
            UserId::new(),
            intent_id,
            Money::from_cents(4500),
            "usd",
        )
    }

    #[tokio::test]
    async fn insert_then_find_by_intent() {
        let store = InMemoryPaymentStore::new();
        store.insert(pending(OrderId::new(), "pi_0001")).await.unwrap();

        let found = store.find_by_intent("pi_0001").await.unwrap().unwrap();
        assert_eq!(found.intent_id, "pi_0001");
        assert!(store.find_by_intent("pi_9999").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn succeeded_lookup_ignores_pending_records() {
        let store = InMemoryPaymentStore::new();
        let order_id = OrderId::new();

        store.insert(pending(order_id, "pi_0001")).await.unwrap();
        assert!(
            store
                .find_succeeded_for_order(order_id)
                .await
                .unwrap()
                .is_none()
        );

        let mut settled = pending(order_id, "pi_0002");
        settled.status = PaymentStatus::Succeeded;
        store.insert(settled).await.unwrap();

        let found = store
            .find_succeeded_for_order(order_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.intent_id, "pi_0002");
    }

    #[tokio::test]
    async fn update_missing_record_fails() {
        let store = InMemoryPaymentStore::new();
        let result = store.update(pending(OrderId::new(), "pi_0404")).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }
}
