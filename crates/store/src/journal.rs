//! Fulfillment journal: persisted intent-to-act for the checkout sequence.
//!
//! The store offers no multi-document atomicity, so once an order is
//! persisted the orchestrator writes the remaining side effects (stock
//! decrements, cart clear) here *before* executing them. A crash between
//! checkpoint and side effects leaves an incomplete plan that a
//! reconciliation pass can replay exactly once — each step is keyed by
//! order + step and must be claimed under the journal lock before it runs,
//! so two concurrent passes cannot both execute the same step.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, UserId};
use domain::ProductId;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};

/// One side effect owed after the order durability checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FulfillmentStep {
    /// Decrement stock for one snapshotted line item.
    DecrementStock { product_id: ProductId, quantity: u32 },

    /// Empty the user's cart.
    ClearCart { user_id: UserId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PlannedStep {
    step: FulfillmentStep,
    done: bool,
}

/// The recorded side-effect plan for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FulfillmentPlan {
    order_id: OrderId,
    steps: Vec<PlannedStep>,
}

impl FulfillmentPlan {
    /// Creates a plan with all steps pending.
    pub fn new(order_id: OrderId, steps: Vec<FulfillmentStep>) -> Self {
        Self {
            order_id,
            steps: steps
                .into_iter()
                .map(|step| PlannedStep { step, done: false })
                .collect(),
        }
    }

    /// Returns the order this plan belongs to.
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Returns the steps not yet executed.
    pub fn pending_steps(&self) -> Vec<FulfillmentStep> {
        self.steps
            .iter()
            .filter(|s| !s.done)
            .map(|s| s.step.clone())
            .collect()
    }

    /// Returns true if every step has been executed.
    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|s| s.done)
    }

    fn claim(&mut self, step: &FulfillmentStep) -> Option<bool> {
        let slot = self.steps.iter_mut().find(|s| &s.step == step)?;
        if slot.done {
            Some(false)
        } else {
            slot.done = true;
            Some(true)
        }
    }

    fn reopen(&mut self, step: &FulfillmentStep) -> bool {
        match self.steps.iter_mut().find(|s| &s.step == step) {
            Some(slot) => {
                slot.done = false;
                true
            }
            None => false,
        }
    }
}

/// Persistence for fulfillment plans.
#[async_trait]
pub trait FulfillmentJournal: Send + Sync {
    /// Records a plan before any of its steps run.
    async fn record(&self, plan: FulfillmentPlan) -> Result<()>;

    /// Atomically claims one pending step, flipping it to done.
    ///
    /// Returns false if the step was already claimed; the caller must skip
    /// the side effect in that case.
    async fn claim(&self, order_id: OrderId, step: &FulfillmentStep) -> Result<bool>;

    /// Returns a claimed step to pending after its side effect failed.
    async fn reopen(&self, order_id: OrderId, step: &FulfillmentStep) -> Result<()>;

    /// Returns the plan for an order, if recorded.
    async fn find(&self, order_id: OrderId) -> Result<Option<FulfillmentPlan>>;

    /// Returns all plans with at least one pending step.
    async fn incomplete(&self) -> Result<Vec<FulfillmentPlan>>;
}

/// In-memory journal.
#[derive(Debug, Clone, Default)]
pub struct InMemoryJournal {
    plans: Arc<RwLock<HashMap<OrderId, FulfillmentPlan>>>,
}

impl InMemoryJournal {
    /// Creates an empty journal.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FulfillmentJournal for InMemoryJournal {
    async fn record(&self, plan: FulfillmentPlan) -> Result<()> {
        self.plans.write().await.insert(plan.order_id(), plan);
        Ok(())
    }

    async fn claim(&self, order_id: OrderId, step: &FulfillmentStep) -> Result<bool> {
        let mut plans = self.plans.write().await;
        let plan = plans
            .get_mut(&order_id)
            .ok_or_else(|| StoreError::not_found("fulfillment plan", order_id))?;

        plan.claim(step)
            .ok_or_else(|| StoreError::not_found("fulfillment step", order_id))
    }

    async fn reopen(&self, order_id: OrderId, step: &FulfillmentStep) -> Result<()> {
        let mut plans = self.plans.write().await;
        let plan = plans
            .get_mut(&order_id)
            .ok_or_else(|| StoreError::not_found("fulfillment plan", order_id))?;

        if !plan.reopen(step) {
            return Err(StoreError::not_found("fulfillment step", order_id));
        }
        Ok(())
    }

    async fn find(&self, order_id: OrderId) -> Result<Option<FulfillmentPlan>> {
        Ok(self.plans.read().await.get(&order_id).cloned())
    }

    async fn incomplete(&self) -> Result<Vec<FulfillmentPlan>> {
        Ok(self
            .plans
            .read()
            .await
            .values()
            .filter(|p| !p.is_complete())
            .cloned()
            .collect())
    }
}
