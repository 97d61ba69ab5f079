//! Order orchestrator: the checkout transaction boundary.

use common::{OrderId, UserId};
use domain::{Address, Order, OrderItem};
use store::{
    CartStore, CustomerDirectory, FulfillmentJournal, FulfillmentPlan, FulfillmentStep,
    OrderStore, ProductCatalog,
};

use crate::error::{CheckoutError, Result};

/// Builds orders from carts and keeps stock and cart state consistent with
/// them.
///
/// The store offers no multi-document atomicity, so checkout runs as a
/// journaled sequence: validate, persist the order (durability checkpoint),
/// record the owed side effects, then execute them. A failure after the
/// checkpoint leaves the order valid and the journal incomplete; `reconcile`
/// replays what is owed. The persisted order, not the live stock counters,
/// is the source of truth for how much stock is owed.
pub struct OrderOrchestrator<O, C, P, D, J>
where
    O: OrderStore,
    C: CartStore,
    P: ProductCatalog,
    D: CustomerDirectory,
    J: FulfillmentJournal,
{
    orders: O,
    carts: C,
    catalog: P,
    customers: D,
    journal: J,
}

impl<O, C, P, D, J> OrderOrchestrator<O, C, P, D, J>
where
    O: OrderStore,
    C: CartStore,
    P: ProductCatalog,
    D: CustomerDirectory,
    J: FulfillmentJournal,
{
    /// Creates a new orchestrator over the given stores.
    pub fn new(orders: O, carts: C, catalog: P, customers: D, journal: J) -> Self {
        Self {
            orders,
            carts,
            catalog,
            customers,
            journal,
        }
    }

    /// Turns the user's cart into a persisted pending order.
    ///
    /// Validation is fail-fast: every line must satisfy `quantity <= current
    /// stock` before anything is written. Item names and prices are
    /// snapshotted from the *current* catalog values, not the prices captured
    /// at cart-add time. When no shipping address is supplied the customer's
    /// profile default is used.
    #[tracing::instrument(skip(self, shipping))]
    pub async fn create_order(
        &self,
        user_id: UserId,
        shipping: Option<Address>,
    ) -> Result<Order> {
        metrics::counter!("checkout_attempts_total").increment(1);
        let started = std::time::Instant::now();

        let cart = self
            .carts
            .find(user_id)
            .await?
            .filter(|c| !c.is_empty())
            .ok_or(CheckoutError::EmptyCart)?;

        let shipping = match shipping {
            Some(address) => address,
            None => self
                .customers
                .default_address(user_id)
                .await?
                .ok_or(CheckoutError::MissingShippingAddress)?,
        };

        // Resolve every line to the current product and validate stock before
        // any side effect.
        let mut items = Vec::with_capacity(cart.items().len());
        for line in cart.items() {
            let product = self
                .catalog
                .find(&line.product_id)
                .await?
                .ok_or_else(|| CheckoutError::ProductNotFound(line.product_id.clone()))?;

            if product.stock < line.quantity {
                return Err(CheckoutError::InsufficientStock {
                    product_id: line.product_id.clone(),
                    name: product.name,
                    requested: line.quantity,
                    available: product.stock,
                });
            }

            items.push(OrderItem::new(
                product.id,
                product.name,
                product.price,
                line.quantity,
            ));
        }

        let order = Order::new(user_id, items, shipping)?;

        // Durability checkpoint: once the order exists, the remaining side
        // effects may lag but must never be dropped.
        self.orders.insert(order.clone()).await?;

        let mut steps: Vec<FulfillmentStep> = order
            .items()
            .iter()
            .map(|item| FulfillmentStep::DecrementStock {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
            })
            .collect();
        steps.push(FulfillmentStep::ClearCart { user_id });

        self.journal
            .record(FulfillmentPlan::new(order.id(), steps.clone()))
            .await?;

        for step in &steps {
            if let Err(e) = self.run_step(order.id(), step).await {
                tracing::warn!(
                    order_id = %order.id(),
                    error = %e,
                    ?step,
                    "fulfillment step failed, left pending for reconciliation"
                );
            }
        }

        metrics::counter!("checkout_orders_created_total").increment(1);
        metrics::histogram!("checkout_duration_seconds").record(started.elapsed().as_secs_f64());
        tracing::info!(order_id = %order.id(), total = %order.total_amount(), "order created");

        Ok(order)
    }

    /// Replays every pending fulfillment step, exactly once per step.
    ///
    /// Returns the number of steps replayed successfully. Steps that fail
    /// again stay pending for the next pass.
    #[tracing::instrument(skip(self))]
    pub async fn reconcile(&self) -> Result<usize> {
        let mut replayed = 0;

        for plan in self.journal.incomplete().await? {
            for step in plan.pending_steps() {
                match self.run_step(plan.order_id(), &step).await {
                    Ok(true) => replayed += 1,
                    // claimed by a concurrent pass between the read and here
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(
                            order_id = %plan.order_id(),
                            error = %e,
                            ?step,
                            "reconciliation step failed, still pending"
                        );
                    }
                }
            }
        }

        if replayed > 0 {
            metrics::counter!("checkout_steps_reconciled_total").increment(replayed as u64);
        }
        Ok(replayed)
    }

    /// Loads an order, enforcing ownership.
    pub async fn get_order(&self, order_id: OrderId, user_id: UserId) -> Result<Order> {
        let order = self
            .orders
            .find(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))?;

        if !order.is_owned_by(user_id) {
            return Err(CheckoutError::Forbidden(order_id));
        }
        Ok(order)
    }

    /// Returns the user's orders, oldest first.
    pub async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        Ok(self.orders.find_by_user(user_id).await?)
    }

    /// Cancels a pending order and restores its stock.
    ///
    /// Only legal from `pending`; a paid order must go through the refund
    /// path. Stock is released only for decrements that actually ran, and
    /// the remaining journal steps are settled so reconciliation never
    /// replays side effects for a cancelled order.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId, user_id: UserId) -> Result<Order> {
        let mut order = self.get_order(order_id, user_id).await?;

        order.cancel("cancelled by customer")?;
        self.orders.update(order.clone()).await?;

        let pending = match self.journal.find(order_id).await? {
            Some(plan) => plan.pending_steps(),
            None => Vec::new(),
        };

        for item in order.items() {
            let decrement = FulfillmentStep::DecrementStock {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
            };
            if pending.contains(&decrement) {
                // The decrement never ran, nothing to give back; claiming it
                // keeps reconciliation from running it later.
                self.journal.claim(order_id, &decrement).await?;
                continue;
            }
            self.catalog
                .release_stock(&item.product_id, item.quantity)
                .await?;
        }

        // Settle any remaining pending step (cart clear) as well.
        if let Some(plan) = self.journal.find(order_id).await? {
            for step in plan.pending_steps() {
                self.journal.claim(order_id, &step).await?;
            }
        }

        metrics::counter!("checkout_orders_cancelled_total").increment(1);
        tracing::info!(order_id = %order_id, "order cancelled, stock restored");
        Ok(order)
    }

    /// Claims and executes one fulfillment step.
    ///
    /// The claim flips the step to done under the journal lock *before* the
    /// side effect runs, so a concurrent pass that observed the same step as
    /// pending skips it (returns `Ok(false)`). A failed side effect reopens
    /// the step for the next pass.
    async fn run_step(&self, order_id: OrderId, step: &FulfillmentStep) -> Result<bool> {
        if !self.journal.claim(order_id, step).await? {
            return Ok(false);
        }

        let outcome = match step {
            FulfillmentStep::DecrementStock {
                product_id,
                quantity,
            } => self
                .catalog
                .reserve_stock(product_id, *quantity)
                .await
                .map(|_| ()),
            FulfillmentStep::ClearCart { user_id } => match self.carts.find(*user_id).await {
                Ok(Some(mut cart)) => {
                    cart.clear();
                    self.carts.put(cart).await
                }
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            },
        };

        if let Err(e) = outcome {
            self.journal.reopen(order_id, step).await?;
            return Err(e.into());
        }
        Ok(true)
    }
}
