//! Payment coordinator: intent creation, webhook reconciliation, refunds.

use common::{OrderId, UserId};
use domain::{Money, Order, OrderStatus, PaymentRecord, PaymentStatus};
use serde::Serialize;
use store::{OrderStore, PaymentStore, ProductCatalog};

use crate::CURRENCY;
use crate::error::{CheckoutError, Result};
use crate::gateway::{EVENT_PAYMENT_SUCCEEDED, IntentMetadata, PaymentGateway};

/// What a client needs to complete payment for an order out-of-band.
#[derive(Debug, Clone, Serialize)]
pub struct IntentCredentials {
    pub client_secret: String,
    pub amount: Money,
    pub currency: String,
}

/// Acknowledgement returned to the gateway after webhook ingestion.
///
/// An acknowledged event is never redelivered, so `received: true` is only
/// returned once local state is consistent with the event (or the event is
/// one this system deliberately ignores).
#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

/// Outcome of a completed refund.
#[derive(Debug, Clone, Serialize)]
pub struct RefundResult {
    pub order_id: OrderId,
    pub refund_id: String,
}

/// Coordinates payment state between the gateway and local stores.
///
/// The gateway client is injected, never constructed here, so the coordinator
/// is testable against a stub and the real client stays swappable.
pub struct PaymentCoordinator<O, P, C, G>
where
    O: OrderStore,
    P: PaymentStore,
    C: ProductCatalog,
    G: PaymentGateway,
{
    orders: O,
    payments: P,
    catalog: C,
    gateway: G,
}

impl<O, P, C, G> PaymentCoordinator<O, P, C, G>
where
    O: OrderStore,
    P: PaymentStore,
    C: ProductCatalog,
    G: PaymentGateway,
{
    /// Creates a coordinator over the given stores and gateway client.
    pub fn new(orders: O, payments: P, catalog: C, gateway: G) -> Self {
        Self {
            orders,
            payments,
            catalog,
            gateway,
        }
    }

    /// Creates a payment intent for an order and records it as pending.
    ///
    /// The amount always comes from the persisted order total, never from the
    /// caller. The record is inserted only after the gateway accepts the
    /// intent, so a gateway rejection leaves no local trace.
    #[tracing::instrument(skip(self))]
    pub async fn create_intent(
        &self,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<IntentCredentials> {
        let order = self.load_owned_order(order_id, user_id).await?;

        let metadata = IntentMetadata {
            order_id: Some(order_id),
            user_id: Some(user_id),
        };
        let intent = self
            .gateway
            .create_intent(order.total_amount().cents(), CURRENCY, metadata)
            .await?;

        self.payments
            .insert(PaymentRecord::pending(
                order_id,
                user_id,
                &intent.id,
                order.total_amount(),
                CURRENCY,
            ))
            .await?;

        metrics::counter!("payment_intents_created_total").increment(1);
        tracing::info!(order_id = %order_id, intent_id = %intent.id, "payment intent created");

        Ok(IntentCredentials {
            client_secret: intent.client_secret,
            amount: order.total_amount(),
            currency: CURRENCY.to_string(),
        })
    }

    /// Ingests a gateway webhook event and reconciles local state.
    ///
    /// Verification comes first: an unverifiable payload is rejected before
    /// any of its content is read. Redelivery of a settlement event for an
    /// already-paid order is acknowledged without touching anything, which is
    /// what makes at-least-once delivery safe.
    #[tracing::instrument(skip(self, signature, raw_payload))]
    pub async fn handle_webhook(&self, signature: &str, raw_payload: &[u8]) -> Result<WebhookAck> {
        let event = self.gateway.verify_and_parse_event(signature, raw_payload)?;

        if event.kind != EVENT_PAYMENT_SUCCEEDED {
            tracing::debug!(kind = %event.kind, "ignoring unhandled gateway event");
            return Ok(WebhookAck { received: true });
        }

        let Some(order_id) = event.metadata.order_id else {
            tracing::warn!(
                intent_id = %event.intent_id,
                "settlement event carries no order reference, acknowledging"
            );
            return Ok(WebhookAck { received: true });
        };

        // A verified settlement for an order we do not know is a real
        // inconsistency; fail loudly so the gateway redelivers.
        let mut order = self
            .orders
            .find(order_id)
            .await?
            .ok_or(CheckoutError::OrderNotFound(order_id))?;

        if order.status() == OrderStatus::Paid {
            tracing::info!(order_id = %order_id, "order already paid, redelivery ignored");
            return Ok(WebhookAck { received: true });
        }

        // Transition legality gates everything that follows: a settlement
        // arriving after a cancellation must not leave a succeeded payment
        // against a cancelled order.
        order.mark_paid("payment confirmed via gateway webhook")?;

        match self.payments.find_by_intent(&event.intent_id).await? {
            Some(mut record) => {
                record.status = PaymentStatus::Succeeded;
                self.payments.update(record).await?;
            }
            None => {
                tracing::warn!(
                    order_id = %order_id,
                    intent_id = %event.intent_id,
                    "no payment record for settled intent, marking order paid anyway"
                );
            }
        }

        self.orders.update(order).await?;

        metrics::counter!("payments_settled_total").increment(1);
        tracing::info!(order_id = %order_id, intent_id = %event.intent_id, "order marked paid");

        Ok(WebhookAck { received: true })
    }

    /// Refunds a paid order: gateway refund, then payment record, order
    /// status and stock.
    ///
    /// The gateway call goes first; if it fails nothing local changes, so a
    /// retry starts from a clean slate. After a completed refund the order's
    /// succeeded record is gone, which is what makes a second refund attempt
    /// fail with not-found rather than double-refunding.
    #[tracing::instrument(skip(self, reason))]
    pub async fn process_refund(
        &self,
        order_id: OrderId,
        user_id: UserId,
        reason: Option<String>,
    ) -> Result<RefundResult> {
        let mut order = self.load_owned_order(order_id, user_id).await?;

        let mut record = self
            .payments
            .find_succeeded_for_order(order_id)
            .await?
            .ok_or(CheckoutError::PaymentNotFound(order_id))?;

        let reason = reason.unwrap_or_else(|| "requested_by_customer".to_string());
        let refund = self.gateway.create_refund(&record.intent_id, &reason).await?;

        record.status = PaymentStatus::Refunded;
        record.refund_id = Some(refund.id.clone());
        self.payments.update(record).await?;

        order.cancel_via_refund("payment refunded")?;
        self.orders.update(order.clone()).await?;

        for item in order.items() {
            self.catalog
                .release_stock(&item.product_id, item.quantity)
                .await?;
        }

        metrics::counter!("payments_refunded_total").increment(1);
        tracing::info!(order_id = %order_id, refund_id = %refund.id, "order refunded");

        Ok(RefundResult {
            order_id,
            refund_id: refund.id,
        })
    }

    async fn load_owned_order(&self, order_id: OrderId, user_id: UserId) -> Result<Order> {
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
}
