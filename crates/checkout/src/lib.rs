//! Order fulfillment and payment reconciliation core.
//!
//! This crate owns the only place in the system where several entities must
//! move together without a multi-document transaction:
//!
//! 1. `CartService` maintains the per-user basket.
//! 2. `OrderOrchestrator` turns a cart into a persisted pending order,
//!    journals the owed side effects (stock decrements, cart clear), then
//!    executes them; `reconcile` replays anything a crash left behind.
//! 3. `PaymentCoordinator` creates payment intents against the injected
//!    `PaymentGateway` and reconciles asynchronous gateway events (payment
//!    succeeded, refunds) back into order, payment and stock state.
//!
//! Legal order-status transitions are enforced by the `domain` state machine;
//! idempotency, not ordering, makes webhook redelivery safe.

pub mod cart;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod orchestrator;

pub use cart::CartService;
pub use coordinator::{IntentCredentials, PaymentCoordinator, RefundResult, WebhookAck};
pub use error::{CheckoutError, ErrorKind};
pub use gateway::{
    EVENT_PAYMENT_SUCCEEDED, GatewayError, GatewayEvent, GatewayIntent, GatewayRefund,
    InMemoryPaymentGateway, IntentMetadata, PaymentGateway,
};
pub use orchestrator::OrderOrchestrator;

/// Settlement currency used for all intents.
pub const CURRENCY: &str = "usd";
