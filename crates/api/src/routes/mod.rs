//! Route handlers and shared application state.

pub mod cart;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod payments;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use checkout::{CartService, OrderOrchestrator, PaymentCoordinator, PaymentGateway};
use common::UserId;
use store::{
    InMemoryCartStore, InMemoryCatalog, InMemoryCustomerDirectory, InMemoryJournal,
    InMemoryOrderStore, InMemoryPaymentStore,
};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
///
/// Stores are concrete in-memory implementations; the gateway stays generic
/// so the real client can be swapped in without touching the handlers.
pub struct AppState<G: PaymentGateway> {
    pub cart_service: CartService<InMemoryCartStore, InMemoryCatalog>,
    pub orchestrator: OrderOrchestrator<
        InMemoryOrderStore,
        InMemoryCartStore,
        InMemoryCatalog,
        InMemoryCustomerDirectory,
        InMemoryJournal,
    >,
    pub coordinator:
        PaymentCoordinator<InMemoryOrderStore, InMemoryPaymentStore, InMemoryCatalog, G>,
}

/// The authenticated caller, taken from the trusted `x-user-id` header.
///
/// Identity is established upstream; this extractor only parses the header.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::BadRequest("missing x-user-id header".to_string()))?;

        let uuid = uuid::Uuid::parse_str(value)
            .map_err(|e| ApiError::BadRequest(format!("invalid x-user-id: {e}")))?;

        Ok(Self(UserId::from_uuid(uuid)))
    }
}
