//! Checkout error taxonomy.

use common::OrderId;
use domain::{DomainError, ProductId};
use store::StoreError;
use thiserror::Error;

/// Coarse classification the boundary layer maps onto status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Order, payment or product absent.
    NotFound,
    /// Empty cart, insufficient stock, illegal transition, gateway rejection.
    BusinessLogic,
    /// Order accessed by a non-owner.
    Forbidden,
    /// Webhook signature verification failed.
    Unverified,
}

/// Errors raised by the checkout and payment reconciliation core.
///
/// Every failure is raised at the point of detection and surfaced unmodified
/// to the boundary; nothing here is swallowed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Checkout requested with no items in the cart.
    #[error("cart is empty")]
    EmptyCart,

    /// A line item asks for more units than the catalog has.
    #[error("insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        requested: u32,
        available: u32,
    },

    /// No shipping address supplied and none on the customer's profile.
    #[error("no shipping address supplied and no default address on file")]
    MissingShippingAddress,

    /// The referenced order does not exist.
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),

    /// No succeeded payment exists for the order.
    #[error("no successful payment found for order {0}")]
    PaymentNotFound(OrderId),

    /// A cart line references a product that no longer exists.
    #[error("product not found: {0}")]
    ProductNotFound(ProductId),

    /// The order belongs to a different user.
    #[error("order {0} does not belong to the requesting user")]
    Forbidden(OrderId),

    /// The webhook payload could not be authenticated.
    ///
    /// Gateway-internal details are deliberately not carried here; the
    /// caller only learns that verification failed.
    #[error("webhook signature verification failed")]
    UnverifiedWebhook,

    /// The gateway rejected an intent or refund request.
    #[error("payment gateway error: {0}")]
    Gateway(String),

    /// Domain-level failure (illegal transition, invalid item data).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Persistence failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CheckoutError {
    /// Returns the taxonomy bucket for this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CheckoutError::OrderNotFound(_)
            | CheckoutError::PaymentNotFound(_)
            | CheckoutError::ProductNotFound(_)
            | CheckoutError::Store(StoreError::NotFound { .. }) => ErrorKind::NotFound,
            CheckoutError::Forbidden(_) => ErrorKind::Forbidden,
            CheckoutError::UnverifiedWebhook => ErrorKind::Unverified,
            CheckoutError::EmptyCart
            | CheckoutError::InsufficientStock { .. }
            | CheckoutError::MissingShippingAddress
            | CheckoutError::Gateway(_)
            | CheckoutError::Domain(_)
            | CheckoutError::Store(_) => ErrorKind::BusinessLogic,
        }
    }
}

impl From<crate::gateway::GatewayError> for CheckoutError {
    fn from(e: crate::gateway::GatewayError) -> Self {
        match e {
            crate::gateway::GatewayError::InvalidSignature => CheckoutError::UnverifiedWebhook,
            other => CheckoutError::Gateway(other.to_string()),
        }
    }
}

/// Convenience alias for checkout results.
pub type Result<T> = std::result::Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_taxonomy() {
        assert_eq!(
            CheckoutError::OrderNotFound(OrderId::new()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(CheckoutError::EmptyCart.kind(), ErrorKind::BusinessLogic);
        assert_eq!(
            CheckoutError::Forbidden(OrderId::new()).kind(),
            ErrorKind::Forbidden
        );
        assert_eq!(CheckoutError::UnverifiedWebhook.kind(), ErrorKind::Unverified);
        assert_eq!(
            CheckoutError::Gateway("declined".into()).kind(),
            ErrorKind::BusinessLogic
        );
    }

    #[test]
    fn store_not_found_maps_to_not_found() {
        let err = CheckoutError::Store(StoreError::not_found("order", "abc"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn illegal_transition_is_business_logic() {
        let err = CheckoutError::Domain(DomainError::IllegalTransition {
            current: domain::OrderStatus::Paid,
            attempted: domain::OrderStatus::Cancelled,
        });
        assert_eq!(err.kind(), ErrorKind::BusinessLogic);
    }
}
