//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::{CheckoutError, ErrorKind};
use domain::DomainError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client (malformed ID, missing header).
    BadRequest(String),
    /// Failure raised by the checkout core.
    Checkout(CheckoutError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    let status = match &err {
        // Illegal state transitions get 409 so clients can distinguish a
        // conflict from ordinary validation failure.
        CheckoutError::Domain(DomainError::IllegalTransition { .. }) => StatusCode::CONFLICT,
        CheckoutError::Store(StoreError::Backend(msg)) => {
            tracing::error!(error = %msg, "store backend failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        _ => match err.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Unverified | ErrorKind::BusinessLogic => StatusCode::BAD_REQUEST,
        },
    };
    (status, err.to_string())
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::OrderId;
    use domain::OrderStatus;

    fn status_of(err: CheckoutError) -> StatusCode {
        checkout_error_to_response(err).0
    }

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(
            status_of(CheckoutError::OrderNotFound(OrderId::new())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(CheckoutError::Forbidden(OrderId::new())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(CheckoutError::UnverifiedWebhook),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(CheckoutError::EmptyCart), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn illegal_transition_is_conflict() {
        let err = CheckoutError::Domain(DomainError::IllegalTransition {
            current: OrderStatus::Paid,
            attempted: OrderStatus::Cancelled,
        });
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn backend_failure_is_internal() {
        let err = CheckoutError::Store(StoreError::Backend("connection reset".to_string()));
        assert_eq!(status_of(err), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
