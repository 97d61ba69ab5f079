//! Domain error types.

use thiserror::Error;

use crate::order::OrderStatus;

/// Errors raised by domain entities themselves.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The requested status change is not a legal lifecycle transition.
    #[error("illegal order status transition: {current} -> {attempted}")]
    IllegalTransition {
        current: OrderStatus,
        attempted: OrderStatus,
    },

    /// An order cannot be created without items.
    #[error("order must contain at least one item")]
    NoItems,

    /// Line item quantity must be at least 1.
    #[error("invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },
}
