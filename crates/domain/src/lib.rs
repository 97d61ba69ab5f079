//! Domain model for the storefront core.
//!
//! This crate holds the entities that move together during checkout and
//! payment reconciliation:
//! - `Cart` — mutable per-user basket with prices captured at add time
//! - `Order` — immutable item snapshot plus a status state machine and an
//!   append-only status history
//! - `PaymentRecord` — the link between a gateway payment intent and an order
//!
//! Nothing here performs I/O; stores and services live in sibling crates.

pub mod cart;
pub mod error;
pub mod order;
pub mod payment;
pub mod value_objects;

pub use cart::{Cart, CartItem};
pub use error::DomainError;
pub use order::{Order, OrderItem, OrderStatus, StatusEntry};
pub use payment::{PaymentRecord, PaymentStatus};
pub use value_objects::{Address, Money, ProductId};
