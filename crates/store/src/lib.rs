//! Persistence seams for the storefront core.
//!
//! Each entity gets an async trait plus an in-memory implementation backed by
//! `Arc<tokio::sync::RwLock<_>>`. The traits are the boundary a durable
//! backend would implement; the store offers no multi-document atomicity, so
//! cross-entity sequences are coordinated by the `checkout` crate.
//!
//! The one atomicity guarantee the catalog does provide is the single-product
//! stock delta: `reserve_stock` is a conditional decrement that refuses to go
//! negative, and `release_stock` is its compensating increment.

pub mod carts;
pub mod catalog;
pub mod customers;
pub mod error;
pub mod journal;
pub mod orders;
pub mod payments;

pub use carts::{CartStore, InMemoryCartStore};
pub use catalog::{InMemoryCatalog, Product, ProductCatalog};
pub use customers::{CustomerDirectory, InMemoryCustomerDirectory};
pub use error::{Result, StoreError};
pub use journal::{FulfillmentJournal, FulfillmentPlan, FulfillmentStep, InMemoryJournal};
pub use orders::{InMemoryOrderStore, OrderStore};
pub use payments::{InMemoryPaymentStore, PaymentStore};
