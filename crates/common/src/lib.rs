//! Shared identifier types used across the storefront workspace.

mod types;

pub use types::{OrderId, UserId};
