//! Order entity, item snapshot and status state machine.

mod model;
mod status;

pub use model::{Order, OrderItem, StatusEntry};
pub use status::OrderStatus;
