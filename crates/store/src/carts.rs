//! Cart persistence seam.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use domain::Cart;
use tokio::sync::RwLock;

use crate::error::Result;

/// Persistence for per-user carts.
///
/// Carts are keyed by user (one cart per user) and upserted whole; they are
/// never deleted, only emptied.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Returns the user's cart, if one has been created.
    async fn find(&self, user_id: UserId) -> Result<Option<Cart>>;

    /// Inserts or replaces the user's cart.
    async fn put(&self, cart: Cart) -> Result<()>;
}

/// In-memory cart store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<RwLock<HashMap<UserId, Cart>>>,
}

impl InMemoryCartStore {
    /// Creates an empty cart store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn find(&self, user_id: UserId) -> Result<Option<Cart>> {
        Ok(self.carts.read().await.get(&user_id).cloned())
    }

    async fn put(&self, cart: Cart) -> Result<()> {
        self.carts.write().await.insert(cart.user_id(), cart);
        Ok(())
    }
}
