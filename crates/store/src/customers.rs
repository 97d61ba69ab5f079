//! Customer profile seam.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::UserId;
use domain::Address;
use tokio::sync::RwLock;

use crate::error::Result;

/// Customer profile lookups consumed by checkout.
///
/// Profile management is an external collaborator; checkout only needs the
/// default shipping address fallback.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Returns the user's default shipping address, if one is on file.
    async fn default_address(&self, user_id: UserId) -> Result<Option<Address>>;
}

/// In-memory customer directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustomerDirectory {
    addresses: Arc<RwLock<HashMap<UserId, Address>>>,
}

impl InMemoryCustomerDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a user's default shipping address.
    pub async fn set_default_address(&self, user_id: UserId, address: Address) {
        self.addresses.write().await.insert(user_id, address);
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryCustomerDirectory {
    async fn default_address(&self, user_id: UserId) -> Result<Option<Address>> {
        Ok(self.addresses.read().await.get(&user_id).cloned())
    }
}
