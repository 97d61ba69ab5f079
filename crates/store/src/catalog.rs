//! Product catalog seam with atomic stock primitives.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use domain::{Money, ProductId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::{Result, StoreError};

/// The catalog view of a product that checkout cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    /// Available quantity; never negative.
    pub stock: u32,
}

impl Product {
    /// Creates a new product.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money, stock: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            stock,
        }
    }
}

/// Catalog operations consumed by the checkout core.
///
/// Catalog CRUD is an external collaborator; this trait exposes only lookup
/// and the two atomic stock deltas. Stock is never mutated by read-then-write
/// from the caller's side.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Looks up a product by ID.
    async fn find(&self, product_id: &ProductId) -> Result<Option<Product>>;

    /// Atomically decrements stock, failing without mutation if fewer than
    /// `quantity` units are available.
    async fn reserve_stock(&self, product_id: &ProductId, quantity: u32) -> Result<Product>;

    /// Atomically increments stock (compensating action for a reservation).
    async fn release_stock(&self, product_id: &ProductId, quantity: u32) -> Result<Product>;
}

/// In-memory catalog for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a product.
    pub async fn put(&self, product: Product) {
        self.products
            .write()
            .await
            .insert(product.id.clone(), product);
    }

    /// Returns the current stock of a product, if it exists.
    pub async fn stock_of(&self, product_id: &ProductId) -> Option<u32> {
        self.products
            .read()
            .await
            .get(product_id)
            .map(|p| p.stock)
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog {
    async fn find(&self, product_id: &ProductId) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(product_id).cloned())
    }

    async fn reserve_stock(&self, product_id: &ProductId, quantity: u32) -> Result<Product> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(product_id)
            .ok_or_else(|| StoreError::not_found("product", product_id))?;

        if product.stock < quantity {
            return Err(StoreError::InsufficientStock {
                product_id: product_id.clone(),
                requested: quantity,
                available: product.stock,
            });
        }

        product.stock -= quantity;
        Ok(product.clone())
    }

    async fn release_stock(&self, product_id: &ProductId, quantity: u32) -> Result<Product> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(product_id)
            .ok_or_else(|| StoreError::not_found("product", product_id))?;

        product.stock += quantity;
        Ok(product.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(stock: u32) -> Product {
        Product::new("SKU-001", "Widget", Money::from_cents(1000), stock)
    }

    #[tokio::test]
    async fn reserve_decrements_stock() {
        let catalog = InMemoryCatalog::new();
        catalog.put(widget(5)).await;

        let product = catalog
            .reserve_stock(&ProductId::new("SKU-001"), 2)
            .await
            .unwrap();
        assert_eq!(product.stock, 3);
        assert_eq!(catalog.stock_of(&ProductId::new("SKU-001")).await, Some(3));
    }

    #[tokio::test]
    async fn reserve_refuses_to_go_negative() {
        let catalog = InMemoryCatalog::new();
        catalog.put(widget(1)).await;

        let result = catalog.reserve_stock(&ProductId::new("SKU-001"), 3).await;
        assert!(matches!(
            result,
            Err(StoreError::InsufficientStock {
                requested: 3,
                available: 1,
                ..
            })
        ));
        // no partial decrement
        assert_eq!(catalog.stock_of(&ProductId::new("SKU-001")).await, Some(1));
    }

    #[tokio::test]
    async fn release_increments_stock() {
        let catalog = InMemoryCatalog::new();
        catalog.put(widget(0)).await;

        let product = catalog
            .release_stock(&ProductId::new("SKU-001"), 4)
            .await
            .unwrap();
        assert_eq!(product.stock, 4);
    }

    #[tokio::test]
    async fn reserve_unknown_product_is_not_found() {
        let catalog = InMemoryCatalog::new();
        let result = catalog.reserve_stock(&ProductId::new("SKU-404"), 1).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }
}
