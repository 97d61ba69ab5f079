//! Cart service: basket mutation with stock-aware validation.

use common::UserId;
use domain::{Cart, DomainError, ProductId};
use store::{CartStore, ProductCatalog};

use crate::error::{CheckoutError, Result};

/// Maintains per-user carts against the catalog.
///
/// Carts are created lazily on first access and never deleted; removing from
/// an empty cart is a quiet no-op.
pub struct CartService<C, P>
where
    C: CartStore,
    P: ProductCatalog,
{
    carts: C,
    catalog: P,
}

impl<C, P> CartService<C, P>
where
    C: CartStore,
    P: ProductCatalog,
{
    /// Creates a new cart service.
    pub fn new(carts: C, catalog: P) -> Self {
        Self { carts, catalog }
    }

    /// Returns the user's cart, creating an empty one on first access.
    pub async fn get_cart(&self, user_id: UserId) -> Result<Cart> {
        match self.carts.find(user_id).await? {
            Some(cart) => Ok(cart),
            None => {
                let cart = Cart::new(user_id);
                self.carts.put(cart.clone()).await?;
                Ok(cart)
            }
        }
    }

    /// Adds a quantity of a product to the cart.
    ///
    /// The check is against the *total* desired quantity — what is already in
    /// the cart plus the increment — not just the increment. The current
    /// catalog price is captured on the line.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart> {
        if quantity == 0 {
            return Err(DomainError::InvalidQuantity { quantity }.into());
        }

        let product = self
            .catalog
            .find(&product_id)
            .await?
            .ok_or_else(|| CheckoutError::ProductNotFound(product_id.clone()))?;

        let mut cart = self
            .carts
            .find(user_id)
            .await?
            .unwrap_or_else(|| Cart::new(user_id));

        // Saturate so an absurd quantity sum fails the stock check instead
        // of wrapping past it.
        let desired = cart.quantity_of(&product_id).saturating_add(quantity);
        if product.stock < desired {
            return Err(CheckoutError::InsufficientStock {
                product_id,
                name: product.name,
                requested: desired,
                available: product.stock,
            });
        }

        cart.add_item(product_id, quantity, product.price);
        self.carts.put(cart.clone()).await?;
        Ok(cart)
    }

    /// Removes a product line from the cart. Quietly succeeds if the cart or
    /// the line does not exist.
    pub async fn remove_item(&self, user_id: UserId, product_id: &ProductId) -> Result<Cart> {
        let Some(mut cart) = self.carts.find(user_id).await? else {
            return Ok(Cart::new(user_id));
        };

        cart.remove_item(product_id);
        self.carts.put(cart.clone()).await?;
        Ok(cart)
    }

    /// Empties the cart. Quietly succeeds if no cart exists yet.
    pub async fn clear(&self, user_id: UserId) -> Result<()> {
        if let Some(mut cart) = self.carts.find(user_id).await? {
            cart.clear();
            self.carts.put(cart).await?;
        }
        Ok(())
    }
}
