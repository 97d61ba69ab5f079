//! Cart endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use checkout::PaymentGateway;
use domain::{Cart, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::{AppState, AuthenticatedUser};

// -- Request types --

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

// -- Response types --

#[derive(Serialize)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub total_cents: i64,
}

#[derive(Serialize)]
pub struct CartItemResponse {
    pub product_id: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            items: cart
                .items()
                .iter()
                .map(|item| CartItemResponse {
                    product_id: item.product_id.to_string(),
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price.cents(),
                })
                .collect(),
            total_cents: cart.total_amount().cents(),
        }
    }
}

// -- Handlers --

/// GET /cart — the caller's cart, created lazily.
#[tracing::instrument(skip(state))]
pub async fn get<G: PaymentGateway>(
    State(state): State<Arc<AppState<G>>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state.cart_service.get_cart(user_id).await?;
    Ok(Json(CartResponse::from(&cart)))
}

/// POST /cart/items — add a quantity of a product to the cart.
#[tracing::instrument(skip(state, req))]
pub async fn add_item<G: PaymentGateway>(
    State(state): State<Arc<AppState<G>>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state
        .cart_service
        .add_item(user_id, ProductId::new(req.product_id), req.quantity)
        .await?;
    Ok(Json(CartResponse::from(&cart)))
}

/// DELETE /cart/items/:product_id — drop a product line from the cart.
#[tracing::instrument(skip(state))]
pub async fn remove_item<G: PaymentGateway>(
    State(state): State<Arc<AppState<G>>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(product_id): Path<String>,
) -> Result<Json<CartResponse>, ApiError> {
    let cart = state
        .cart_service
        .remove_item(user_id, &ProductId::new(product_id))
        .await?;
    Ok(Json(CartResponse::from(&cart)))
}

/// DELETE /cart — empty the cart.
#[tracing::instrument(skip(state))]
pub async fn clear<G: PaymentGateway>(
    State(state): State<Arc<AppState<G>>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<axum::http::StatusCode, ApiError> {
    state.cart_service.clear(user_id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}
