//! Checkout and order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use checkout::PaymentGateway;
use common::OrderId;
use domain::{Address, Order};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::{AppState, AuthenticatedUser};

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    /// Shipping destination; falls back to the profile default when omitted.
    pub shipping_address: Option<AddressPayload>,
}

#[derive(Serialize, Deserialize)]
pub struct AddressPayload {
    pub line1: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl From<AddressPayload> for Address {
    fn from(payload: AddressPayload) -> Self {
        Address::new(
            payload.line1,
            payload.city,
            payload.postal_code,
            payload.country,
        )
    }
}

impl From<&Address> for AddressPayload {
    fn from(address: &Address) -> Self {
        AddressPayload {
            line1: address.line1.clone(),
            city: address.city.clone(),
            postal_code: address.postal_code.clone(),
            country: address.country.clone(),
        }
    }
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub status: String,
    pub items: Vec<OrderItemResponse>,
    pub total_cents: i64,
    pub shipping_address: AddressPayload,
    pub status_history: Vec<StatusEntryResponse>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

#[derive(Serialize)]
pub struct StatusEntryResponse {
    pub status: String,
    pub comment: String,
    pub at: String,
}

#[derive(Serialize)]
pub struct ReconcileResponse {
    pub replayed_steps: usize,
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        OrderResponse {
            id: order.id().to_string(),
            status: order.status().to_string(),
            items: order
                .items()
                .iter()
                .map(|item| OrderItemResponse {
                    product_id: item.product_id.to_string(),
                    name: item.name.clone(),
                    quantity: item.quantity,
                    unit_price_cents: item.unit_price.cents(),
                })
                .collect(),
            total_cents: order.total_amount().cents(),
            shipping_address: AddressPayload::from(order.shipping_address()),
            status_history: order
                .status_history()
                .iter()
                .map(|entry| StatusEntryResponse {
                    status: entry.status.to_string(),
                    comment: entry.comment.clone(),
                    at: entry.at.to_rfc3339(),
                })
                .collect(),
        }
    }
}

// -- Handlers --

/// POST /orders — check out the caller's cart into a new order.
#[tracing::instrument(skip(state, req))]
pub async fn create<G: PaymentGateway>(
    State(state): State<Arc<AppState<G>>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<OrderResponse>), ApiError> {
    let order = state
        .orchestrator
        .create_order(user_id, req.shipping_address.map(Address::from))
        .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(OrderResponse::from(&order)),
    ))
}

/// GET /orders — the caller's orders, oldest first.
#[tracing::instrument(skip(state))]
pub async fn list<G: PaymentGateway>(
    State(state): State<Arc<AppState<G>>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orchestrator.orders_for_user(user_id).await?;
    Ok(Json(orders.iter().map(OrderResponse::from).collect()))
}

/// GET /orders/:id — load one of the caller's orders.
#[tracing::instrument(skip(state))]
pub async fn get<G: PaymentGateway>(
    State(state): State<Arc<AppState<G>>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orchestrator.get_order(order_id, user_id).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/:id/cancel — cancel a pending order and restore stock.
#[tracing::instrument(skip(state))]
pub async fn cancel<G: PaymentGateway>(
    State(state): State<Arc<AppState<G>>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let order = state.orchestrator.cancel_order(order_id, user_id).await?;
    Ok(Json(OrderResponse::from(&order)))
}

/// POST /orders/reconcile — replay fulfillment steps an earlier crash left
/// pending.
#[tracing::instrument(skip(state))]
pub async fn reconcile<G: PaymentGateway>(
    State(state): State<Arc<AppState<G>>>,
) -> Result<Json<ReconcileResponse>, ApiError> {
    let replayed_steps = state.orchestrator.reconcile().await?;
    Ok(Json(ReconcileResponse { replayed_steps }))
}

pub(crate) fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("invalid order ID: {e}")))?;
    Ok(OrderId::from_uuid(uuid))
}
