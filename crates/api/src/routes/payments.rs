//! Payment intent, refund and webhook endpoints.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use checkout::PaymentGateway;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::routes::{AppState, AuthenticatedUser};
use crate::routes::orders::parse_order_id;

// -- Request types --

#[derive(Deserialize, Default)]
pub struct RefundRequest {
    pub reason: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct IntentResponse {
    pub client_secret: String,
    pub amount_cents: i64,
    pub currency: String,
}

#[derive(Serialize)]
pub struct RefundResponse {
    pub order_id: String,
    pub refund_id: String,
}

#[derive(Serialize)]
pub struct WebhookResponse {
    pub received: bool,
}

// -- Handlers --

/// POST /orders/:id/payment-intent — create a gateway intent for the order.
#[tracing::instrument(skip(state))]
pub async fn create_intent<G: PaymentGateway>(
    State(state): State<Arc<AppState<G>>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<IntentResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let credentials = state.coordinator.create_intent(order_id, user_id).await?;

    Ok(Json(IntentResponse {
        client_secret: credentials.client_secret,
        amount_cents: credentials.amount.cents(),
        currency: credentials.currency,
    }))
}

/// POST /orders/:id/refund — refund a paid order.
#[tracing::instrument(skip(state, req))]
pub async fn refund<G: PaymentGateway>(
    State(state): State<Arc<AppState<G>>>,
    AuthenticatedUser(user_id): AuthenticatedUser,
    Path(id): Path<String>,
    req: Option<Json<RefundRequest>>,
) -> Result<Json<RefundResponse>, ApiError> {
    let order_id = parse_order_id(&id)?;
    let reason = req.and_then(|Json(r)| r.reason);

    let result = state
        .coordinator
        .process_refund(order_id, user_id, reason)
        .await?;

    Ok(Json(RefundResponse {
        order_id: result.order_id.to_string(),
        refund_id: result.refund_id,
    }))
}

/// POST /webhooks/payment — ingest a signed gateway event.
///
/// The body is taken raw; signature verification needs the exact bytes the
/// gateway signed, so no JSON extractor may touch them first.
#[tracing::instrument(skip(state, headers, body))]
pub async fn webhook<G: PaymentGateway>(
    State(state): State<Arc<AppState<G>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookResponse>, ApiError> {
    let signature = headers
        .get("gateway-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("missing gateway-signature header".to_string()))?;

    let ack = state.coordinator.handle_webhook(signature, &body).await?;
    Ok(Json(WebhookResponse {
        received: ack.received,
    }))
}
