//! Payment gateway client trait and deterministic in-memory implementation.
//!
//! The gateway is injected into the `PaymentCoordinator`, never instantiated
//! globally, so tests can swap in a stub with failure toggles.

use std::collections::HashMap;
use std::hash::Hasher;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event kind emitted when a payment intent settles successfully.
pub const EVENT_PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";

/// Errors returned by a gateway client.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway refused the request (declined charge, unknown intent, ...).
    #[error("gateway rejected the request: {0}")]
    Rejected(String),

    /// The event signature did not verify against the webhook secret.
    #[error("invalid event signature")]
    InvalidSignature,

    /// The event payload verified but could not be decoded.
    #[error("malformed event payload: {0}")]
    MalformedEvent(String),
}

/// Metadata attached to an intent at creation and echoed back in events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentMetadata {
    pub order_id: Option<OrderId>,
    pub user_id: Option<UserId>,
}

/// A freshly created payment intent.
#[derive(Debug, Clone)]
pub struct GatewayIntent {
    /// Gateway-side unique intent identifier.
    pub id: String,
    /// Credential the caller needs to complete payment out-of-band.
    pub client_secret: String,
}

/// A created refund.
#[derive(Debug, Clone)]
pub struct GatewayRefund {
    pub id: String,
}

/// A verified, decoded gateway event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayEvent {
    /// Event kind, e.g. [`EVENT_PAYMENT_SUCCEEDED`].
    pub kind: String,
    /// The intent this event refers to.
    pub intent_id: String,
    /// Metadata echoed from intent creation.
    #[serde(default)]
    pub metadata: IntentMetadata,
}

/// Client for the external payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates a payment intent for an amount in minor units.
    async fn create_intent(
        &self,
        amount_minor: i64,
        currency: &str,
        metadata: IntentMetadata,
    ) -> Result<GatewayIntent, GatewayError>;

    /// Verifies a webhook payload's authenticity and decodes it.
    ///
    /// Unverifiable payloads must be rejected before any content is trusted.
    fn verify_and_parse_event(
        &self,
        signature: &str,
        raw_payload: &[u8],
    ) -> Result<GatewayEvent, GatewayError>;

    /// Refunds a previously settled intent.
    async fn create_refund(
        &self,
        intent_id: &str,
        reason: &str,
    ) -> Result<GatewayRefund, GatewayError>;
}

#[derive(Debug, Default)]
struct GatewayState {
    intents: HashMap<String, i64>,
    next_intent: u32,
    next_refund: u32,
    fail_on_intent: bool,
    fail_on_refund: bool,
}

/// In-memory gateway for tests and local runs.
///
/// Intent and refund IDs are sequential (`pi_0001`, `re_0001`); event
/// signatures are a keyed hash over the raw payload so tests can sign
/// payloads deterministically with [`InMemoryPaymentGateway::sign`].
#[derive(Debug, Clone)]
pub struct InMemoryPaymentGateway {
    secret: String,
    state: Arc<RwLock<GatewayState>>,
}

impl InMemoryPaymentGateway {
    /// Creates a gateway with the given webhook signing secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            state: Arc::new(RwLock::new(GatewayState::default())),
        }
    }

    /// Configures the gateway to reject the next intent creation.
    pub fn set_fail_on_intent(&self, fail: bool) {
        self.state.write().unwrap().fail_on_intent = fail;
    }

    /// Configures the gateway to reject the next refund.
    pub fn set_fail_on_refund(&self, fail: bool) {
        self.state.write().unwrap().fail_on_refund = fail;
    }

    /// Returns the number of intents created.
    pub fn intent_count(&self) -> usize {
        self.state.read().unwrap().intents.len()
    }

    /// Signs a raw payload the way the gateway would.
    pub fn sign(&self, payload: &[u8]) -> String {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        hasher.write(self.secret.as_bytes());
        hasher.write(payload);
        format!("v1={:016x}", hasher.finish())
    }

    /// Builds a signed event for an intent, as the gateway would deliver it.
    ///
    /// Returns `(signature, payload)` ready for webhook ingestion.
    pub fn signed_event(
        &self,
        kind: &str,
        intent_id: &str,
        metadata: IntentMetadata,
    ) -> (String, Vec<u8>) {
        let event = GatewayEvent {
            kind: kind.to_string(),
            intent_id: intent_id.to_string(),
            metadata,
        };
        let payload = serde_json::to_vec(&event).unwrap_or_default();
        let signature = self.sign(&payload);
        (signature, payload)
    }
}

impl Default for InMemoryPaymentGateway {
    fn default() -> Self {
        Self::new("whsec_test")
    }
}

#[async_trait]
impl PaymentGateway for InMemoryPaymentGateway {
    async fn create_intent(
        &self,
        amount_minor: i64,
        _currency: &str,
        _metadata: IntentMetadata,
    ) -> Result<GatewayIntent, GatewayError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_intent {
            return Err(GatewayError::Rejected("card declined".to_string()));
        }

        state.next_intent += 1;
        let id = format!("pi_{:04}", state.next_intent);
        state.intents.insert(id.clone(), amount_minor);

        let client_secret = format!("{id}_secret");
        Ok(GatewayIntent { id, client_secret })
    }

    fn verify_and_parse_event(
        &self,
        signature: &str,
        raw_payload: &[u8],
    ) -> Result<GatewayEvent, GatewayError> {
        if signature != self.sign(raw_payload) {
            return Err(GatewayError::InvalidSignature);
        }

        serde_json::from_slice(raw_payload).map_err(|e| GatewayError::MalformedEvent(e.to_string()))
    }

    async fn create_refund(
        &self,
        intent_id: &str,
        _reason: &str,
    ) -> Result<GatewayRefund, GatewayError> {
        let mut state = self.state.write().unwrap();

        if state.fail_on_refund {
            return Err(GatewayError::Rejected("refund rejected".to_string()));
        }

        if !state.intents.contains_key(intent_id) {
            return Err(GatewayError::Rejected(format!(
                "unknown intent: {intent_id}"
            )));
        }

        state.next_refund += 1;
        Ok(GatewayRefund {
            id: format!("re_{:04}", state.next_refund),
        })
    }
}
