//! Payment record linking a gateway intent to an order.

use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use crate::value_objects::Money;

/// Settlement status of a payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Intent created, awaiting the gateway's settlement event.
    #[default]
    Pending,

    /// The gateway reported a successful charge.
    Succeeded,

    /// The gateway reported a failed charge.
    Failed,

    /// A succeeded payment was refunded.
    Refunded,
}

impl PaymentStatus {
    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Succeeded => "succeeded",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The persisted record of one payment attempt against an order.
///
/// Keyed by the gateway's unique intent ID. An order may accumulate several
/// records over its life (a failed attempt followed by a successful one), but
/// at most one may ever reach `Succeeded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub order_id: OrderId,
    pub user_id: UserId,
    /// The gateway-side intent identifier, unique across all records.
    pub intent_id: String,
    pub amount: Money,
    pub currency: String,
    pub status: PaymentStatus,
    /// Set when the payment is refunded.
    pub refund_id: Option<String>,
}

impl PaymentRecord {
    /// Creates a new pending record for a freshly created intent.
    pub fn pending(
        order_id: OrderId,
        user_id: UserId,
        intent_id: impl Into<String>,
        amount: Money,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            order_id,
            user_id,
            intent_id: intent_id.into(),
            amount,
            currency: currency.into(),
            status: PaymentStatus::Pending,
            refund_id: None,
        }
    }
}
