//! Order status state machine.

use serde::{Deserialize, Serialize};

/// The status of an order in its lifecycle.
///
/// Status transitions:
/// ```text
/// Pending ──► Paid ──► Cancelled   (via refund)
///    │
///    └──────────────► Cancelled   (direct cancellation)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order has been created, payment not yet confirmed.
    #[default]
    Pending,

    /// A verified payment event settled the order.
    Paid,

    /// Order was cancelled, either directly or through a refund
    /// (terminal state).
    Cancelled,
}

impl OrderStatus {
    /// Returns true if a verified payment event may settle the order.
    pub fn can_mark_paid(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the order can be cancelled without a refund.
    ///
    /// A pending order with an unsettled payment intent may still be
    /// cancelled; a paid order must go through the refund path.
    pub fn can_cancel_directly(&self) -> bool {
        matches!(self, OrderStatus::Pending)
    }

    /// Returns true if the order can be cancelled through a refund.
    pub fn can_refund(&self) -> bool {
        matches!(self, OrderStatus::Paid)
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }

    /// Returns the status name as stored in the status history.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_status_is_pending() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn only_pending_can_be_paid() {
        assert!(OrderStatus::Pending.can_mark_paid());
        assert!(!OrderStatus::Paid.can_mark_paid());
        assert!(!OrderStatus::Cancelled.can_mark_paid());
    }

    #[test]
    fn only_pending_can_cancel_directly() {
        assert!(OrderStatus::Pending.can_cancel_directly());
        assert!(!OrderStatus::Paid.can_cancel_directly());
        assert!(!OrderStatus::Cancelled.can_cancel_directly());
    }

    #[test]
    fn only_paid_can_refund() {
        assert!(!OrderStatus::Pending.can_refund());
        assert!(OrderStatus::Paid.can_refund());
        assert!(!OrderStatus::Cancelled.can_refund());
    }

    #[test]
    fn cancelled_is_terminal() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn display_matches_history_strings() {
        assert_eq!(OrderStatus::Pending.to_string(), "pending");
        assert_eq!(OrderStatus::Paid.to_string(), "paid");
        assert_eq!(OrderStatus::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Paid).unwrap();
        assert_eq!(json, "\"paid\"");
    }
}
