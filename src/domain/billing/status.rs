//! Local subscription and payment status enums.

use serde::{Deserialize, Serialize};

/// Status of a locally persisted subscription record.
///
/// A narrowed view of the billing provider's status vocabulary; the
/// reconciler owns the mapping from provider statuses to these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    /// Subscription is current (also the fallback for unrecognized
    /// provider statuses).
    Active,

    /// Payment is overdue or retries were exhausted.
    PastDue,

    /// Subscription was cancelled.
    Cancelled,

    /// Initial payment was never completed.
    Incomplete,

    /// Subscription is in a trial period.
    Trialing,
}

impl SubscriptionState {
    /// Check if this state grants marketplace access.
    pub fn has_access(&self) -> bool {
        matches!(self, SubscriptionState::Active | SubscriptionState::Trialing)
    }
}

impl std::fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubscriptionState::Active => "active",
            SubscriptionState::PastDue => "past_due",
            SubscriptionState::Cancelled => "cancelled",
            SubscriptionState::Incomplete => "incomplete",
            SubscriptionState::Trialing => "trialing",
        };
        write!(f, "{}", s)
    }
}

/// Status of a locally persisted payment record.
///
/// Only settled payments are mirrored locally, so this currently has a
/// single variant; failed or pending charges are never recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentState {
    /// Payment settled successfully.
    Succeeded,
}

impl std::fmt::Display for PaymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "succeeded")
    }
}
