//! Locally persisted mirror of a settled charge.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, PaymentRecordId, SubscriptionRecordId, Timestamp};

use super::PaymentState;

/// A successful payment as recorded locally.
///
/// Created only by the reconciler, keyed by the provider's payment
/// reference (`payment_intent`, or the charge id for legacy charges).
/// `subscription_id` is nullable: when the provider gives no direct
/// linkage the payment attaches to the account's most recent
/// subscription record, and a payment is never recorded for an account
/// with no subscription records at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    /// Local record identifier.
    pub id: PaymentRecordId,

    /// The subscription this payment was attributed to, if any.
    pub subscription_id: Option<SubscriptionRecordId>,

    /// Owning account.
    pub account_id: AccountId,

    /// The billing provider's payment reference.
    pub external_reference: String,

    /// Amount paid in major currency units.
    pub amount: f64,

    /// Settlement status.
    pub status: PaymentState,

    /// Hosted receipt URL, when the provider supplies one.
    pub receipt_url: Option<String>,

    /// Human-readable description of what was paid for.
    pub description: String,

    /// Provider-reported charge time.
    pub created_at: Timestamp,
}

impl PaymentRecord {
    /// Materializes a record from insert data with a fresh id.
    pub fn from_new(new: NewPaymentRecord) -> Self {
        Self {
            id: PaymentRecordId::new(),
            subscription_id: new.subscription_id,
            account_id: new.account_id,
            external_reference: new.external_reference,
            amount: new.amount,
            status: new.status,
            receipt_url: new.receipt_url,
            description: new.description,
            created_at: new.created_at,
        }
    }
}

/// Data for inserting a new payment record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPaymentRecord {
    pub subscription_id: Option<SubscriptionRecordId>,
    pub account_id: AccountId,
    pub external_reference: String,
    pub amount: f64,
    pub status: PaymentState,
    pub receipt_url: Option<String>,
    pub description: String,
    pub created_at: Timestamp,
}
