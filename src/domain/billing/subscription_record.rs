//! Locally persisted mirror of a billing-provider subscription.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, SubscriptionRecordId, Timestamp};

use super::{BillingPeriod, PlanTier, SubscriptionState};

/// A subscription as recorded locally.
///
/// Created and updated only by the reconciler; never deleted. The
/// `external_reference` (the provider's subscription id) is unique across
/// all records and serves as the idempotence key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    /// Local record identifier.
    pub id: SubscriptionRecordId,

    /// Owning account.
    pub account_id: AccountId,

    /// The billing provider's subscription id.
    pub external_reference: String,

    /// Plan tier derived from the provider's price id.
    pub plan_tier: PlanTier,

    /// Renewal cadence derived from the provider's recurring interval.
    pub billing_period: BillingPeriod,

    /// Current status.
    pub status: SubscriptionState,

    /// Price per period in major currency units.
    pub amount: f64,

    /// End of the current billing period.
    pub period_end: Timestamp,

    /// Provider-reported creation time.
    pub created_at: Timestamp,

    /// When the subscription was cancelled. Written at most once and
    /// never cleared or overwritten.
    pub ended_at: Option<Timestamp>,
}

impl SubscriptionRecord {
    /// Materializes a record from insert data with a fresh id.
    pub fn from_new(new: NewSubscriptionRecord) -> Self {
        Self {
            id: SubscriptionRecordId::new(),
            account_id: new.account_id,
            external_reference: new.external_reference,
            plan_tier: new.plan_tier,
            billing_period: new.billing_period,
            status: new.status,
            amount: new.amount,
            period_end: new.period_end,
            created_at: new.created_at,
            ended_at: new.ended_at,
        }
    }

    /// Applies a reconciliation patch.
    ///
    /// Status, tier, period, amount, and period end are replaced
    /// unconditionally. `ended_at` is only taken from the patch when the
    /// record has none yet; a recorded cancellation time is immutable.
    pub fn apply(&mut self, patch: &SubscriptionPatch) {
        self.status = patch.status;
        self.plan_tier = patch.plan_tier;
        self.billing_period = patch.billing_period;
        self.amount = patch.amount;
        self.period_end = patch.period_end;
        if self.ended_at.is_none() {
            self.ended_at = patch.ended_at;
        }
    }
}

/// Data for inserting a new subscription record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscriptionRecord {
    pub account_id: AccountId,
    pub external_reference: String,
    pub plan_tier: PlanTier,
    pub billing_period: BillingPeriod,
    pub status: SubscriptionState,
    pub amount: f64,
    pub period_end: Timestamp,
    pub created_at: Timestamp,
    pub ended_at: Option<Timestamp>,
}

/// Field updates produced by reconciling an existing record.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionPatch {
    pub status: SubscriptionState,
    pub plan_tier: PlanTier,
    pub billing_period: BillingPeriod,
    pub amount: f64,
    pub period_end: Timestamp,
    /// Cancellation time, applied only if the record has none.
    pub ended_at: Option<Timestamp>,
}
