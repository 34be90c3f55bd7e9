//! Subscription reconciliation workflow.
//!
//! Brings local subscription and payment records into agreement with the
//! billing provider's view of an account, without producing duplicates
//! and without losing previously recorded cancellation timestamps.
//!
//! A failure processing one subscription or charge is caught, recorded
//! in the per-record result buckets, and processing continues; only an
//! unresolvable account aborts the whole call.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::account::Account;
use crate::domain::billing::{
    BillingError, BillingPeriod, NewPaymentRecord, NewSubscriptionRecord, PaymentState,
    PriceTierMap, SubscriptionPatch, SubscriptionRecord, SubscriptionState,
};
use crate::domain::foundation::{AccountId, DomainError, Timestamp};
use crate::ports::{
    AccountRepository, BillingProvider, LatestInvoice, PaymentRepository, ProviderCharge,
    ProviderChargeStatus, ProviderError, ProviderInvoiceStatus, ProviderSubscription,
    ProviderSubscriptionStatus, RecurringInterval, SubscriptionRepository,
};

/// How many recent charges to examine per reconciliation.
const RECENT_CHARGE_LIMIT: u32 = 10;

/// Description for charges the provider left undescribed.
const GENERIC_PAYMENT_DESCRIPTION: &str = "Subscription payment";

/// Maps a provider subscription status to the local status vocabulary.
///
/// Fixed table; unrecognized statuses (and `active` itself) land on
/// `Active`.
pub fn map_subscription_status(status: ProviderSubscriptionStatus) -> SubscriptionState {
    match status {
        ProviderSubscriptionStatus::PastDue | ProviderSubscriptionStatus::Unpaid => {
            SubscriptionState::PastDue
        }
        ProviderSubscriptionStatus::Canceled => SubscriptionState::Cancelled,
        ProviderSubscriptionStatus::Incomplete => SubscriptionState::Incomplete,
        ProviderSubscriptionStatus::Trialing => SubscriptionState::Trialing,
        _ => SubscriptionState::Active,
    }
}

/// Maps a provider recurring interval to a billing period.
///
/// Only `year` yields `Yearly`; everything else is treated as monthly.
pub fn map_billing_period(interval: RecurringInterval) -> BillingPeriod {
    match interval {
        RecurringInterval::Year => BillingPeriod::Yearly,
        _ => BillingPeriod::Monthly,
    }
}

/// Converts minor currency units (cents) to major units.
fn minor_to_major(minor: i64) -> f64 {
    minor as f64 / 100.0
}

/// Which per-record failure class a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The billing provider call failed.
    Provider,

    /// Reading or writing a local record failed.
    Persistence,
}

/// An isolated per-record failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFailure {
    /// The external reference the failure is attributed to.
    pub reference: String,

    /// Failure class.
    pub kind: FailureKind,

    /// Human-readable failure message.
    pub message: String,
}

impl RecordFailure {
    fn provider(reference: impl Into<String>, err: &ProviderError) -> Self {
        Self {
            reference: reference.into(),
            kind: FailureKind::Provider,
            message: err.to_string(),
        }
    }

    fn persistence(reference: impl Into<String>, err: &DomainError) -> Self {
        Self {
            reference: reference.into(),
            kind: FailureKind::Persistence,
            message: err.to_string(),
        }
    }
}

/// Per-record result buckets for one reconciliation pass.
///
/// `created` and `updated` carry external subscription references in
/// provider order, keeping test output deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub errors: Vec<RecordFailure>,
}

/// Outcome of a reconciliation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconcileOutcome {
    /// True when any provider subscription is currently `active`.
    pub has_active_subscription: bool,

    /// Per-subscription result buckets.
    pub results: ReconcileReport,

    /// Failures from the best-effort invoice and charge sync, surfaced
    /// separately from the subscription buckets.
    pub charge_sync_errors: Vec<RecordFailure>,
}

impl ReconcileOutcome {
    /// The outcome for an account that never touched the billing
    /// provider: success, nothing to do.
    pub fn no_billing_customer() -> Self {
        Self {
            has_active_subscription: false,
            results: ReconcileReport::default(),
            charge_sync_errors: Vec::new(),
        }
    }
}

enum SyncDisposition {
    Created(SubscriptionRecord),
    Updated(SubscriptionRecord),
    /// A concurrent call inserted the record first.
    Skipped,
}

/// Reconciles provider billing state into local records.
///
/// Constructed with its collaborators injected, so tests substitute
/// in-memory repositories and a scripted provider.
pub struct Reconciler {
    accounts: Arc<dyn AccountRepository>,
    subscriptions: Arc<dyn SubscriptionRepository>,
    payments: Arc<dyn PaymentRepository>,
    provider: Arc<dyn BillingProvider>,
    price_map: PriceTierMap,
}

impl Reconciler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        subscriptions: Arc<dyn SubscriptionRepository>,
        payments: Arc<dyn PaymentRepository>,
        provider: Arc<dyn BillingProvider>,
        price_map: PriceTierMap,
    ) -> Self {
        Self {
            accounts,
            subscriptions,
            payments,
            provider,
            price_map,
        }
    }

    /// Reconcile all provider subscriptions and recent charges for an
    /// account.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the account doesn't exist
    /// - `Infrastructure` if the account lookup itself fails
    ///
    /// Everything else is isolated per record and reported in the
    /// outcome.
    pub async fn reconcile(&self, account_id: &AccountId) -> Result<ReconcileOutcome, BillingError> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| BillingError::account_not_found(*account_id))?;

        let Some(customer) = account.billing_customer_reference.clone() else {
            tracing::debug!(account_id = %account.id, "Account has no billing customer; nothing to reconcile");
            return Ok(ReconcileOutcome::no_billing_customer());
        };

        let mut results = ReconcileReport::default();
        let mut charge_sync_errors = Vec::new();
        let mut has_active_subscription = false;

        match self.provider.list_subscriptions(&customer).await {
            Ok(provider_subscriptions) => {
                for subscription in &provider_subscriptions {
                    if subscription.status == ProviderSubscriptionStatus::Active {
                        has_active_subscription = true;
                    }

                    match self.sync_subscription(&account, subscription).await {
                        Ok(SyncDisposition::Created(record)) => {
                            if record.status == SubscriptionState::Active {
                                if let Some(latest) = &subscription.latest_invoice {
                                    if let Err(failure) =
                                        self.sync_latest_invoice(&account, &record, latest).await
                                    {
                                        tracing::warn!(
                                            reference = %failure.reference,
                                            error = %failure.message,
                                            "Invoice sync failed"
                                        );
                                        charge_sync_errors.push(failure);
                                    }
                                }
                            }
                            results.created.push(record.external_reference);
                        }
                        Ok(SyncDisposition::Updated(record)) => {
                            results.updated.push(record.external_reference);
                        }
                        Ok(SyncDisposition::Skipped) => {}
                        Err(failure) => {
                            tracing::warn!(
                                reference = %failure.reference,
                                error = %failure.message,
                                "Subscription sync failed"
                            );
                            results.errors.push(failure);
                        }
                    }
                }
            }
            Err(err) => {
                tracing::warn!(customer = %customer, error = %err, "Listing provider subscriptions failed");
                results.errors.push(RecordFailure::provider(&customer, &err));
            }
        }

        self.sync_recent_charges(&account, &customer, &mut charge_sync_errors)
            .await;

        Ok(ReconcileOutcome {
            has_active_subscription,
            results,
            charge_sync_errors,
        })
    }

    /// Mirror one provider subscription into a local record.
    async fn sync_subscription(
        &self,
        account: &Account,
        subscription: &ProviderSubscription,
    ) -> Result<SyncDisposition, RecordFailure> {
        let reference = subscription.id.as_str();

        let existing = self
            .subscriptions
            .find_by_external_reference(reference)
            .await
            .map_err(|e| RecordFailure::persistence(reference, &e))?;

        let status = map_subscription_status(subscription.status);
        let plan_tier = self.price_map.tier_for(&subscription.price_id);
        let billing_period = map_billing_period(subscription.interval);
        let amount = minor_to_major(subscription.unit_amount);
        let period_end = Timestamp::from_unix_secs(subscription.current_period_end);

        match existing {
            None => {
                let new = NewSubscriptionRecord {
                    account_id: account.id,
                    external_reference: subscription.id.clone(),
                    plan_tier,
                    billing_period,
                    status,
                    amount,
                    period_end,
                    created_at: Timestamp::from_unix_secs(subscription.created),
                    ended_at: subscription.canceled_at.map(Timestamp::from_unix_secs),
                };

                match self.subscriptions.insert(new).await {
                    Ok(record) => Ok(SyncDisposition::Created(record)),
                    Err(err) if err.is_conflict() => {
                        tracing::debug!(reference, "Subscription already recorded concurrently; skipping");
                        Ok(SyncDisposition::Skipped)
                    }
                    Err(err) => Err(RecordFailure::persistence(reference, &err)),
                }
            }
            Some(existing) => {
                // A cancellation time already on the record is immutable.
                let ended_at = if existing.ended_at.is_none() {
                    subscription.canceled_at.map(Timestamp::from_unix_secs)
                } else {
                    None
                };

                let patch = SubscriptionPatch {
                    status,
                    plan_tier,
                    billing_period,
                    amount,
                    period_end,
                    ended_at,
                };

                let record = self
                    .subscriptions
                    .update(&existing.id, patch)
                    .await
                    .map_err(|e| RecordFailure::persistence(reference, &e))?;
                Ok(SyncDisposition::Updated(record))
            }
        }
    }

    /// Mirror a freshly created subscription's latest invoice into a
    /// payment record.
    async fn sync_latest_invoice(
        &self,
        account: &Account,
        subscription: &SubscriptionRecord,
        latest: &LatestInvoice,
    ) -> Result<(), RecordFailure> {
        let invoice = match latest {
            LatestInvoice::Expanded(invoice) => (**invoice).clone(),
            LatestInvoice::Reference(id) => self
                .provider
                .retrieve_invoice(id)
                .await
                .map_err(|e| RecordFailure::provider(id, &e))?,
        };

        let Some(payment_reference) = invoice.payment_intent.clone() else {
            tracing::debug!(invoice = %invoice.id, "Invoice has no payment reference; skipping");
            return Ok(());
        };

        let existing = self
            .payments
            .find_by_external_reference(&payment_reference)
            .await
            .map_err(|e| RecordFailure::persistence(&payment_reference, &e))?;
        if existing.is_some() {
            return Ok(());
        }

        if invoice.status != ProviderInvoiceStatus::Paid {
            tracing::debug!(invoice = %invoice.id, status = ?invoice.status, "Invoice not paid; skipping");
            return Ok(());
        }

        let description = match &invoice.number {
            Some(number) => format!("Invoice {}", number),
            None => format!("Invoice {}", invoice.id),
        };

        let new = NewPaymentRecord {
            subscription_id: Some(subscription.id),
            account_id: account.id,
            external_reference: payment_reference.clone(),
            amount: minor_to_major(invoice.amount_paid),
            status: PaymentState::Succeeded,
            receipt_url: invoice.hosted_invoice_url.clone(),
            description,
            created_at: Timestamp::from_unix_secs(invoice.created),
        };

        match self.payments.insert(new).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_conflict() => {
                tracing::debug!(reference = %payment_reference, "Payment already recorded concurrently; skipping");
                Ok(())
            }
            Err(err) => Err(RecordFailure::persistence(&payment_reference, &err)),
        }
    }

    /// Best-effort pass over the customer's recent charges.
    ///
    /// Charges without a local subscription record to attach to are
    /// skipped; no orphan payments are created.
    async fn sync_recent_charges(
        &self,
        account: &Account,
        customer: &str,
        errors: &mut Vec<RecordFailure>,
    ) {
        let charges = match self.provider.list_charges(customer, RECENT_CHARGE_LIMIT).await {
            Ok(charges) => charges,
            Err(err) => {
                tracing::warn!(customer = %customer, error = %err, "Listing recent charges failed");
                errors.push(RecordFailure::provider(customer, &err));
                return;
            }
        };

        let latest = match self.subscriptions.latest_for_account(&account.id).await {
            Ok(latest) => latest,
            Err(err) => {
                errors.push(RecordFailure::persistence(account.id.to_string(), &err));
                return;
            }
        };
        let Some(subscription) = latest else {
            tracing::debug!(account_id = %account.id, "No subscription records; skipping charge sync");
            return;
        };

        for charge in &charges {
            if let Err(failure) = self.sync_charge(account, &subscription, charge).await {
                tracing::warn!(reference = %failure.reference, error = %failure.message, "Charge sync failed");
                errors.push(failure);
            }
        }
    }

    /// Mirror one successful invoice-backed charge into a payment record.
    async fn sync_charge(
        &self,
        account: &Account,
        subscription: &SubscriptionRecord,
        charge: &ProviderCharge,
    ) -> Result<(), RecordFailure> {
        if charge.status != ProviderChargeStatus::Succeeded || charge.invoice.is_none() {
            return Ok(());
        }

        let payment_reference = charge
            .payment_intent
            .clone()
            .unwrap_or_else(|| charge.id.clone());

        let existing = self
            .payments
            .find_by_external_reference(&payment_reference)
            .await
            .map_err(|e| RecordFailure::persistence(&payment_reference, &e))?;
        if existing.is_some() {
            return Ok(());
        }

        let new = NewPaymentRecord {
            subscription_id: Some(subscription.id),
            account_id: account.id,
            external_reference: payment_reference.clone(),
            amount: minor_to_major(charge.amount),
            status: PaymentState::Succeeded,
            receipt_url: None,
            description: charge
                .description
                .clone()
                .unwrap_or_else(|| GENERIC_PAYMENT_DESCRIPTION.to_string()),
            created_at: Timestamp::from_unix_secs(charge.created),
        };

        match self.payments.insert(new).await {
            Ok(_) => Ok(()),
            Err(err) if err.is_conflict() => {
                tracing::debug!(reference = %payment_reference, "Payment already recorded concurrently; skipping");
                Ok(())
            }
            Err(err) => Err(RecordFailure::persistence(&payment_reference, &err)),
        }
    }
}
