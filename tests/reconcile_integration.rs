//! Integration tests for the subscription reconciliation workflow.
//!
//! Exercises the reconciler through the crate's public API with
//! in-memory repositories and a scripted billing provider:
//! 1. Idempotence across repeated calls
//! 2. Status/tier/period mapping
//! 3. Cancellation timestamp immutability
//! 4. Payment deduplication and orphan prevention

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use covetalks::adapters::memory::{
    InMemoryAccountRepository, InMemoryPaymentRepository, InMemorySubscriptionRepository,
};
use covetalks::application::Reconciler;
use covetalks::domain::account::{Account, AccountKind};
use covetalks::domain::billing::{
    BillingPeriod, PaymentState, PlanTier, PriceTierMap, SubscriptionState,
};
use covetalks::domain::foundation::{AccountId, Timestamp};
use covetalks::ports::{
    BillingProvider, LatestInvoice, ProviderCharge, ProviderChargeStatus, ProviderError,
    ProviderInvoice, ProviderInvoiceStatus, ProviderSubscription, ProviderSubscriptionStatus,
    RecurringInterval,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

/// Billing provider returning canned responses.
struct ScriptedProvider {
    subscriptions: Vec<ProviderSubscription>,
    invoices: HashMap<String, ProviderInvoice>,
    charges: Vec<ProviderCharge>,
}

impl ScriptedProvider {
    fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
            invoices: HashMap::new(),
            charges: Vec::new(),
        }
    }
}

#[async_trait]
impl BillingProvider for ScriptedProvider {
    async fn list_subscriptions(
        &self,
        _customer_reference: &str,
    ) -> Result<Vec<ProviderSubscription>, ProviderError> {
        Ok(self.subscriptions.clone())
    }

    async fn retrieve_invoice(&self, invoice_id: &str) -> Result<ProviderInvoice, ProviderError> {
        self.invoices
            .get(invoice_id)
            .cloned()
            .ok_or_else(|| ProviderError::not_found("invoice"))
    }

    async fn list_charges(
        &self,
        _customer_reference: &str,
        limit: u32,
    ) -> Result<Vec<ProviderCharge>, ProviderError> {
        Ok(self.charges.iter().take(limit as usize).cloned().collect())
    }
}

struct Harness {
    account: Account,
    accounts: Arc<InMemoryAccountRepository>,
    subscriptions: Arc<InMemorySubscriptionRepository>,
    payments: Arc<InMemoryPaymentRepository>,
}

impl Harness {
    fn new() -> Self {
        let account = Account::new(AccountId::new(), "speaker@covetalks.test", AccountKind::Speaker)
            .with_billing_customer("cus_live_1");
        Self {
            accounts: Arc::new(InMemoryAccountRepository::with_account(account.clone())),
            subscriptions: Arc::new(InMemorySubscriptionRepository::new()),
            payments: Arc::new(InMemoryPaymentRepository::new()),
            account,
        }
    }

    fn reconciler(&self, provider: ScriptedProvider) -> Reconciler {
        Reconciler::new(
            self.accounts.clone(),
            self.subscriptions.clone(),
            self.payments.clone(),
            Arc::new(provider),
            PriceTierMap::from_entries([
                ("price_plus_yearly", PlanTier::Plus),
                ("price_premium_monthly", PlanTier::Premium),
            ]),
        )
    }
}

fn yearly_plus_subscription(id: &str) -> ProviderSubscription {
    ProviderSubscription {
        id: id.to_string(),
        status: ProviderSubscriptionStatus::Active,
        price_id: "price_plus_yearly".to_string(),
        unit_amount: 149_700,
        interval: RecurringInterval::Year,
        created: 1_704_067_200,
        canceled_at: None,
        current_period_end: 1_735_689_600,
        latest_invoice: Some(LatestInvoice::Reference("in_1".to_string())),
    }
}

fn paid_invoice() -> ProviderInvoice {
    ProviderInvoice {
        id: "in_1".to_string(),
        payment_intent: Some("pi_1".to_string()),
        amount_paid: 149_700,
        status: ProviderInvoiceStatus::Paid,
        hosted_invoice_url: Some("https://invoice.covetalks.test/in_1".to_string()),
        number: Some("CT-2024-0001".to_string()),
        created: 1_704_067_260,
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn account_without_billing_customer_does_nothing() {
    let harness = Harness::new();
    let account = Account::new(AccountId::new(), "fresh@covetalks.test", AccountKind::Organization);
    harness.accounts.add(account.clone());

    let reconciler = harness.reconciler(ScriptedProvider::new());
    let outcome = reconciler.reconcile(&account.id).await.unwrap();

    assert!(!outcome.has_active_subscription);
    assert!(outcome.results.created.is_empty());
    assert!(outcome.results.updated.is_empty());
    assert!(outcome.results.errors.is_empty());
    assert!(harness.subscriptions.records().is_empty());
    assert!(harness.payments.records().is_empty());
}

#[tokio::test]
async fn new_yearly_plus_subscription_with_paid_invoice() {
    let harness = Harness::new();
    let mut provider = ScriptedProvider::new();
    provider.subscriptions = vec![yearly_plus_subscription("sub_1")];
    provider.invoices.insert("in_1".to_string(), paid_invoice());

    let reconciler = harness.reconciler(provider);
    let outcome = reconciler.reconcile(&harness.account.id).await.unwrap();

    assert!(outcome.has_active_subscription);
    assert_eq!(outcome.results.created, vec!["sub_1"]);

    let subscriptions = harness.subscriptions.records();
    assert_eq!(subscriptions.len(), 1);
    assert_eq!(subscriptions[0].plan_tier, PlanTier::Plus);
    assert_eq!(subscriptions[0].billing_period, BillingPeriod::Yearly);
    assert_eq!(subscriptions[0].status, SubscriptionState::Active);

    let payments = harness.payments.records();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount, 1497.0);
    assert_eq!(payments[0].status, PaymentState::Succeeded);
    assert_eq!(payments[0].external_reference, "pi_1");
}

#[tokio::test]
async fn repeated_reconcile_creates_no_new_records() {
    let harness = Harness::new();
    let mut provider = ScriptedProvider::new();
    provider.subscriptions = vec![yearly_plus_subscription("sub_1")];
    provider.invoices.insert("in_1".to_string(), paid_invoice());

    let reconciler = harness.reconciler(provider);
    reconciler.reconcile(&harness.account.id).await.unwrap();

    let subscriptions_before = harness.subscriptions.records().len();
    let payments_before = harness.payments.records().len();

    let second = reconciler.reconcile(&harness.account.id).await.unwrap();

    assert!(second.results.created.is_empty());
    assert_eq!(second.results.updated, vec!["sub_1"]);
    assert_eq!(harness.subscriptions.records().len(), subscriptions_before);
    assert_eq!(harness.payments.records().len(), payments_before);
}

#[tokio::test]
async fn provider_status_mapping_is_exact() {
    let table = [
        (ProviderSubscriptionStatus::Active, SubscriptionState::Active),
        (ProviderSubscriptionStatus::PastDue, SubscriptionState::PastDue),
        (ProviderSubscriptionStatus::Unpaid, SubscriptionState::PastDue),
        (ProviderSubscriptionStatus::Canceled, SubscriptionState::Cancelled),
        (ProviderSubscriptionStatus::Incomplete, SubscriptionState::Incomplete),
        (ProviderSubscriptionStatus::Trialing, SubscriptionState::Trialing),
        (ProviderSubscriptionStatus::Paused, SubscriptionState::Active),
    ];

    for (index, (provider_status, expected)) in table.into_iter().enumerate() {
        let harness = Harness::new();
        let mut provider = ScriptedProvider::new();
        let mut subscription = yearly_plus_subscription(&format!("sub_{}", index));
        subscription.status = provider_status;
        subscription.latest_invoice = None;
        provider.subscriptions = vec![subscription];

        let reconciler = harness.reconciler(provider);
        reconciler.reconcile(&harness.account.id).await.unwrap();

        let records = harness.subscriptions.records();
        assert_eq!(
            records[0].status, expected,
            "provider status {:?} should map to {:?}",
            provider_status, expected
        );
    }
}

#[tokio::test]
async fn ended_at_is_immutable_across_reconciles() {
    let harness = Harness::new();

    let mut subscription = yearly_plus_subscription("sub_1");
    subscription.status = ProviderSubscriptionStatus::Canceled;
    subscription.canceled_at = Some(1_706_000_000);
    subscription.latest_invoice = None;

    let mut provider = ScriptedProvider::new();
    provider.subscriptions = vec![subscription.clone()];
    harness
        .reconciler(provider)
        .reconcile(&harness.account.id)
        .await
        .unwrap();

    // The provider now reports an earlier cancellation and a new amount.
    subscription.canceled_at = Some(1_690_000_000);
    subscription.unit_amount = 99_900;
    let mut provider = ScriptedProvider::new();
    provider.subscriptions = vec![subscription];
    harness
        .reconciler(provider)
        .reconcile(&harness.account.id)
        .await
        .unwrap();

    let record = &harness.subscriptions.records()[0];
    assert_eq!(record.amount, 999.0, "refreshable fields still update");
    assert_eq!(
        record.ended_at,
        Some(Timestamp::from_unix_secs(1_706_000_000)),
        "recorded cancellation time never changes"
    );
}

#[tokio::test]
async fn unmapped_price_id_degrades_to_standard() {
    let harness = Harness::new();
    let mut subscription = yearly_plus_subscription("sub_1");
    subscription.price_id = "price_not_in_any_mapping".to_string();
    subscription.latest_invoice = None;

    let mut provider = ScriptedProvider::new();
    provider.subscriptions = vec![subscription];

    let outcome = harness
        .reconciler(provider)
        .reconcile(&harness.account.id)
        .await
        .unwrap();

    assert!(outcome.results.errors.is_empty());
    assert_eq!(harness.subscriptions.records()[0].plan_tier, PlanTier::Standard);
}

#[tokio::test]
async fn payment_reference_is_never_duplicated() {
    let harness = Harness::new();

    // Invoice payment and a charge with the same payment intent.
    let mut provider = ScriptedProvider::new();
    provider.subscriptions = vec![yearly_plus_subscription("sub_1")];
    provider.invoices.insert("in_1".to_string(), paid_invoice());
    provider.charges = vec![ProviderCharge {
        id: "ch_1".to_string(),
        status: ProviderChargeStatus::Succeeded,
        invoice: Some("in_1".to_string()),
        payment_intent: Some("pi_1".to_string()),
        amount: 149_700,
        description: None,
        created: 1_704_067_300,
    }];

    let reconciler = harness.reconciler(provider);
    reconciler.reconcile(&harness.account.id).await.unwrap();
    reconciler.reconcile(&harness.account.id).await.unwrap();

    let payments = harness.payments.records();
    assert_eq!(payments.len(), 1, "one payment per external reference");
    assert_eq!(payments[0].external_reference, "pi_1");
}

#[tokio::test]
async fn charge_without_any_subscription_record_is_skipped() {
    let harness = Harness::new();
    let mut provider = ScriptedProvider::new();
    provider.charges = vec![ProviderCharge {
        id: "ch_orphan".to_string(),
        status: ProviderChargeStatus::Succeeded,
        invoice: Some("in_9".to_string()),
        payment_intent: Some("pi_9".to_string()),
        amount: 2_900,
        description: None,
        created: 1_704_067_300,
    }];

    let outcome = harness
        .reconciler(provider)
        .reconcile(&harness.account.id)
        .await
        .unwrap();

    assert!(outcome.charge_sync_errors.is_empty());
    assert!(harness.payments.records().is_empty(), "no orphan payments");
}

#[tokio::test]
async fn charge_sync_uses_generic_description_when_missing() {
    let harness = Harness::new();
    let mut subscription = yearly_plus_subscription("sub_1");
    subscription.latest_invoice = None;

    let mut provider = ScriptedProvider::new();
    provider.subscriptions = vec![subscription];
    provider.charges = vec![ProviderCharge {
        id: "ch_1".to_string(),
        status: ProviderChargeStatus::Succeeded,
        invoice: Some("in_2".to_string()),
        payment_intent: Some("pi_2".to_string()),
        amount: 2_900,
        description: None,
        created: 1_704_067_300,
    }];

    harness
        .reconciler(provider)
        .reconcile(&harness.account.id)
        .await
        .unwrap();

    let payments = harness.payments.records();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].description, "Subscription payment");
    assert_eq!(payments[0].amount, 29.0);
}
