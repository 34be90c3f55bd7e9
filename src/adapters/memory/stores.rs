//! In-memory implementations of the persistence ports.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::account::Account;
use crate::domain::billing::{
    NewPaymentRecord, NewSubscriptionRecord, PaymentRecord, SubscriptionPatch, SubscriptionRecord,
};
use crate::domain::foundation::{AccountId, DomainError, ErrorCode, SubscriptionRecordId};
use crate::ports::{AccountRepository, PaymentRepository, SubscriptionRepository};

/// In-memory account store.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: Mutex<Vec<Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with an account.
    pub fn with_account(account: Account) -> Self {
        Self {
            accounts: Mutex::new(vec![account]),
        }
    }

    /// Adds an account to the store.
    pub fn add(&self, account: Account) {
        self.accounts.lock().unwrap().push(account);
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| &a.id == id)
            .cloned())
    }

    async fn set_billing_customer_reference(
        &self,
        id: &AccountId,
        reference: &str,
    ) -> Result<(), DomainError> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.iter_mut().find(|a| &a.id == id).ok_or_else(|| {
            DomainError::new(ErrorCode::AccountNotFound, format!("Account not found: {}", id))
        })?;
        account.billing_customer_reference = Some(reference.to_string());
        Ok(())
    }
}

/// In-memory subscription record store.
#[derive(Default)]
pub struct InMemorySubscriptionRepository {
    records: Mutex<Vec<SubscriptionRecord>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored records, for assertions.
    pub fn records(&self) -> Vec<SubscriptionRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn find_by_external_reference(
        &self,
        reference: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.external_reference == reference)
            .cloned())
    }

    async fn insert(
        &self,
        record: NewSubscriptionRecord,
    ) -> Result<SubscriptionRecord, DomainError> {
        let mut records = self.records.lock().unwrap();
        if records
            .iter()
            .any(|r| r.external_reference == record.external_reference)
        {
            return Err(DomainError::already_exists(format!(
                "Subscription record exists for {}",
                record.external_reference
            )));
        }
        let created = SubscriptionRecord::from_new(record);
        records.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: &SubscriptionRecordId,
        patch: SubscriptionPatch,
    ) -> Result<SubscriptionRecord, DomainError> {
        let mut records = self.records.lock().unwrap();
        let record = records.iter_mut().find(|r| &r.id == id).ok_or_else(|| {
            DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription record not found: {}", id),
            )
        })?;
        record.apply(&patch);
        Ok(record.clone())
    }

    async fn latest_for_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| &r.account_id == account_id)
            .max_by_key(|r| r.created_at)
            .cloned())
    }
}

/// In-memory payment record store.
#[derive(Default)]
pub struct InMemoryPaymentRepository {
    records: Mutex<Vec<PaymentRecord>>,
}

impl InMemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored records, for assertions.
    pub fn records(&self) -> Vec<PaymentRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn find_by_external_reference(
        &self,
        reference: &str,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.external_reference == reference)
            .cloned())
    }

    async fn insert(&self, record: NewPaymentRecord) -> Result<PaymentRecord, DomainError> {
        let mut records = self.records.lock().unwrap();
        if records
            .iter()
            .any(|r| r.external_reference == record.external_reference)
        {
            return Err(DomainError::already_exists(format!(
                "Payment record exists for {}",
                record.external_reference
            )));
        }
        let created = PaymentRecord::from_new(record);
        records.push(created.clone());
        Ok(created)
    }
}
