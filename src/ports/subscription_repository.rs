//! Subscription record repository port.
//!
//! Defines the contract for persisting locally mirrored subscriptions.
//!
//! # Design
//!
//! - **External reference as idempotence key**: `find_by_external_reference`
//!   before `insert` is how the reconciler avoids duplicates
//! - **Unique constraint**: implementations must enforce uniqueness of
//!   `external_reference` and surface violations as `AlreadyExists`
//! - **Immutable cancellation time**: `update` must never clear or
//!   overwrite a record's existing `ended_at`

use async_trait::async_trait;

use crate::domain::billing::{NewSubscriptionRecord, SubscriptionPatch, SubscriptionRecord};
use crate::domain::foundation::{AccountId, DomainError, SubscriptionRecordId};

/// Repository port for subscription record persistence.
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Find a record by the provider's subscription id.
    ///
    /// Returns `None` if the subscription has not been mirrored yet.
    async fn find_by_external_reference(
        &self,
        reference: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError>;

    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if a record with the same external reference
    ///   exists (lost insert race)
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, record: NewSubscriptionRecord)
        -> Result<SubscriptionRecord, DomainError>;

    /// Apply a patch to an existing record and return the updated row.
    ///
    /// # Errors
    ///
    /// - `SubscriptionNotFound` if the record doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn update(
        &self,
        id: &SubscriptionRecordId,
        patch: SubscriptionPatch,
    ) -> Result<SubscriptionRecord, DomainError>;

    /// The account's most recently created record, if any.
    ///
    /// Used to attribute charges the provider doesn't link to a
    /// subscription directly.
    async fn latest_for_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<SubscriptionRecord>, DomainError>;
}
