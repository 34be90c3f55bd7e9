//! Payment record repository port.

use async_trait::async_trait;

use crate::domain::billing::{NewPaymentRecord, PaymentRecord};
use crate::domain::foundation::DomainError;

/// Repository port for payment record persistence.
///
/// Implementations must enforce uniqueness of `external_reference` and
/// surface violations as `AlreadyExists`.
#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Find a record by the provider's payment reference.
    ///
    /// Returns `None` if the payment has not been mirrored yet.
    async fn find_by_external_reference(
        &self,
        reference: &str,
    ) -> Result<Option<PaymentRecord>, DomainError>;

    /// Insert a new record.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if a record with the same external reference
    ///   exists (lost insert race)
    /// - `DatabaseError` on persistence failure
    async fn insert(&self, record: NewPaymentRecord) -> Result<PaymentRecord, DomainError>;
}
