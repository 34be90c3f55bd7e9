//! Account repository port.
//!
//! The reconciler only reads accounts; the billing customer reference is
//! written by the payment-method attachment flow, which shares this port.

use async_trait::async_trait;

use crate::domain::account::Account;
use crate::domain::foundation::{AccountId, DomainError};

/// Repository port for account lookup.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by its id.
    ///
    /// Returns `None` if not found.
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError>;

    /// Record the billing provider's customer id for an account.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound` if the account doesn't exist
    /// - `DatabaseError` on persistence failure
    async fn set_billing_customer_reference(
        &self,
        id: &AccountId,
        reference: &str,
    ) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn account_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn AccountRepository) {}
    }
}
