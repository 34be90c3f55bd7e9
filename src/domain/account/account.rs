//! Account entity.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AccountId, Timestamp};

/// The kind of marketplace participant an account represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// A public speaker offering talks.
    Speaker,

    /// An organization looking to book speakers.
    Organization,
}

impl AccountKind {
    /// Returns the display name for this kind.
    pub fn display_name(&self) -> &'static str {
        match self {
            AccountKind::Speaker => "Speaker",
            AccountKind::Organization => "Organization",
        }
    }
}

impl std::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A registered CoveTalks account.
///
/// Accounts are created at registration, outside the billing workflow.
/// The reconciler only reads them: `billing_customer_reference` is set by
/// the payment-method attachment flow when the account first interacts
/// with the billing provider, and stays `None` for accounts that never
/// subscribe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier.
    pub id: AccountId,

    /// Contact email address.
    pub email: String,

    /// Whether this account is a speaker or an organization.
    pub kind: AccountKind,

    /// The billing provider's customer id, if one has been created.
    pub billing_customer_reference: Option<String>,

    /// When the account was registered.
    pub created_at: Timestamp,
}

impl Account {
    /// Creates a new account without a billing customer.
    pub fn new(id: AccountId, email: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id,
            email: email.into(),
            kind,
            billing_customer_reference: None,
            created_at: Timestamp::now(),
        }
    }

    /// Returns a copy with the billing customer reference attached.
    pub fn with_billing_customer(mut self, reference: impl Into<String>) -> Self {
        self.billing_customer_reference = Some(reference.into());
        self
    }

    /// True when the account has interacted with the billing provider.
    pub fn has_billing_customer(&self) -> bool {
        self.billing_customer_reference.is_some()
    }
}
