//! Billing-specific error types.
//!
//! Errors that abort a reconciliation call outright. Per-record failures
//! during reconciliation are not errors in this sense; they are collected
//! into the outcome's result buckets instead.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | AccountNotFound | 404 |
//! | ValidationFailed | 400 |
//! | Infrastructure | 500 |

use crate::domain::foundation::{AccountId, DomainError, ErrorCode};

/// Fatal billing workflow errors.
#[derive(Debug, Clone, PartialEq)]
pub enum BillingError {
    /// The referenced account does not exist.
    AccountNotFound(AccountId),

    /// Required input was missing or malformed.
    ValidationFailed { field: String, message: String },

    /// Infrastructure failure outside per-record isolation.
    Infrastructure(String),
}

impl BillingError {
    pub fn account_not_found(id: AccountId) -> Self {
        BillingError::AccountNotFound(id)
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        BillingError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn infrastructure(message: impl Into<String>) -> Self {
        BillingError::Infrastructure(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            BillingError::AccountNotFound(_) => ErrorCode::AccountNotFound,
            BillingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            BillingError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    /// Returns a user-friendly error message.
    pub fn message(&self) -> String {
        match self {
            BillingError::AccountNotFound(id) => format!("Account not found: {}", id),
            BillingError::ValidationFailed { field, message } => {
                format!("Invalid {}: {}", field, message)
            }
            BillingError::Infrastructure(message) => message.clone(),
        }
    }
}

impl std::fmt::Display for BillingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for BillingError {}

impl From<DomainError> for BillingError {
    fn from(err: DomainError) -> Self {
        BillingError::Infrastructure(err.to_string())
    }
}
