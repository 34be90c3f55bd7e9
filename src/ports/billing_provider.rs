//! Billing provider port for the external payment service.
//!
//! Defines the read-side contract the reconciler depends on (e.g. Stripe).
//! The reconciler never creates customers or subscriptions at the
//! provider; it only lists and retrieves billing state to mirror locally.
//!
//! # Design
//!
//! - **Gateway agnostic**: Interface works with any billing provider
//! - **Read-only**: Reconciliation mirrors provider state, never mutates it
//! - **Provider-shaped**: Value types carry the provider's own vocabulary
//!   (raw statuses, minor currency units); mapping into local records is
//!   the reconciler's job

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Port for billing provider integrations.
///
/// All listing operations are scoped to a single provider customer.
#[async_trait]
pub trait BillingProvider: Send + Sync {
    /// List all subscriptions for a customer, regardless of status.
    async fn list_subscriptions(
        &self,
        customer_reference: &str,
    ) -> Result<Vec<ProviderSubscription>, ProviderError>;

    /// Retrieve a single invoice by its provider id.
    async fn retrieve_invoice(&self, invoice_id: &str) -> Result<ProviderInvoice, ProviderError>;

    /// List the most recent charges for a customer, newest first.
    async fn list_charges(
        &self,
        customer_reference: &str,
        limit: u32,
    ) -> Result<Vec<ProviderCharge>, ProviderError>;
}

/// A subscription as reported by the billing provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSubscription {
    /// Provider's subscription id.
    pub id: String,

    /// Current status at the provider.
    pub status: ProviderSubscriptionStatus,

    /// Price id of the subscription's (first) item.
    pub price_id: String,

    /// Price per period in minor currency units.
    pub unit_amount: i64,

    /// Recurring interval of the price.
    pub interval: RecurringInterval,

    /// When the subscription was created (Unix timestamp).
    pub created: i64,

    /// When the subscription was cancelled, if it was (Unix timestamp).
    pub canceled_at: Option<i64>,

    /// End of the current billing period (Unix timestamp).
    pub current_period_end: i64,

    /// The most recent invoice, when the provider reports one.
    pub latest_invoice: Option<LatestInvoice>,
}

/// Subscription status vocabulary of the billing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderSubscriptionStatus {
    /// Subscription is active and current.
    Active,

    /// Payment is past due, grace period active.
    PastDue,

    /// Subscription is canceled.
    Canceled,

    /// Payment retries exhausted.
    Unpaid,

    /// Initial payment incomplete.
    Incomplete,

    /// Initial payment window expired.
    IncompleteExpired,

    /// Subscription is in trial period.
    Trialing,

    /// Subscription is paused.
    Paused,

    /// Unrecognized status from the provider.
    Unknown,
}

impl ProviderSubscriptionStatus {
    /// Parse the provider's wire status string.
    pub fn parse(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            "past_due" => Self::PastDue,
            "canceled" => Self::Canceled,
            "unpaid" => Self::Unpaid,
            "incomplete" => Self::Incomplete,
            "incomplete_expired" => Self::IncompleteExpired,
            "trialing" => Self::Trialing,
            "paused" => Self::Paused,
            _ => Self::Unknown,
        }
    }
}

/// Recurring interval of a subscription price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurringInterval {
    Day,
    Week,
    Month,
    Year,
}

impl RecurringInterval {
    /// Parse the provider's wire interval string, defaulting to monthly.
    pub fn parse(s: &str) -> Self {
        match s {
            "day" => Self::Day,
            "week" => Self::Week,
            "year" => Self::Year,
            _ => Self::Month,
        }
    }
}

/// The latest invoice attached to a subscription.
///
/// Providers return either a bare invoice id or, when expansion was
/// requested, the full invoice object.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LatestInvoice {
    /// Only the invoice id was given; retrieve it separately.
    Reference(String),

    /// The invoice object was embedded in the response.
    Expanded(Box<ProviderInvoice>),
}

/// An invoice as reported by the billing provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInvoice {
    /// Provider's invoice id.
    pub id: String,

    /// Payment reference for the invoice's charge, once one exists.
    pub payment_intent: Option<String>,

    /// Amount actually paid, in minor currency units.
    pub amount_paid: i64,

    /// Invoice status at the provider.
    pub status: ProviderInvoiceStatus,

    /// Hosted invoice page, when available.
    pub hosted_invoice_url: Option<String>,

    /// Human-readable invoice number.
    pub number: Option<String>,

    /// When the invoice was created (Unix timestamp).
    pub created: i64,
}

/// Invoice status vocabulary of the billing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderInvoiceStatus {
    Draft,
    Open,
    Paid,
    Uncollectible,
    Void,
    Unknown,
}

impl ProviderInvoiceStatus {
    /// Parse the provider's wire status string.
    pub fn parse(s: &str) -> Self {
        match s {
            "draft" => Self::Draft,
            "open" => Self::Open,
            "paid" => Self::Paid,
            "uncollectible" => Self::Uncollectible,
            "void" => Self::Void,
            _ => Self::Unknown,
        }
    }
}

/// A charge as reported by the billing provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderCharge {
    /// Provider's charge id.
    pub id: String,

    /// Charge status at the provider.
    pub status: ProviderChargeStatus,

    /// Invoice this charge settled, if any.
    pub invoice: Option<String>,

    /// Payment reference, absent on legacy charges.
    pub payment_intent: Option<String>,

    /// Charge amount in minor currency units.
    pub amount: i64,

    /// Statement description, when the provider supplies one.
    pub description: Option<String>,

    /// When the charge was created (Unix timestamp).
    pub created: i64,
}

/// Charge status vocabulary of the billing provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderChargeStatus {
    Succeeded,
    Pending,
    Failed,
    Unknown,
}

impl ProviderChargeStatus {
    /// Parse the provider's wire status string.
    pub fn parse(s: &str) -> Self {
        match s {
            "succeeded" => Self::Succeeded,
            "pending" => Self::Pending,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }
}

/// Errors from billing provider operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderError {
    /// Error code for categorization.
    pub code: ProviderErrorCode,

    /// Human-readable message.
    pub message: String,

    /// Whether the operation can be retried.
    pub retryable: bool,
}

impl ProviderError {
    /// Create a new provider error.
    pub fn new(code: ProviderErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            retryable: code.is_retryable(),
        }
    }

    /// Create a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::NetworkError, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::AuthenticationError, message)
    }

    /// Create a not found error.
    pub fn not_found(resource: &str) -> Self {
        Self::new(ProviderErrorCode::NotFound, format!("{} not found", resource))
    }

    /// Create a generic provider API error.
    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::ApiError, message)
    }
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ProviderError {}

/// Provider error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderErrorCode {
    /// Network connectivity issue.
    NetworkError,

    /// API authentication failed.
    AuthenticationError,

    /// Resource not found.
    NotFound,

    /// Rate limit exceeded.
    RateLimitExceeded,

    /// Provider API error.
    ApiError,

    /// Response could not be parsed.
    InvalidResponse,
}

impl ProviderErrorCode {
    /// Check if this error type is typically retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ProviderErrorCode::NetworkError | ProviderErrorCode::RateLimitExceeded
        )
    }
}

impl std::fmt::Display for ProviderErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderErrorCode::NetworkError => "network_error",
            ProviderErrorCode::AuthenticationError => "authentication_error",
            ProviderErrorCode::NotFound => "not_found",
            ProviderErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            ProviderErrorCode::ApiError => "api_error",
            ProviderErrorCode::InvalidResponse => "invalid_response",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trait object safety test
    #[test]
    fn billing_provider_is_object_safe() {
        fn _accepts_dyn(_provider: &dyn BillingProvider) {}
    }

    #[test]
    fn subscription_status_parses_known_values() {
        assert_eq!(
            ProviderSubscriptionStatus::parse("active"),
            ProviderSubscriptionStatus::Active
        );
        assert_eq!(
            ProviderSubscriptionStatus::parse("past_due"),
            ProviderSubscriptionStatus::PastDue
        );
        assert_eq!(
            ProviderSubscriptionStatus::parse("unpaid"),
            ProviderSubscriptionStatus::Unpaid
        );
        assert_eq!(
            ProviderSubscriptionStatus::parse("made_up_status"),
            ProviderSubscriptionStatus::Unknown
        );
    }

    #[test]
    fn interval_parse_defaults_to_month() {
        assert_eq!(RecurringInterval::parse("year"), RecurringInterval::Year);
        assert_eq!(RecurringInterval::parse("month"), RecurringInterval::Month);
        assert_eq!(RecurringInterval::parse("fortnight"), RecurringInterval::Month);
    }

    #[test]
    fn provider_error_retryable() {
        assert!(ProviderErrorCode::NetworkError.is_retryable());
        assert!(ProviderErrorCode::RateLimitExceeded.is_retryable());

        assert!(!ProviderErrorCode::NotFound.is_retryable());
        assert!(!ProviderErrorCode::ApiError.is_retryable());
    }

    #[test]
    fn provider_error_display() {
        let err = ProviderError::not_found("invoice in_123");
        assert!(err.to_string().contains("not_found"));
        assert!(err.to_string().contains("invoice in_123"));
    }
}
