//! Stripe billing provider adapter.
//!
//! Implements the `BillingProvider` trait over the Stripe REST API.
//! Only read operations are needed: the reconciler mirrors provider
//! state, it never mutates it.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key);
//! let provider = StripeBillingProvider::new(config);
//! ```

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::ports::{
    BillingProvider, ProviderCharge, ProviderError, ProviderErrorCode, ProviderInvoice,
    ProviderSubscription,
};

use super::api_types::{StripeCharge, StripeInvoice, StripeList, StripeSubscription};

/// Page size for subscription listing. An account holds a handful of
/// subscriptions at most; one page is always enough.
const SUBSCRIPTION_PAGE_LIMIT: u32 = 100;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for the Stripe API (default: https://api.stripe.com).
    api_base_url: String,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
        }
    }

    /// Create configuration from the `STRIPE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, std::env::VarError> {
        Ok(Self::new(std::env::var("STRIPE_API_KEY")?))
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}

/// Stripe billing provider adapter.
pub struct StripeBillingProvider {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripeBillingProvider {
    /// Create a new Stripe provider with the given configuration.
    pub fn new(config: StripeConfig) -> Self {
        Self {
            config,
            http_client: reqwest::Client::new(),
        }
    }

    /// Issue an authenticated GET and decode the JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderError> {
        let url = format!("{}{}", self.config.api_base_url, path);

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response.json().await.map_err(|e| {
                ProviderError::new(
                    ProviderErrorCode::InvalidResponse,
                    format!("Failed to parse Stripe response: {}", e),
                )
            });
        }

        let error_text = response.text().await.unwrap_or_default();
        match status {
            reqwest::StatusCode::NOT_FOUND => Err(ProviderError::not_found(path)),
            reqwest::StatusCode::UNAUTHORIZED => Err(ProviderError::authentication(
                "Stripe rejected the API key",
            )),
            reqwest::StatusCode::TOO_MANY_REQUESTS => Err(ProviderError::new(
                ProviderErrorCode::RateLimitExceeded,
                "Stripe rate limit exceeded",
            )),
            _ => {
                tracing::error!(status = %status, error = %error_text, path, "Stripe API call failed");
                Err(ProviderError::api(format!(
                    "Stripe API error: {}",
                    error_text
                )))
            }
        }
    }
}

#[async_trait]
impl BillingProvider for StripeBillingProvider {
    async fn list_subscriptions(
        &self,
        customer_reference: &str,
    ) -> Result<Vec<ProviderSubscription>, ProviderError> {
        let list: StripeList<StripeSubscription> = self
            .get_json(
                "/v1/subscriptions",
                &[
                    ("customer", customer_reference.to_string()),
                    ("status", "all".to_string()),
                    ("limit", SUBSCRIPTION_PAGE_LIMIT.to_string()),
                ],
            )
            .await?;

        if list.has_more {
            tracing::warn!(
                customer = customer_reference,
                "Customer has more subscriptions than one page; older entries not reconciled"
            );
        }

        Ok(list.data.into_iter().map(Into::into).collect())
    }

    async fn retrieve_invoice(&self, invoice_id: &str) -> Result<ProviderInvoice, ProviderError> {
        let invoice: StripeInvoice = self
            .get_json(&format!("/v1/invoices/{}", invoice_id), &[])
            .await?;
        Ok(invoice.into())
    }

    async fn list_charges(
        &self,
        customer_reference: &str,
        limit: u32,
    ) -> Result<Vec<ProviderCharge>, ProviderError> {
        let list: StripeList<StripeCharge> = self
            .get_json(
                "/v1/charges",
                &[
                    ("customer", customer_reference.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(list.data.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_production_base_url() {
        let config = StripeConfig::new("sk_test_xxx");
        assert_eq!(config.api_base_url, "https://api.stripe.com");
    }

    #[test]
    fn base_url_override_applies() {
        let config = StripeConfig::new("sk_test_xxx").with_base_url("http://localhost:12111");
        assert_eq!(config.api_base_url, "http://localhost:12111");
    }
}
