//! HTTP handlers for billing endpoints.
//!
//! These handlers connect Axum routes to the reconciliation workflow.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::application::Reconciler;
use crate::domain::billing::{BillingError, PriceTierMap};
use crate::domain::foundation::AccountId;
use crate::ports::{
    AccountRepository, BillingProvider, PaymentRepository, SubscriptionRepository,
};

use super::dto::{ErrorResponse, ReconcileRequest, ReconcileResponse};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all billing dependencies.
///
/// Cloned per request; dependencies are Arc-wrapped for cheap sharing.
#[derive(Clone)]
pub struct BillingAppState {
    pub accounts: Arc<dyn AccountRepository>,
    pub subscriptions: Arc<dyn SubscriptionRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub billing_provider: Arc<dyn BillingProvider>,
    pub price_map: PriceTierMap,
}

impl BillingAppState {
    /// Create a reconciler wired to this state's collaborators.
    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(
            self.accounts.clone(),
            self.subscriptions.clone(),
            self.payments.clone(),
            self.billing_provider.clone(),
            self.price_map.clone(),
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/billing/reconcile - Sync billing provider state for one account
pub async fn reconcile_account(
    State(state): State<BillingAppState>,
    Json(request): Json<ReconcileRequest>,
) -> Result<Json<ReconcileResponse>, BillingApiError> {
    let raw = request.account_id.unwrap_or_default();
    if raw.trim().is_empty() {
        return Err(BillingError::validation("accountId", "accountId is required").into());
    }

    let account_id: AccountId = raw
        .parse()
        .map_err(|_| BillingError::validation("accountId", "must be a valid UUID"))?;

    let outcome = state.reconciler().reconcile(&account_id).await?;

    Ok(Json(ReconcileResponse::from_outcome(outcome)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts billing errors to HTTP responses.
pub struct BillingApiError(BillingError);

impl From<BillingError> for BillingApiError {
    fn from(err: BillingError) -> Self {
        Self(err)
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            BillingError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            BillingError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            BillingError::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse::new(self.0.message());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryAccountRepository, InMemoryPaymentRepository, InMemorySubscriptionRepository,
    };
    use crate::domain::account::{Account, AccountKind};
    use crate::ports::{ProviderCharge, ProviderError, ProviderInvoice, ProviderSubscription};
    use async_trait::async_trait;

    // ════════════════════════════════════════════════════════════════════════════
    // Mock Implementations
    // ════════════════════════════════════════════════════════════════════════════

    struct EmptyProvider;

    #[async_trait]
    impl BillingProvider for EmptyProvider {
        async fn list_subscriptions(
            &self,
            _customer_reference: &str,
        ) -> Result<Vec<ProviderSubscription>, ProviderError> {
            Ok(vec![])
        }

        async fn retrieve_invoice(
            &self,
            _invoice_id: &str,
        ) -> Result<ProviderInvoice, ProviderError> {
            Err(ProviderError::not_found("invoice"))
        }

        async fn list_charges(
            &self,
            _customer_reference: &str,
            _limit: u32,
        ) -> Result<Vec<ProviderCharge>, ProviderError> {
            Ok(vec![])
        }
    }

    fn test_state_with(account: Option<Account>) -> BillingAppState {
        let accounts = match account {
            Some(account) => InMemoryAccountRepository::with_account(account),
            None => InMemoryAccountRepository::new(),
        };
        BillingAppState {
            accounts: Arc::new(accounts),
            subscriptions: Arc::new(InMemorySubscriptionRepository::new()),
            payments: Arc::new(InMemoryPaymentRepository::new()),
            billing_provider: Arc::new(EmptyProvider),
            price_map: PriceTierMap::new(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Handler Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn reconcile_succeeds_for_existing_account() {
        let account = Account::new(AccountId::new(), "ana@example.com", AccountKind::Speaker);
        let state = test_state_with(Some(account.clone()));

        let request = ReconcileRequest {
            account_id: Some(account.id.to_string()),
        };

        let result = reconcile_account(State(state), Json(request)).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn missing_account_id_is_rejected() {
        let state = test_state_with(None);
        let request = ReconcileRequest { account_id: None };

        let response = reconcile_account(State(state), Json(request))
            .await
            .unwrap_err()
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_account_id_is_rejected() {
        let state = test_state_with(None);
        let request = ReconcileRequest {
            account_id: Some("not-a-uuid".to_string()),
        };

        let response = reconcile_account(State(state), Json(request))
            .await
            .unwrap_err()
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_account_maps_to_404() {
        let state = test_state_with(None);
        let request = ReconcileRequest {
            account_id: Some(AccountId::new().to_string()),
        };

        let response = reconcile_account(State(state), Json(request))
            .await
            .unwrap_err()
            .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn api_error_maps_not_found_to_404() {
        let err = BillingApiError(BillingError::account_not_found(AccountId::new()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn api_error_maps_validation_to_400() {
        let err = BillingApiError(BillingError::validation("accountId", "required"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_maps_infrastructure_to_500() {
        let err = BillingApiError(BillingError::infrastructure("database down"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
