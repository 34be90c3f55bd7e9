//! HTTP DTOs (Data Transfer Objects) for billing endpoints.
//!
//! These types define the JSON request/response structure for the
//! billing API. They serve as the boundary between HTTP and the
//! application layer.

use serde::{Deserialize, Serialize};

use crate::application::{FailureKind, ReconcileOutcome, RecordFailure};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to reconcile an account's billing records.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileRequest {
    /// The account to reconcile. Optional at the parsing layer so a
    /// missing field yields the API's own validation error envelope.
    #[serde(default)]
    pub account_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Per-record failure as exposed over the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFailureResponse {
    /// External reference the failure is attributed to.
    pub reference: String,
    /// Failure class ("provider" or "persistence").
    pub kind: String,
    /// Failure message.
    pub message: String,
}

impl From<RecordFailure> for RecordFailureResponse {
    fn from(failure: RecordFailure) -> Self {
        Self {
            reference: failure.reference,
            kind: match failure.kind {
                FailureKind::Provider => "provider".to_string(),
                FailureKind::Persistence => "persistence".to_string(),
            },
            message: failure.message,
        }
    }
}

/// Result buckets of a reconciliation pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReportResponse {
    /// External references of newly created subscription records.
    pub created: Vec<String>,
    /// External references of refreshed subscription records.
    pub updated: Vec<String>,
    /// Isolated per-subscription failures.
    pub errors: Vec<RecordFailureResponse>,
}

/// Response for a successful reconcile call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileResponse {
    pub success: bool,
    pub message: String,
    pub results: ReconcileReportResponse,
    pub has_active_subscription: bool,
    /// Best-effort invoice/charge sync failures, reported separately.
    pub charge_sync_errors: Vec<RecordFailureResponse>,
}

impl ReconcileResponse {
    /// Builds the API response from a reconciliation outcome.
    pub fn from_outcome(outcome: ReconcileOutcome) -> Self {
        Self {
            success: true,
            message: "Subscription sync completed".to_string(),
            results: ReconcileReportResponse {
                created: outcome.results.created,
                updated: outcome.results.updated,
                errors: outcome
                    .results
                    .errors
                    .into_iter()
                    .map(Into::into)
                    .collect(),
            },
            has_active_subscription: outcome.has_active_subscription,
            charge_sync_errors: outcome
                .charge_sync_errors
                .into_iter()
                .map(Into::into)
                .collect(),
        }
    }
}

/// Error response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
