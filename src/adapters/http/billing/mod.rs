//! Billing HTTP module.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ErrorResponse, ReconcileRequest, ReconcileReportResponse, ReconcileResponse,
    RecordFailureResponse,
};
pub use handlers::{reconcile_account, BillingApiError, BillingAppState};
pub use routes::{billing_router, billing_routes};
