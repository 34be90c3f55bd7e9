//! Application layer - workflows orchestrating domain and ports.

mod reconciler;

pub use reconciler::{
    map_billing_period, map_subscription_status, FailureKind, ReconcileOutcome, ReconcileReport,
    Reconciler, RecordFailure,
};
