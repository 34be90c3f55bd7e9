//! Axum router configuration for billing endpoints.

use axum::{routing::post, Router};
use tower_http::cors::CorsLayer;

use super::handlers::{reconcile_account, BillingAppState};

/// Create the billing API router.
///
/// # Routes
///
/// - `POST /reconcile` - Reconcile billing provider state for an account
///
/// The reconcile endpoint is called from the browser after checkout
/// completes, so the router carries a permissive CORS layer; any origin
/// may call it. Non-POST methods are rejected by routing.
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/reconcile", post(reconcile_account))
        .layer(CorsLayer::permissive())
}

/// Create the complete billing module router, suitable for mounting at
/// `/api`.
///
/// # Example
///
/// ```ignore
/// use axum::Router;
/// use covetalks::adapters::http::billing::{billing_router, BillingAppState};
///
/// let app_state = BillingAppState { /* ... */ };
/// let app = Router::new()
///     .nest("/api", billing_router())
///     .with_state(app_state);
/// ```
pub fn billing_router() -> Router<BillingAppState> {
    Router::new().nest("/billing", billing_routes())
}
