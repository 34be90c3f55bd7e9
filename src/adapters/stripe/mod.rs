//! Stripe billing provider adapter.
//!
//! Implements the `BillingProvider` port over the Stripe REST API:
//! - Subscription listing (all statuses)
//! - Invoice retrieval
//! - Recent charge listing
//!
//! # Configuration
//!
//! Required environment variable:
//! - `STRIPE_API_KEY`: Stripe secret API key

mod api_types;
mod stripe_provider;

pub use api_types::{
    StripeCharge, StripeExpandable, StripeInvoice, StripeList, StripePrice, StripeRecurring,
    StripeSubscription, StripeSubscriptionItem,
};
pub use stripe_provider::{StripeBillingProvider, StripeConfig};
