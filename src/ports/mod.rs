//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Billing Ports
//!
//! - `BillingProvider` - Read-side contract for the external payment
//!   service (subscriptions, invoices, charges)
//!
//! ## Persistence Ports
//!
//! - `AccountRepository` - Account lookup
//! - `SubscriptionRepository` - Subscription record persistence
//! - `PaymentRepository` - Payment record persistence

mod account_repository;
mod billing_provider;
mod payment_repository;
mod subscription_repository;

pub use account_repository::AccountRepository;
pub use billing_provider::{
    BillingProvider, LatestInvoice, ProviderCharge, ProviderChargeStatus, ProviderError,
    ProviderErrorCode, ProviderInvoice, ProviderInvoiceStatus, ProviderSubscription,
    ProviderSubscriptionStatus, RecurringInterval,
};
pub use payment_repository::PaymentRepository;
pub use subscription_repository::SubscriptionRepository;
