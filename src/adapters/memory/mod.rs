//! In-memory repository adapters.
//!
//! Mutex-guarded vector implementations of the persistence ports, used
//! by tests and local development. They enforce the same external
//! reference uniqueness and `ended_at` immutability rules as the
//! PostgreSQL adapters.

mod stores;

pub use stores::{InMemoryAccountRepository, InMemoryPaymentRepository,
    InMemorySubscriptionRepository};
