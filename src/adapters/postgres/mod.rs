//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! Uses sqlx with connection pooling. Unique indexes on the external
//! reference columns back the reconciler's idempotence: violations are
//! surfaced as `AlreadyExists` so a lost insert race reads as "already
//! recorded" instead of a failure.

mod account_repository;
mod payment_repository;
mod subscription_repository;

pub use account_repository::PostgresAccountRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use subscription_repository::PostgresSubscriptionRepository;

use crate::domain::foundation::DomainError;

/// Postgres error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Translate an sqlx error into the domain error currency.
pub(crate) fn map_sqlx_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return DomainError::already_exists(db_err.message().to_string());
        }
    }
    DomainError::database(err.to_string())
}
