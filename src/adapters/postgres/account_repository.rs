//! PostgreSQL implementation of AccountRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::account::{Account, AccountKind};
use crate::domain::foundation::{AccountId, DomainError, ErrorCode, Timestamp};
use crate::ports::AccountRepository;

use super::map_sqlx_error;

/// PostgreSQL implementation of the AccountRepository port.
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of an account.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    kind: String,
    billing_customer_reference: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = DomainError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: AccountId::from_uuid(row.id),
            email: row.email,
            kind: parse_kind(&row.kind)?,
            billing_customer_reference: row.billing_customer_reference,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_kind(s: &str) -> Result<AccountKind, DomainError> {
    match s {
        "speaker" => Ok(AccountKind::Speaker),
        "organization" => Ok(AccountKind::Organization),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid account kind value: {}", s),
        )),
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, DomainError> {
        let row: Option<AccountRow> = sqlx::query_as(
            r#"
            SELECT id, email, kind, billing_customer_reference, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(Account::try_from).transpose()
    }

    async fn set_billing_customer_reference(
        &self,
        id: &AccountId,
        reference: &str,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET billing_customer_reference = $2
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(reference)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::AccountNotFound,
                format!("Account not found: {}", id),
            ));
        }
        Ok(())
    }
}
