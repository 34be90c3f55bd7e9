//! PostgreSQL implementation of PaymentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{NewPaymentRecord, PaymentRecord, PaymentState};
use crate::domain::foundation::{
    AccountId, DomainError, ErrorCode, PaymentRecordId, SubscriptionRecordId, Timestamp,
};
use crate::ports::PaymentRepository;

use super::map_sqlx_error;

/// PostgreSQL implementation of the PaymentRepository port.
pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a payment record.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: Uuid,
    subscription_id: Option<Uuid>,
    account_id: Uuid,
    external_reference: String,
    amount: f64,
    status: String,
    receipt_url: Option<String>,
    description: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(PaymentRecord {
            id: PaymentRecordId::from_uuid(row.id),
            subscription_id: row.subscription_id.map(SubscriptionRecordId::from_uuid),
            account_id: AccountId::from_uuid(row.account_id),
            external_reference: row.external_reference,
            amount: row.amount,
            status: parse_status(&row.status)?,
            receipt_url: row.receipt_url,
            description: row.description,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_status(s: &str) -> Result<PaymentState, DomainError> {
    match s {
        "succeeded" => Ok(PaymentState::Succeeded),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid payment status value: {}", s),
        )),
    }
}

fn status_to_string(status: PaymentState) -> &'static str {
    match status {
        PaymentState::Succeeded => "succeeded",
    }
}

const COLUMNS: &str = "id, subscription_id, account_id, external_reference, amount, status, \
                       receipt_url, description, created_at";

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn find_by_external_reference(
        &self,
        reference: &str,
    ) -> Result<Option<PaymentRecord>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payment_records WHERE external_reference = $1",
            COLUMNS
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(PaymentRecord::try_from).transpose()
    }

    async fn insert(&self, record: NewPaymentRecord) -> Result<PaymentRecord, DomainError> {
        let id = PaymentRecordId::new();

        let row: PaymentRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO payment_records
                (id, subscription_id, account_id, external_reference, amount,
                 status, receipt_url, description, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(record.subscription_id.map(|s| *s.as_uuid()))
        .bind(record.account_id.as_uuid())
        .bind(&record.external_reference)
        .bind(record.amount)
        .bind(status_to_string(record.status))
        .bind(&record.receipt_url)
        .bind(&record.description)
        .bind(record.created_at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_storage_strings() {
        assert_eq!(
            parse_status(status_to_string(PaymentState::Succeeded)).unwrap(),
            PaymentState::Succeeded
        );
    }

    #[test]
    fn unknown_storage_values_are_rejected() {
        assert!(parse_status("refunded").is_err());
    }
}
