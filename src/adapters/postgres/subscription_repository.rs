//! PostgreSQL implementation of SubscriptionRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::billing::{
    BillingPeriod, NewSubscriptionRecord, PlanTier, SubscriptionPatch, SubscriptionRecord,
    SubscriptionState,
};
use crate::domain::foundation::{
    AccountId, DomainError, ErrorCode, SubscriptionRecordId, Timestamp,
};
use crate::ports::SubscriptionRepository;

use super::map_sqlx_error;

/// PostgreSQL implementation of the SubscriptionRepository port.
///
/// The `ended_at` column is written with `COALESCE(ended_at, $new)` so a
/// recorded cancellation time can never be overwritten or cleared, even
/// by a buggy caller.
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    /// Creates a new repository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a subscription record.
#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    account_id: Uuid,
    external_reference: String,
    plan_tier: String,
    billing_period: String,
    status: String,
    amount: f64,
    period_end: DateTime<Utc>,
    created_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl TryFrom<SubscriptionRow> for SubscriptionRecord {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(SubscriptionRecord {
            id: SubscriptionRecordId::from_uuid(row.id),
            account_id: AccountId::from_uuid(row.account_id),
            external_reference: row.external_reference,
            plan_tier: parse_tier(&row.plan_tier)?,
            billing_period: parse_period(&row.billing_period)?,
            status: parse_status(&row.status)?,
            amount: row.amount,
            period_end: Timestamp::from_datetime(row.period_end),
            created_at: Timestamp::from_datetime(row.created_at),
            ended_at: row.ended_at.map(Timestamp::from_datetime),
        })
    }
}

fn parse_tier(s: &str) -> Result<PlanTier, DomainError> {
    match s {
        "standard" => Ok(PlanTier::Standard),
        "plus" => Ok(PlanTier::Plus),
        "premium" => Ok(PlanTier::Premium),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid plan tier value: {}", s),
        )),
    }
}

fn tier_to_string(tier: PlanTier) -> &'static str {
    match tier {
        PlanTier::Standard => "standard",
        PlanTier::Plus => "plus",
        PlanTier::Premium => "premium",
    }
}

fn parse_period(s: &str) -> Result<BillingPeriod, DomainError> {
    match s {
        "monthly" => Ok(BillingPeriod::Monthly),
        "yearly" => Ok(BillingPeriod::Yearly),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid billing period value: {}", s),
        )),
    }
}

fn period_to_string(period: BillingPeriod) -> &'static str {
    match period {
        BillingPeriod::Monthly => "monthly",
        BillingPeriod::Yearly => "yearly",
    }
}

fn parse_status(s: &str) -> Result<SubscriptionState, DomainError> {
    match s {
        "active" => Ok(SubscriptionState::Active),
        "past_due" => Ok(SubscriptionState::PastDue),
        "cancelled" => Ok(SubscriptionState::Cancelled),
        "incomplete" => Ok(SubscriptionState::Incomplete),
        "trialing" => Ok(SubscriptionState::Trialing),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid subscription status value: {}", s),
        )),
    }
}

fn status_to_string(status: SubscriptionState) -> &'static str {
    match status {
        SubscriptionState::Active => "active",
        SubscriptionState::PastDue => "past_due",
        SubscriptionState::Cancelled => "cancelled",
        SubscriptionState::Incomplete => "incomplete",
        SubscriptionState::Trialing => "trialing",
    }
}

const COLUMNS: &str = "id, account_id, external_reference, plan_tier, billing_period, status, \
                       amount, period_end, created_at, ended_at";

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn find_by_external_reference(
        &self,
        reference: &str,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            "SELECT {} FROM subscription_records WHERE external_reference = $1",
            COLUMNS
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(SubscriptionRecord::try_from).transpose()
    }

    async fn insert(
        &self,
        record: NewSubscriptionRecord,
    ) -> Result<SubscriptionRecord, DomainError> {
        let id = SubscriptionRecordId::new();

        let row: SubscriptionRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO subscription_records
                (id, account_id, external_reference, plan_tier, billing_period,
                 status, amount, period_end, created_at, ended_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(record.account_id.as_uuid())
        .bind(&record.external_reference)
        .bind(tier_to_string(record.plan_tier))
        .bind(period_to_string(record.billing_period))
        .bind(status_to_string(record.status))
        .bind(record.amount)
        .bind(record.period_end.as_datetime())
        .bind(record.created_at.as_datetime())
        .bind(record.ended_at.map(|ts| *ts.as_datetime()))
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.try_into()
    }

    async fn update(
        &self,
        id: &SubscriptionRecordId,
        patch: SubscriptionPatch,
    ) -> Result<SubscriptionRecord, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            UPDATE subscription_records
            SET status = $2,
                plan_tier = $3,
                billing_period = $4,
                amount = $5,
                period_end = $6,
                ended_at = COALESCE(ended_at, $7)
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(status_to_string(patch.status))
        .bind(tier_to_string(patch.plan_tier))
        .bind(period_to_string(patch.billing_period))
        .bind(patch.amount)
        .bind(patch.period_end.as_datetime())
        .bind(patch.ended_at.map(|ts| *ts.as_datetime()))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.ok_or_else(|| {
            DomainError::new(
                ErrorCode::SubscriptionNotFound,
                format!("Subscription record not found: {}", id),
            )
        })?
        .try_into()
    }

    async fn latest_for_account(
        &self,
        account_id: &AccountId,
    ) -> Result<Option<SubscriptionRecord>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {}
            FROM subscription_records
            WHERE account_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            COLUMNS
        ))
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(SubscriptionRecord::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_round_trips_through_storage_strings() {
        for tier in [PlanTier::Standard, PlanTier::Plus, PlanTier::Premium] {
            assert_eq!(parse_tier(tier_to_string(tier)).unwrap(), tier);
        }
    }

    #[test]
    fn period_round_trips_through_storage_strings() {
        for period in [BillingPeriod::Monthly, BillingPeriod::Yearly] {
            assert_eq!(parse_period(period_to_string(period)).unwrap(), period);
        }
    }

    #[test]
    fn status_round_trips_through_storage_strings() {
        for status in [
            SubscriptionState::Active,
            SubscriptionState::PastDue,
            SubscriptionState::Cancelled,
            SubscriptionState::Incomplete,
            SubscriptionState::Trialing,
        ] {
            assert_eq!(parse_status(status_to_string(status)).unwrap(), status);
        }
    }

    #[test]
    fn unknown_storage_values_are_rejected() {
        assert!(parse_tier("gold").is_err());
        assert!(parse_period("weekly").is_err());
        assert!(parse_status("paused").is_err());
    }
}
