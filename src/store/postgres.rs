//! PostgreSQL Correlation Store
//!
//! Tables live in the `banking` schema (see `sql/schema.sql`). Status
//! updates are CAS-style: `WHERE ... AND payment_status = 'pending'`, and
//! the affected-row count decides the outcome.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::error::StoreError;
use super::types::{
    DepositRecord, NewDeposit, NewPayout, PaymentStatus, PayoutRecord, PendingDeposit,
    PendingPayout, Resolution,
};
use super::CorrelationStore;

const DEPOSIT_COLUMNS: &str = "stripe_payment_intent_id, tigerbeetle_transfer_id, \
    stripe_customer_id, user_id, payment_status, created_at, posted_at, voided_at";

const PAYOUT_COLUMNS: &str = "tigerbeetle_transfer_id, stripe_account_id, user_id, \
    stripe_payout_id, payment_status, created_at, posted_at, voided_at";

/// PostgreSQL-backed correlation store
pub struct PgCorrelationStore {
    pool: PgPool,
}

impl PgCorrelationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn parse_status(row: &PgRow) -> Result<PaymentStatus, StoreError> {
        let raw: String = row.try_get("payment_status")?;
        PaymentStatus::parse(&raw)
            .ok_or_else(|| StoreError::Database(format!("Invalid payment_status: {}", raw)))
    }

    fn row_to_deposit(row: &PgRow) -> Result<DepositRecord, StoreError> {
        Ok(DepositRecord {
            payment_intent_id: row.try_get("stripe_payment_intent_id")?,
            transfer_id: row.try_get("tigerbeetle_transfer_id")?,
            customer_id: row.try_get("stripe_customer_id")?,
            user_id: row.try_get("user_id")?,
            status: Self::parse_status(row)?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            posted_at: row.try_get("posted_at")?,
            voided_at: row.try_get("voided_at")?,
        })
    }

    fn row_to_payout(row: &PgRow) -> Result<PayoutRecord, StoreError> {
        Ok(PayoutRecord {
            transfer_id: row.try_get("tigerbeetle_transfer_id")?,
            account_id: row.try_get("stripe_account_id")?,
            user_id: row.try_get("user_id")?,
            payout_id: row.try_get("stripe_payout_id")?,
            status: Self::parse_status(row)?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            posted_at: row.try_get("posted_at")?,
            voided_at: row.try_get("voided_at")?,
        })
    }

    async fn insert_deposit(
        &self,
        deposit: &NewDeposit,
        status: PaymentStatus,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO banking.deposits
                (stripe_payment_intent_id, tigerbeetle_transfer_id, stripe_customer_id,
                 user_id, payment_status, posted_at)
            VALUES ($1, $2, $3, $4, $5, CASE WHEN $5 = 'posted' THEN NOW() END)
            "#,
        )
        .bind(&deposit.payment_intent_id)
        .bind(&deposit.transfer_id)
        .bind(&deposit.customer_id)
        .bind(&deposit.user_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl CorrelationStore for PgCorrelationStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn insert_pending_deposit(&self, deposit: &NewDeposit) -> Result<u64, StoreError> {
        self.insert_deposit(deposit, PaymentStatus::Pending).await
    }

    async fn insert_posted_deposit(&self, deposit: &NewDeposit) -> Result<u64, StoreError> {
        self.insert_deposit(deposit, PaymentStatus::Posted).await
    }

    async fn find_pending_deposit(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<PendingDeposit>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT tigerbeetle_transfer_id, user_id
            FROM banking.deposits
            WHERE stripe_payment_intent_id = $1
              AND payment_status = 'pending'
            "#,
        )
        .bind(payment_intent_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(PendingDeposit {
                transfer_id: row.try_get("tigerbeetle_transfer_id")?,
                user_id: row.try_get("user_id")?,
            })),
            None => Ok(None),
        }
    }

    async fn resolve_deposit(
        &self,
        transfer_id: &str,
        resolution: Resolution,
    ) -> Result<bool, StoreError> {
        let sql = match resolution {
            Resolution::Posted => {
                r#"
                UPDATE banking.deposits
                SET payment_status = 'posted', posted_at = NOW()
                WHERE tigerbeetle_transfer_id = $1
                  AND payment_status = 'pending'
                "#
            }
            Resolution::Voided => {
                r#"
                UPDATE banking.deposits
                SET payment_status = 'voided', voided_at = NOW()
                WHERE tigerbeetle_transfer_id = $1
                  AND payment_status = 'pending'
                "#
            }
        };

        let result = sqlx::query(sql)
            .bind(transfer_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_deposit(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<DepositRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM banking.deposits WHERE stripe_payment_intent_id = $1",
            DEPOSIT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(payment_intent_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_deposit).transpose()
    }

    async fn insert_payout(&self, payout: &NewPayout) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO banking.payouts
                (tigerbeetle_transfer_id, stripe_account_id, user_id, payment_status)
            VALUES ($1, $2, $3, 'pending')
            "#,
        )
        .bind(&payout.transfer_id)
        .bind(&payout.account_id)
        .bind(&payout.user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn bind_payout_id(&self, transfer_id: &str, payout_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE banking.payouts
            SET stripe_payout_id = $1
            WHERE tigerbeetle_transfer_id = $2
            "#,
        )
        .bind(payout_id)
        .bind(transfer_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_pending_payout(
        &self,
        payout_id: &str,
    ) -> Result<Option<PendingPayout>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT tigerbeetle_transfer_id, user_id
            FROM banking.payouts
            WHERE stripe_payout_id = $1
              AND payment_status = 'pending'
            "#,
        )
        .bind(payout_id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(PendingPayout {
                transfer_id: row.try_get("tigerbeetle_transfer_id")?,
                user_id: row.try_get("user_id")?,
            })),
            None => Ok(None),
        }
    }

    async fn resolve_payout(
        &self,
        payout_id: &str,
        resolution: Resolution,
    ) -> Result<bool, StoreError> {
        let sql = match resolution {
            Resolution::Posted => {
                r#"
                UPDATE banking.payouts
                SET payment_status = 'posted', posted_at = NOW()
                WHERE stripe_payout_id = $1
                  AND payment_status = 'pending'
                "#
            }
            Resolution::Voided => {
                r#"
                UPDATE banking.payouts
                SET payment_status = 'voided', voided_at = NOW()
                WHERE stripe_payout_id = $1
                  AND payment_status = 'pending'
                "#
            }
        };

        let result = sqlx::query(sql)
            .bind(payout_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_payout(&self, transfer_id: &str) -> Result<Option<PayoutRecord>, StoreError> {
        let sql = format!(
            "SELECT {} FROM banking.payouts WHERE tigerbeetle_transfer_id = $1",
            PAYOUT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(transfer_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::row_to_payout).transpose()
    }

    async fn find_stale_deposits(
        &self,
        older_than: Duration,
        limit: u32,
    ) -> Result<Vec<DepositRecord>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM banking.deposits
            WHERE payment_status = 'pending'
              AND created_at < NOW() - INTERVAL '1 second' * $1
            ORDER BY created_at ASC
            LIMIT $2
            "#,
            DEPOSIT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(older_than.as_secs() as i64)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_deposit).collect()
    }

    async fn find_stale_payouts(
        &self,
        older_than: Duration,
        limit: u32,
    ) -> Result<Vec<PayoutRecord>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM banking.payouts
            WHERE payment_status = 'pending'
              AND created_at < NOW() - INTERVAL '1 second' * $1
            ORDER BY created_at ASC
            LIMIT $2
            "#,
            PAYOUT_COLUMNS
        );
        let rows = sqlx::query(&sql)
            .bind(older_than.as_secs() as i64)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(Self::row_to_payout).collect()
    }
}
