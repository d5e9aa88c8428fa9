//! In-process Correlation Store
//!
//! Same constraints as the `banking` schema: unique payment intent, transfer
//! and payout IDs, and pending-only status transitions.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};

use super::CorrelationStore;
use super::error::StoreError;
use super::types::{
    DepositRecord, NewDeposit, NewPayout, PaymentStatus, PayoutRecord, PendingDeposit,
    PendingPayout, Resolution,
};

/// Creation time before which a row counts as stale
fn stale_cutoff(older_than: Duration) -> DateTime<Utc> {
    let now = Utc::now();
    TimeDelta::from_std(older_than)
        .ok()
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[derive(Default)]
struct Tables {
    deposits: Vec<DepositRecord>,
    payouts: Vec<PayoutRecord>,
}

/// In-memory correlation store
#[derive(Default)]
pub struct MemoryCorrelationStore {
    tables: Mutex<Tables>,
}

impl MemoryCorrelationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert_deposit(
        &self,
        deposit: &NewDeposit,
        status: PaymentStatus,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables();
        if tables
            .deposits
            .iter()
            .any(|d| d.payment_intent_id == deposit.payment_intent_id)
        {
            return Err(StoreError::UniqueViolation(format!(
                "stripe_payment_intent_id {}",
                deposit.payment_intent_id
            )));
        }
        if tables
            .deposits
            .iter()
            .any(|d| d.transfer_id == deposit.transfer_id)
        {
            return Err(StoreError::UniqueViolation(format!(
                "tigerbeetle_transfer_id {}",
                deposit.transfer_id
            )));
        }

        let now = Utc::now();
        tables.deposits.push(DepositRecord {
            payment_intent_id: deposit.payment_intent_id.clone(),
            transfer_id: deposit.transfer_id.clone(),
            customer_id: deposit.customer_id.clone(),
            user_id: deposit.user_id.clone(),
            status,
            created_at: now,
            posted_at: (status == PaymentStatus::Posted).then_some(now),
            voided_at: None,
        });
        Ok(1)
    }

    /// Number of deposit rows
    pub fn deposit_count(&self) -> usize {
        self.tables().deposits.len()
    }

    /// Number of payout rows
    pub fn payout_count(&self) -> usize {
        self.tables().payouts.len()
    }
}

#[async_trait]
impl CorrelationStore for MemoryCorrelationStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn insert_pending_deposit(&self, deposit: &NewDeposit) -> Result<u64, StoreError> {
        self.insert_deposit(deposit, PaymentStatus::Pending)
    }

    async fn insert_posted_deposit(&self, deposit: &NewDeposit) -> Result<u64, StoreError> {
        self.insert_deposit(deposit, PaymentStatus::Posted)
    }

    async fn find_pending_deposit(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<PendingDeposit>, StoreError> {
        Ok(self
            .tables()
            .deposits
            .iter()
            .find(|d| d.payment_intent_id == payment_intent_id && d.status == PaymentStatus::Pending)
            .map(|d| PendingDeposit {
                transfer_id: d.transfer_id.clone(),
                user_id: d.user_id.clone(),
            }))
    }

    async fn resolve_deposit(
        &self,
        transfer_id: &str,
        resolution: Resolution,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables();
        let Some(row) = tables
            .deposits
            .iter_mut()
            .find(|d| d.transfer_id == transfer_id && d.status == PaymentStatus::Pending)
        else {
            return Ok(false);
        };

        let now = Utc::now();
        row.status = resolution.status();
        match resolution {
            Resolution::Posted => row.posted_at = Some(now),
            Resolution::Voided => row.voided_at = Some(now),
        }
        Ok(true)
    }

    async fn get_deposit(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<DepositRecord>, StoreError> {
        Ok(self
            .tables()
            .deposits
            .iter()
            .find(|d| d.payment_intent_id == payment_intent_id)
            .cloned())
    }

    async fn insert_payout(&self, payout: &NewPayout) -> Result<u64, StoreError> {
        let mut tables = self.tables();
        if tables
            .payouts
            .iter()
            .any(|p| p.transfer_id == payout.transfer_id)
        {
            return Err(StoreError::UniqueViolation(format!(
                "tigerbeetle_transfer_id {}",
                payout.transfer_id
            )));
        }

        tables.payouts.push(PayoutRecord {
            transfer_id: payout.transfer_id.clone(),
            account_id: payout.account_id.clone(),
            user_id: payout.user_id.clone(),
            payout_id: None,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
            posted_at: None,
            voided_at: None,
        });
        Ok(1)
    }

    async fn bind_payout_id(&self, transfer_id: &str, payout_id: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables();
        if tables
            .payouts
            .iter()
            .any(|p| p.transfer_id != transfer_id && p.payout_id.as_deref() == Some(payout_id))
        {
            return Err(StoreError::UniqueViolation(format!(
                "stripe_payout_id {}",
                payout_id
            )));
        }

        match tables.payouts.iter_mut().find(|p| p.transfer_id == transfer_id) {
            Some(row) => {
                row.payout_id = Some(payout_id.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_pending_payout(
        &self,
        payout_id: &str,
    ) -> Result<Option<PendingPayout>, StoreError> {
        Ok(self
            .tables()
            .payouts
            .iter()
            .find(|p| {
                p.payout_id.as_deref() == Some(payout_id) && p.status == PaymentStatus::Pending
            })
            .map(|p| PendingPayout {
                transfer_id: p.transfer_id.clone(),
                user_id: p.user_id.clone(),
            }))
    }

    async fn resolve_payout(
        &self,
        payout_id: &str,
        resolution: Resolution,
    ) -> Result<bool, StoreError> {
        let mut tables = self.tables();
        let Some(row) = tables.payouts.iter_mut().find(|p| {
            p.payout_id.as_deref() == Some(payout_id) && p.status == PaymentStatus::Pending
        }) else {
            return Ok(false);
        };

        let now = Utc::now();
        row.status = resolution.status();
        match resolution {
            Resolution::Posted => row.posted_at = Some(now),
            Resolution::Voided => row.voided_at = Some(now),
        }
        Ok(true)
    }

    async fn get_payout(&self, transfer_id: &str) -> Result<Option<PayoutRecord>, StoreError> {
        Ok(self
            .tables()
            .payouts
            .iter()
            .find(|p| p.transfer_id == transfer_id)
            .cloned())
    }

    async fn find_stale_deposits(
        &self,
        older_than: Duration,
        limit: u32,
    ) -> Result<Vec<DepositRecord>, StoreError> {
        let cutoff = stale_cutoff(older_than);
        let mut rows: Vec<DepositRecord> = self
            .tables()
            .deposits
            .iter()
            .filter(|d| d.status == PaymentStatus::Pending && d.created_at <= cutoff)
            .cloned()
            .collect();
        rows.sort_by_key(|d| d.created_at);
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn find_stale_payouts(
        &self,
        older_than: Duration,
        limit: u32,
    ) -> Result<Vec<PayoutRecord>, StoreError> {
        let cutoff = stale_cutoff(older_than);
        let mut rows: Vec<PayoutRecord> = self
            .tables()
            .payouts
            .iter()
            .filter(|p| p.status == PaymentStatus::Pending && p.created_at <= cutoff)
            .cloned()
            .collect();
        rows.sort_by_key(|p| p.created_at);
        rows.truncate(limit as usize);
        Ok(rows)
    }
}
