//! Correlation Store
//!
//! Relational rows linking payment-processor identifiers to ledger
//! transfers. Every status change is conditional on `status = 'pending'`
//! and reports whether a row was actually updated; uniqueness of payment
//! intent, transfer and payout IDs is enforced by the store.
//!
//! Backends:
//! - [`PgCorrelationStore`]: PostgreSQL (`banking` schema)
//! - [`MemoryCorrelationStore`]: in-process, for development and tests

pub mod error;
pub mod memory;
pub mod postgres;
pub mod types;

pub use error::StoreError;
pub use memory::MemoryCorrelationStore;
pub use postgres::PgCorrelationStore;
pub use types::{
    DepositRecord, NewDeposit, NewPayout, PaymentStatus, PayoutRecord, PendingDeposit,
    PendingPayout, Resolution,
};

use std::time::Duration;

use async_trait::async_trait;

/// Deposit and payout correlation records
#[async_trait]
pub trait CorrelationStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    // === Deposits ===

    /// Insert a `pending` deposit row; returns affected rows
    async fn insert_pending_deposit(&self, deposit: &NewDeposit) -> Result<u64, StoreError>;

    /// Insert a `posted` deposit row (`posted_at = now`); returns affected rows
    async fn insert_posted_deposit(&self, deposit: &NewDeposit) -> Result<u64, StoreError>;

    /// Ledger reference of the `pending` row for a payment intent
    async fn find_pending_deposit(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<PendingDeposit>, StoreError>;

    /// Resolve the `pending` row for a transfer
    ///
    /// Returns false if no pending row matched.
    async fn resolve_deposit(
        &self,
        transfer_id: &str,
        resolution: Resolution,
    ) -> Result<bool, StoreError>;

    async fn get_deposit(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<DepositRecord>, StoreError>;

    // === Payouts ===

    /// Insert a `pending` payout row keyed by transfer ID; returns affected rows
    async fn insert_payout(&self, payout: &NewPayout) -> Result<u64, StoreError>;

    /// Bind the external payout ID to the row for `transfer_id`
    ///
    /// Returns false if no row matched.
    async fn bind_payout_id(&self, transfer_id: &str, payout_id: &str) -> Result<bool, StoreError>;

    /// Ledger reference of the `pending` row bound to `payout_id`
    async fn find_pending_payout(&self, payout_id: &str)
    -> Result<Option<PendingPayout>, StoreError>;

    /// Resolve the `pending` row bound to `payout_id`
    ///
    /// Returns false if no pending row matched.
    async fn resolve_payout(
        &self,
        payout_id: &str,
        resolution: Resolution,
    ) -> Result<bool, StoreError>;

    async fn get_payout(&self, transfer_id: &str) -> Result<Option<PayoutRecord>, StoreError>;

    // === Reconciliation ===

    /// `pending` deposits created more than `older_than` ago, oldest first
    async fn find_stale_deposits(
        &self,
        older_than: Duration,
        limit: u32,
    ) -> Result<Vec<DepositRecord>, StoreError>;

    /// `pending` payouts created more than `older_than` ago, oldest first
    async fn find_stale_payouts(
        &self,
        older_than: Duration,
        limit: u32,
    ) -> Result<Vec<PayoutRecord>, StoreError>;
}
