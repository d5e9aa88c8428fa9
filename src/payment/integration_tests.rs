//! End-to-end payment flows over the in-memory ledger and store

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::reconcile::{Classification, Reconciler, ReconcilerConfig, RecordKind};
use super::service::{PaymentService, PaymentServiceImpl};
use super::types::{
    CreateDepositRequest, CreatePayoutRequest, ResolveDepositRequest, ResolvePayoutRequest,
};
use super::PaymentError;
use crate::ledger::engine::{CreateAccountError, CreateTransferError, EngineError, LedgerEngine};
use crate::ledger::types::{Account, AccountFilter, Transfer, TransferKind};
use crate::ledger::{InMemoryLedger, LedgerClient, LedgerSettings};
use crate::store::{
    CorrelationStore, DepositRecord, MemoryCorrelationStore, NewDeposit, NewPayout, PaymentStatus,
    PayoutRecord, PendingDeposit, PendingPayout, Resolution, StoreError,
};

// ============================================================================
// Test doubles
// ============================================================================

/// Engine wrapper counting `create_transfers` calls; can drop voids
struct CountingEngine {
    inner: InMemoryLedger,
    transfer_calls: AtomicUsize,
    fail_voids: AtomicBool,
}

impl CountingEngine {
    fn new() -> Self {
        Self {
            inner: InMemoryLedger::new(),
            transfer_calls: AtomicUsize::new(0),
            fail_voids: AtomicBool::new(false),
        }
    }

    fn fail_voids(&self) {
        self.fail_voids.store(true, Ordering::SeqCst);
    }

    fn transfer_calls(&self) -> usize {
        self.transfer_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LedgerEngine for CountingEngine {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn create_accounts(
        &self,
        accounts: &[Account],
    ) -> Result<Vec<CreateAccountError>, EngineError> {
        self.inner.create_accounts(accounts).await
    }

    async fn create_transfers(
        &self,
        transfers: &[Transfer],
    ) -> Result<Vec<CreateTransferError>, EngineError> {
        self.transfer_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_voids.load(Ordering::SeqCst)
            && transfers.iter().any(|t| t.kind() == TransferKind::VoidPending)
        {
            return Err(EngineError::Unavailable("ledger cluster unreachable".into()));
        }
        self.inner.create_transfers(transfers).await
    }

    async fn lookup_accounts(&self, ids: &[u128]) -> Result<Vec<Account>, EngineError> {
        self.inner.lookup_accounts(ids).await
    }

    async fn lookup_transfers(&self, ids: &[u128]) -> Result<Vec<Transfer>, EngineError> {
        self.inner.lookup_transfers(ids).await
    }

    async fn get_account_transfers(
        &self,
        filter: &AccountFilter,
    ) -> Result<Vec<Transfer>, EngineError> {
        self.inner.get_account_transfers(filter).await
    }
}

/// How `insert_payout` misbehaves
#[derive(Clone, Copy, PartialEq, Eq)]
enum PayoutInsertFault {
    None,
    Error,
    ZeroRows,
    Unique,
}

/// Store wrapper counting calls and injecting payout insert faults
struct InstrumentedStore {
    inner: MemoryCorrelationStore,
    payout_fault: PayoutInsertFault,
    calls: AtomicUsize,
}

impl InstrumentedStore {
    fn new(payout_fault: PayoutInsertFault) -> Self {
        Self {
            inner: MemoryCorrelationStore::new(),
            payout_fault,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CorrelationStore for InstrumentedStore {
    fn name(&self) -> &'static str {
        "instrumented"
    }

    async fn insert_pending_deposit(&self, deposit: &NewDeposit) -> Result<u64, StoreError> {
        self.hit();
        self.inner.insert_pending_deposit(deposit).await
    }

    async fn insert_posted_deposit(&self, deposit: &NewDeposit) -> Result<u64, StoreError> {
        self.hit();
        self.inner.insert_posted_deposit(deposit).await
    }

    async fn find_pending_deposit(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<PendingDeposit>, StoreError> {
        self.hit();
        self.inner.find_pending_deposit(payment_intent_id).await
    }

    async fn resolve_deposit(
        &self,
        transfer_id: &str,
        resolution: Resolution,
    ) -> Result<bool, StoreError> {
        self.hit();
        self.inner.resolve_deposit(transfer_id, resolution).await
    }

    async fn get_deposit(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<DepositRecord>, StoreError> {
        self.inner.get_deposit(payment_intent_id).await
    }

    async fn insert_payout(&self, payout: &NewPayout) -> Result<u64, StoreError> {
        self.hit();
        match self.payout_fault {
            PayoutInsertFault::None => self.inner.insert_payout(payout).await,
            PayoutInsertFault::Error => Err(StoreError::Database("connection reset".into())),
            PayoutInsertFault::ZeroRows => Ok(0),
            PayoutInsertFault::Unique => Err(StoreError::UniqueViolation("payouts_pkey".into())),
        }
    }

    async fn bind_payout_id(&self, transfer_id: &str, payout_id: &str) -> Result<bool, StoreError> {
        self.hit();
        self.inner.bind_payout_id(transfer_id, payout_id).await
    }

    async fn find_pending_payout(
        &self,
        payout_id: &str,
    ) -> Result<Option<PendingPayout>, StoreError> {
        self.hit();
        self.inner.find_pending_payout(payout_id).await
    }

    async fn resolve_payout(
        &self,
        payout_id: &str,
        resolution: Resolution,
    ) -> Result<bool, StoreError> {
        self.hit();
        self.inner.resolve_payout(payout_id, resolution).await
    }

    async fn get_payout(&self, transfer_id: &str) -> Result<Option<PayoutRecord>, StoreError> {
        self.inner.get_payout(transfer_id).await
    }

    async fn find_stale_deposits(
        &self,
        older_than: Duration,
        limit: u32,
    ) -> Result<Vec<DepositRecord>, StoreError> {
        self.inner.find_stale_deposits(older_than, limit).await
    }

    async fn find_stale_payouts(
        &self,
        older_than: Duration,
        limit: u32,
    ) -> Result<Vec<PayoutRecord>, StoreError> {
        self.inner.find_stale_payouts(older_than, limit).await
    }
}

// ============================================================================
// Fixture
// ============================================================================

struct Fixture {
    engine: Arc<CountingEngine>,
    store: Arc<InstrumentedStore>,
    ledger: Arc<LedgerClient>,
    service: PaymentServiceImpl,
    user: String,
}

impl Fixture {
    async fn new() -> Self {
        Self::with_fault(PayoutInsertFault::None).await
    }

    async fn with_fault(fault: PayoutInsertFault) -> Self {
        let engine = Arc::new(CountingEngine::new());
        let store = Arc::new(InstrumentedStore::new(fault));
        let ledger = Arc::new(LedgerClient::new(engine.clone(), LedgerSettings::default()));
        ledger.ensure_float_account().await.unwrap();
        let user = ledger.create_account().await.unwrap();
        let service = PaymentServiceImpl::new(ledger.clone(), store.clone());
        Self {
            engine,
            store,
            ledger,
            service,
            user,
        }
    }

    fn deposit(&self, payment_intent_id: &str, amount: &str) -> CreateDepositRequest {
        CreateDepositRequest {
            payment_intent_id: payment_intent_id.into(),
            customer_id: "cus_1".into(),
            user_id: self.user.clone(),
            amount: amount.into(),
        }
    }

    fn payout(&self, amount: &str) -> CreatePayoutRequest {
        CreatePayoutRequest {
            user_id: self.user.clone(),
            account_id: "acct_1".into(),
            amount: amount.into(),
        }
    }

    fn resolve_deposit(&self, transfer_id: &str, amount: &str) -> ResolveDepositRequest {
        ResolveDepositRequest {
            transfer_id: transfer_id.into(),
            user_id: self.user.clone(),
            amount: amount.into(),
        }
    }

    /// Fund the user with a posted deposit
    async fn fund(&self, amount: &str) {
        self.service
            .create_and_post_deposit(&self.deposit("pi_funding", amount))
            .await
            .unwrap();
    }

    /// Pending payout bound to `payout_id`
    async fn bound_payout(&self, amount: &str, payout_id: &str) -> String {
        let transfer_id = self
            .service
            .create_pending_payout(&self.payout(amount))
            .await
            .unwrap();
        self.service
            .set_payout_id(&transfer_id, payout_id)
            .await
            .unwrap();
        transfer_id
    }
}

fn resolve_payout(payout_id: &str, amount: &str) -> ResolvePayoutRequest {
    ResolvePayoutRequest {
        payout_id: payout_id.into(),
        amount: amount.into(),
    }
}

// ============================================================================
// Deposits
// ============================================================================

#[tokio::test]
async fn test_direct_deposit_posts_and_records() {
    let fx = Fixture::new().await;
    let transfer_id = fx
        .service
        .create_and_post_deposit(&fx.deposit("pi_1", "64"))
        .await
        .unwrap();

    let view = fx.ledger.lookup_transfer(&transfer_id).await.unwrap();
    assert!(view.posted);
    assert_eq!(view.debit_account_id, fx.user);
    assert_eq!(view.credit_account_id, "1");

    let row = fx.store.get_deposit("pi_1").await.unwrap().unwrap();
    assert_eq!(row.status, PaymentStatus::Posted);
    assert_eq!(row.transfer_id, transfer_id);
    assert!(row.posted_at.is_some());
}

#[tokio::test]
async fn test_duplicate_direct_deposit_is_conflict() {
    let fx = Fixture::new().await;
    fx.service
        .create_and_post_deposit(&fx.deposit("pi_1", "64"))
        .await
        .unwrap();

    let err = fx
        .service
        .create_and_post_deposit(&fx.deposit("pi_1", "64"))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::Conflict(_)));
    assert_eq!(fx.store.inner.deposit_count(), 1);
}

#[tokio::test]
async fn test_pending_deposit_lookup_then_post() {
    let fx = Fixture::new().await;
    assert_eq!(fx.service.get_pending_deposit("pi_1").await.unwrap(), None);

    let transfer_id = fx
        .service
        .create_pending_deposit(&fx.deposit("pi_1", "64"))
        .await
        .unwrap();
    let found = fx.service.get_pending_deposit("pi_1").await.unwrap().unwrap();
    assert_eq!(found.transfer_id, transfer_id);
    assert_eq!(found.user_id, fx.user);

    let resolved = fx
        .service
        .post_pending_deposit(&fx.resolve_deposit(&transfer_id, "64"))
        .await
        .unwrap();
    assert_eq!(resolved.transfer_id, transfer_id);
    assert_eq!(resolved.status, PaymentStatus::Posted);

    let view = fx.ledger.lookup_transfer(&transfer_id).await.unwrap();
    assert!(view.posted);
    let post = fx.ledger.lookup_transfer(&resolved.resolution_id).await.unwrap();
    assert_eq!(post.pending_id.as_deref(), Some(transfer_id.as_str()));

    let row = fx.store.get_deposit("pi_1").await.unwrap().unwrap();
    assert_eq!(row.status, PaymentStatus::Posted);
    assert!(row.voided_at.is_none());
    assert_eq!(fx.service.get_pending_deposit("pi_1").await.unwrap(), None);

    let account = fx.ledger.lookup_account(&fx.user).await.unwrap();
    assert_eq!(account.debits_posted, "64");
    assert_eq!(account.debits_pending, "0");
}

#[tokio::test]
async fn test_pending_deposit_void_releases_reservation() {
    let fx = Fixture::new().await;
    let transfer_id = fx
        .service
        .create_pending_deposit(&fx.deposit("pi_1", "64"))
        .await
        .unwrap();

    let resolved = fx
        .service
        .void_pending_deposit(&fx.resolve_deposit(&transfer_id, "64"))
        .await
        .unwrap();
    assert_eq!(resolved.status, PaymentStatus::Voided);

    assert!(fx.ledger.lookup_transfer(&transfer_id).await.unwrap().voided);
    let row = fx.store.get_deposit("pi_1").await.unwrap().unwrap();
    assert_eq!(row.status, PaymentStatus::Voided);
    assert!(row.voided_at.is_some());

    let account = fx.ledger.lookup_account(&fx.user).await.unwrap();
    assert_eq!(account.debits_pending, "0");
    assert_eq!(account.debits_posted, "0");
}

#[tokio::test]
async fn test_deposit_post_after_void_is_rejected_by_ledger() {
    let fx = Fixture::new().await;
    let transfer_id = fx
        .service
        .create_pending_deposit(&fx.deposit("pi_1", "64"))
        .await
        .unwrap();
    fx.service
        .void_pending_deposit(&fx.resolve_deposit(&transfer_id, "64"))
        .await
        .unwrap();

    let err = fx
        .service
        .post_pending_deposit(&fx.resolve_deposit(&transfer_id, "64"))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::Unexpected(_)));
    assert_eq!(
        fx.store.get_deposit("pi_1").await.unwrap().unwrap().status,
        PaymentStatus::Voided
    );
}

#[tokio::test]
async fn test_resolving_unknown_deposit_is_not_found() {
    let fx = Fixture::new().await;
    let err = fx
        .service
        .post_pending_deposit(&fx.resolve_deposit("deadbeef", "64"))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::NotFound(_)));
}

// ============================================================================
// Payouts
// ============================================================================

#[tokio::test]
async fn test_payout_lifecycle_post_once() {
    let fx = Fixture::new().await;
    fx.fund("64").await;

    let transfer_id = fx.bound_payout("32", "po_1").await;
    let row = fx.store.get_payout(&transfer_id).await.unwrap().unwrap();
    assert_eq!(row.status, PaymentStatus::Pending);
    assert_eq!(row.payout_id.as_deref(), Some("po_1"));
    assert_eq!(row.account_id, "acct_1");

    let view = fx.ledger.lookup_transfer(&transfer_id).await.unwrap();
    assert!(view.pending);
    assert_eq!(view.debit_account_id, "1");
    assert_eq!(view.credit_account_id, fx.user);

    let resolved = fx
        .service
        .post_pending_payout(&resolve_payout("po_1", "32"))
        .await
        .unwrap();
    assert_eq!(resolved.transfer_id, transfer_id);
    assert_eq!(resolved.status, PaymentStatus::Posted);
    assert!(fx.ledger.lookup_transfer(&transfer_id).await.unwrap().posted);

    // A second post never reaches the ledger
    let calls = fx.engine.transfer_calls();
    let err = fx
        .service
        .post_pending_payout(&resolve_payout("po_1", "32"))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::NotFound(_)));
    assert_eq!(fx.engine.transfer_calls(), calls);

    let row = fx.store.get_payout(&transfer_id).await.unwrap().unwrap();
    assert_eq!(row.status, PaymentStatus::Posted);
    assert!(row.posted_at.is_some());

    let account = fx.ledger.lookup_account(&fx.user).await.unwrap();
    assert_eq!(account.debits_posted, "64");
    assert_eq!(account.credits_posted, "32");
    assert_eq!(account.credits_pending, "0");
}

#[tokio::test]
async fn test_payout_void_after_post_is_not_found() {
    let fx = Fixture::new().await;
    fx.fund("64").await;
    fx.bound_payout("32", "po_1").await;

    fx.service
        .post_pending_payout(&resolve_payout("po_1", "32"))
        .await
        .unwrap();
    let err = fx
        .service
        .void_pending_payout(&resolve_payout("po_1", "32"))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::NotFound(_)));
}

#[tokio::test]
async fn test_payout_void_releases_reservation() {
    let fx = Fixture::new().await;
    fx.fund("64").await;
    let transfer_id = fx.bound_payout("64", "po_1").await;

    // Fully reserved: nothing left for another payout
    let err = fx
        .service
        .create_pending_payout(&fx.payout("1"))
        .await
        .unwrap_err();
    assert_eq!(err, PaymentError::NotEnoughFunds);

    let resolved = fx
        .service
        .void_pending_payout(&resolve_payout("po_1", "64"))
        .await
        .unwrap();
    assert_eq!(resolved.status, PaymentStatus::Voided);
    assert!(fx.ledger.lookup_transfer(&transfer_id).await.unwrap().voided);

    assert!(fx.service.create_pending_payout(&fx.payout("1")).await.is_ok());
}

#[tokio::test]
async fn test_payout_over_balance_writes_nothing() {
    let fx = Fixture::new().await;
    fx.fund("64").await;

    let err = fx
        .service
        .create_pending_payout(&fx.payout("65"))
        .await
        .unwrap_err();
    assert_eq!(err, PaymentError::NotEnoughFunds);
    assert_eq!(err.http_status(), 422);
    assert_eq!(fx.store.inner.payout_count(), 0);
}

#[tokio::test]
async fn test_failed_payout_insert_voids_reservation() {
    for fault in [PayoutInsertFault::Error, PayoutInsertFault::ZeroRows] {
        let fx = Fixture::with_fault(fault).await;
        fx.fund("64").await;

        let err = fx
            .service
            .create_pending_payout(&fx.payout("32"))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Unexpected(_)));

        // funding, reservation, compensating void
        assert_eq!(fx.engine.transfer_calls(), 3);
        let account = fx.ledger.lookup_account(&fx.user).await.unwrap();
        assert_eq!(account.credits_pending, "0");
        assert_eq!(account.credits_posted, "0");

        let history = fx
            .ledger
            .get_account_transfers(&fx.user, &Default::default())
            .await
            .unwrap();
        let reservation = history.iter().find(|t| t.flags == 2).unwrap();
        assert!(reservation.voided);
    }
}

#[tokio::test]
async fn test_payout_insert_conflict_is_conflict_after_compensation() {
    let fx = Fixture::with_fault(PayoutInsertFault::Unique).await;
    fx.fund("64").await;

    let err = fx
        .service
        .create_pending_payout(&fx.payout("32"))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::Conflict(_)), "{err:?}");
    assert_eq!(fx.engine.transfer_calls(), 3);
    let account = fx.ledger.lookup_account(&fx.user).await.unwrap();
    assert_eq!(account.credits_pending, "0");
}

#[tokio::test]
async fn test_failed_compensation_returns_insert_error() {
    let fx = Fixture::with_fault(PayoutInsertFault::Error).await;
    fx.fund("64").await;
    fx.engine.fail_voids();

    let err = fx
        .service
        .create_pending_payout(&fx.payout("32"))
        .await
        .unwrap_err();
    assert_eq!(err, PaymentError::from(StoreError::Database("connection reset".into())));

    // funding, reservation, one void attempt
    assert_eq!(fx.engine.transfer_calls(), 3);

    let account = fx.ledger.lookup_account(&fx.user).await.unwrap();
    assert_eq!(account.credits_pending, "32");
    let history = fx
        .ledger
        .get_account_transfers(&fx.user, &Default::default())
        .await
        .unwrap();
    let reservation = history.iter().find(|t| t.flags == 2).unwrap();
    assert!(reservation.pending);
    assert_eq!(fx.store.inner.payout_count(), 0);
}

#[tokio::test]
async fn test_set_payout_id_unknown_transfer_is_not_found() {
    let fx = Fixture::new().await;
    let err = fx.service.set_payout_id("abc", "po_1").await.unwrap_err();
    assert!(matches!(err, PaymentError::NotFound(_)));
}

#[tokio::test]
async fn test_payout_id_reuse_is_conflict() {
    let fx = Fixture::new().await;
    fx.fund("64").await;
    fx.bound_payout("1", "po_1").await;

    let second = fx
        .service
        .create_pending_payout(&fx.payout("1"))
        .await
        .unwrap();
    let err = fx.service.set_payout_id(&second, "po_1").await.unwrap_err();
    assert!(matches!(err, PaymentError::Conflict(_)));
    assert_eq!(err.http_status(), 409);
}

#[tokio::test]
async fn test_unknown_payout_is_not_found_before_ledger() {
    let fx = Fixture::new().await;
    let calls = fx.engine.transfer_calls();
    let err = fx
        .service
        .void_pending_payout(&resolve_payout("po_missing", "1"))
        .await
        .unwrap_err();
    assert!(matches!(err, PaymentError::NotFound(_)));
    assert_eq!(fx.engine.transfer_calls(), calls);
}

#[tokio::test]
async fn test_concurrent_payouts_are_independent() {
    let fx = Fixture::new().await;
    fx.fund("64").await;

    let a = fx.payout("32");
    let b = fx.payout("32");
    let (first, second) = tokio::join!(
        fx.service.create_pending_payout(&a),
        fx.service.create_pending_payout(&b)
    );
    let (first, second) = (first.unwrap(), second.unwrap());
    assert_ne!(first, second);
    assert_eq!(fx.store.inner.payout_count(), 2);

    let account = fx.ledger.lookup_account(&fx.user).await.unwrap();
    assert_eq!(account.credits_pending, "64");
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_malformed_input_touches_nothing() {
    let fx = Fixture::new().await;
    let ledger_calls = fx.engine.transfer_calls();

    let mut bad_amount = fx.deposit("pi_1", "xyz");
    assert!(matches!(
        fx.service.create_and_post_deposit(&bad_amount).await,
        Err(PaymentError::InvalidRequest(_))
    ));
    bad_amount.amount = "0".into();
    assert!(matches!(
        fx.service.create_pending_deposit(&bad_amount).await,
        Err(PaymentError::InvalidRequest(_))
    ));

    let bad_user = CreatePayoutRequest {
        user_id: "u1".into(),
        account_id: "acct_1".into(),
        amount: "32".into(),
    };
    assert!(matches!(
        fx.service.create_pending_payout(&bad_user).await,
        Err(PaymentError::InvalidRequest(_))
    ));
    assert!(matches!(
        fx.service.set_payout_id("not-hex", "po_1").await,
        Err(PaymentError::InvalidRequest(_))
    ));
    assert!(matches!(
        fx.service
            .post_pending_payout(&resolve_payout("", "32"))
            .await,
        Err(PaymentError::InvalidRequest(_))
    ));
    assert!(matches!(
        fx.service
            .void_pending_deposit(&fx.resolve_deposit("g", "1"))
            .await,
        Err(PaymentError::InvalidRequest(_))
    ));

    assert_eq!(fx.engine.transfer_calls(), ledger_calls);
    assert_eq!(fx.store.calls(), 0);
}

// ============================================================================
// Reconciliation
// ============================================================================

#[tokio::test]
async fn test_reconciler_flags_rows_behind_ledger() {
    let fx = Fixture::new().await;
    fx.fund("64").await;

    // Deposit resolved in the ledger, row left pending
    let lagging = fx
        .service
        .create_pending_deposit(&fx.deposit("pi_lag", "1"))
        .await
        .unwrap();
    fx.ledger
        .post_pending_transfer(&fx.user, "1", "1", &lagging)
        .await
        .unwrap();

    // Consistent pending payout
    let payout = fx.bound_payout("2", "po_1").await;

    // Row pointing at a transfer the ledger never saw
    fx.store
        .insert_pending_deposit(&NewDeposit {
            payment_intent_id: "pi_ghost".into(),
            transfer_id: "feed".into(),
            customer_id: "cus_1".into(),
            user_id: fx.user.clone(),
        })
        .await
        .unwrap();

    let reconciler = Reconciler::new(
        fx.ledger.clone(),
        fx.store.clone(),
        ReconcilerConfig::default(),
    );
    let report = reconciler.scan(Duration::ZERO).await.unwrap();
    assert_eq!(report.scanned(), 3);

    let classify = |key: &str| {
        report
            .findings
            .iter()
            .find(|f| f.key == key)
            .map(|f| (f.kind, f.classification))
            .unwrap()
    };
    assert_eq!(
        classify("pi_lag"),
        (RecordKind::Deposit, Classification::ResolvedPosted)
    );
    assert_eq!(
        classify("pi_ghost"),
        (RecordKind::Deposit, Classification::MissingInLedger)
    );
    assert_eq!(
        classify(&payout),
        (RecordKind::Payout, Classification::StillPending)
    );
    assert_eq!(report.discrepancies().count(), 2);

    // Read-only
    assert_eq!(
        fx.store.get_deposit("pi_lag").await.unwrap().unwrap().status,
        PaymentStatus::Pending
    );
}

#[tokio::test]
async fn test_reconciler_respects_age_threshold() {
    let fx = Fixture::new().await;
    fx.service
        .create_pending_deposit(&fx.deposit("pi_1", "1"))
        .await
        .unwrap();

    let reconciler = Reconciler::new(
        fx.ledger.clone(),
        fx.store.clone(),
        ReconcilerConfig::default(),
    );
    let report = reconciler.scan(Duration::from_secs(3600)).await.unwrap();
    assert_eq!(report.scanned(), 0);
}
