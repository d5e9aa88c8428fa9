//! Payment Service surface
//!
//! [`PaymentService`] lists every payment operation with a default body that
//! fails with `Unexpected`, so partial implementations (test doubles, staged
//! rollouts) only override what they support. [`PaymentServiceImpl`]
//! implements all of them on top of the two orchestrators.

use std::sync::Arc;

use async_trait::async_trait;

use super::deposit::DepositOrchestrator;
use super::error::PaymentError;
use super::payout::PayoutOrchestrator;
use super::types::{
    CreateDepositRequest, CreatePayoutRequest, PendingDepositResponse, ResolveDepositRequest,
    ResolvePayoutRequest, ResolvedTransfer,
};
use crate::ledger::LedgerClient;
use crate::store::CorrelationStore;

#[async_trait]
pub trait PaymentService: Send + Sync {
    // === Deposits ===

    async fn create_and_post_deposit(
        &self,
        _req: &CreateDepositRequest,
    ) -> Result<String, PaymentError> {
        Err(PaymentError::not_implemented("create_and_post_deposit"))
    }

    async fn create_pending_deposit(
        &self,
        _req: &CreateDepositRequest,
    ) -> Result<String, PaymentError> {
        Err(PaymentError::not_implemented("create_pending_deposit"))
    }

    async fn get_pending_deposit(
        &self,
        _payment_intent_id: &str,
    ) -> Result<Option<PendingDepositResponse>, PaymentError> {
        Err(PaymentError::not_implemented("get_pending_deposit"))
    }

    async fn post_pending_deposit(
        &self,
        _req: &ResolveDepositRequest,
    ) -> Result<ResolvedTransfer, PaymentError> {
        Err(PaymentError::not_implemented("post_pending_deposit"))
    }

    async fn void_pending_deposit(
        &self,
        _req: &ResolveDepositRequest,
    ) -> Result<ResolvedTransfer, PaymentError> {
        Err(PaymentError::not_implemented("void_pending_deposit"))
    }

    // === Payouts ===

    async fn create_pending_payout(
        &self,
        _req: &CreatePayoutRequest,
    ) -> Result<String, PaymentError> {
        Err(PaymentError::not_implemented("create_pending_payout"))
    }

    async fn set_payout_id(&self, _transfer_id: &str, _payout_id: &str) -> Result<(), PaymentError> {
        Err(PaymentError::not_implemented("set_payout_id"))
    }

    async fn post_pending_payout(
        &self,
        _req: &ResolvePayoutRequest,
    ) -> Result<ResolvedTransfer, PaymentError> {
        Err(PaymentError::not_implemented("post_pending_payout"))
    }

    async fn void_pending_payout(
        &self,
        _req: &ResolvePayoutRequest,
    ) -> Result<ResolvedTransfer, PaymentError> {
        Err(PaymentError::not_implemented("void_pending_payout"))
    }
}

/// Deposit and payout orchestration over one ledger and one store
pub struct PaymentServiceImpl {
    deposits: DepositOrchestrator,
    payouts: PayoutOrchestrator,
}

impl PaymentServiceImpl {
    pub fn new(ledger: Arc<LedgerClient>, store: Arc<dyn CorrelationStore>) -> Self {
        Self {
            deposits: DepositOrchestrator::new(ledger.clone(), store.clone()),
            payouts: PayoutOrchestrator::new(ledger, store),
        }
    }
}

#[async_trait]
impl PaymentService for PaymentServiceImpl {
    async fn create_and_post_deposit(
        &self,
        req: &CreateDepositRequest,
    ) -> Result<String, PaymentError> {
        self.deposits.create_and_post(req).await
    }

    async fn create_pending_deposit(
        &self,
        req: &CreateDepositRequest,
    ) -> Result<String, PaymentError> {
        self.deposits.create_pending(req).await
    }

    async fn get_pending_deposit(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<PendingDepositResponse>, PaymentError> {
        self.deposits.get_pending(payment_intent_id).await
    }

    async fn post_pending_deposit(
        &self,
        req: &ResolveDepositRequest,
    ) -> Result<ResolvedTransfer, PaymentError> {
        self.deposits.post_pending(req).await
    }

    async fn void_pending_deposit(
        &self,
        req: &ResolveDepositRequest,
    ) -> Result<ResolvedTransfer, PaymentError> {
        self.deposits.void_pending(req).await
    }

    async fn create_pending_payout(
        &self,
        req: &CreatePayoutRequest,
    ) -> Result<String, PaymentError> {
        self.payouts.create_pending(req).await
    }

    async fn set_payout_id(&self, transfer_id: &str, payout_id: &str) -> Result<(), PaymentError> {
        self.payouts.set_payout_id(transfer_id, payout_id).await
    }

    async fn post_pending_payout(
        &self,
        req: &ResolvePayoutRequest,
    ) -> Result<ResolvedTransfer, PaymentError> {
        self.payouts.post_pending(req).await
    }

    async fn void_pending_payout(
        &self,
        req: &ResolvePayoutRequest,
    ) -> Result<ResolvedTransfer, PaymentError> {
        self.payouts.void_pending(req).await
    }
}
