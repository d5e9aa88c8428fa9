//! In-Process Ledger Engine
//!
//! Development backend and test double. Honours the engine's observable
//! contract: per-item result codes, balance-limit flags, two-phase
//! pending/post/void resolution and time-ordered account listing.
//!
//! Timestamps are strictly increasing across the whole engine, so insertion
//! order is timestamp order.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::engine::{
    CreateAccountError, CreateAccountResult, CreateTransferError, CreateTransferResult,
    EngineError, LedgerEngine,
};
use super::types::{
    Account, AccountFilter, AccountFlags, Transfer, TransferFlags, TransferKind, TransferStatus,
};
use crate::codec::now_nanos;

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<u128, Account>,
    transfers: HashMap<u128, Transfer>,
    /// Transfer IDs in commit order
    log: Vec<u128>,
    /// Resolution of each pending transfer that has been posted or voided
    resolutions: HashMap<u128, TransferStatus>,
    last_timestamp: u64,
}

impl LedgerState {
    fn next_timestamp(&mut self) -> u64 {
        let ts = now_nanos().max(self.last_timestamp + 1);
        self.last_timestamp = ts;
        ts
    }

    fn create_account(&mut self, account: &Account) -> Result<(), CreateAccountResult> {
        if account.id == 0 {
            return Err(CreateAccountResult::IdMustNotBeZero);
        }
        if account.flags.contains(AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS)
            && account.flags.contains(AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS)
        {
            return Err(CreateAccountResult::FlagsAreMutuallyExclusive);
        }
        if account.ledger == 0 {
            return Err(CreateAccountResult::LedgerMustNotBeZero);
        }
        if account.code == 0 {
            return Err(CreateAccountResult::CodeMustNotBeZero);
        }
        if let Some(existing) = self.accounts.get(&account.id) {
            return Err(if existing.flags == account.flags {
                CreateAccountResult::Exists
            } else {
                CreateAccountResult::ExistsWithDifferentFlags
            });
        }

        let mut stored = Account::new(account.id, account.ledger, account.code, account.flags);
        stored.timestamp = self.next_timestamp();
        self.accounts.insert(stored.id, stored);
        Ok(())
    }

    fn create_transfer(&mut self, transfer: &Transfer) -> Result<(), CreateTransferResult> {
        if transfer.id == 0 {
            return Err(CreateTransferResult::IdMustNotBeZero);
        }
        if transfer.flags.phase_count() > 1 {
            return Err(CreateTransferResult::FlagsAreMutuallyExclusive);
        }
        if let Some(existing) = self.transfers.get(&transfer.id) {
            return Err(if existing.flags == transfer.flags {
                CreateTransferResult::Exists
            } else {
                CreateTransferResult::ExistsWithDifferentFlags
            });
        }

        match transfer.kind() {
            TransferKind::PostPending | TransferKind::VoidPending => self.resolve_pending(transfer),
            TransferKind::Single | TransferKind::Pending => self.apply_transfer(transfer),
        }
    }

    fn apply_transfer(&mut self, transfer: &Transfer) -> Result<(), CreateTransferResult> {
        if transfer.debit_account_id == transfer.credit_account_id {
            return Err(CreateTransferResult::AccountsMustBeDifferent);
        }
        if transfer.pending_id != 0 {
            return Err(CreateTransferResult::PendingIdMustBeZero);
        }
        if transfer.amount == 0 {
            return Err(CreateTransferResult::AmountMustNotBeZero);
        }
        if transfer.ledger == 0 {
            return Err(CreateTransferResult::LedgerMustNotBeZero);
        }
        if transfer.code == 0 {
            return Err(CreateTransferResult::CodeMustNotBeZero);
        }

        let dr = self
            .accounts
            .get(&transfer.debit_account_id)
            .ok_or(CreateTransferResult::DebitAccountNotFound)?;
        let cr = self
            .accounts
            .get(&transfer.credit_account_id)
            .ok_or(CreateTransferResult::CreditAccountNotFound)?;

        if dr.ledger != cr.ledger {
            return Err(CreateTransferResult::AccountsMustHaveTheSameLedger);
        }
        if transfer.ledger != dr.ledger {
            return Err(CreateTransferResult::TransferMustHaveTheSameLedgerAsAccounts);
        }

        let amount = transfer.amount;
        let dr_debits = dr
            .debits_pending
            .checked_add(dr.debits_posted)
            .and_then(|v| v.checked_add(amount))
            .ok_or(CreateTransferResult::Overflow)?;
        let cr_credits = cr
            .credits_pending
            .checked_add(cr.credits_posted)
            .and_then(|v| v.checked_add(amount))
            .ok_or(CreateTransferResult::Overflow)?;

        if dr.flags.contains(AccountFlags::DEBITS_MUST_NOT_EXCEED_CREDITS)
            && dr_debits > dr.credits_posted
        {
            return Err(CreateTransferResult::ExceedsCredits);
        }
        if cr.flags.contains(AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS)
            && cr_credits > cr.debits_posted
        {
            return Err(CreateTransferResult::ExceedsDebits);
        }

        let pending = transfer.kind() == TransferKind::Pending;
        if let Some(dr) = self.accounts.get_mut(&transfer.debit_account_id) {
            if pending {
                dr.debits_pending += amount;
            } else {
                dr.debits_posted += amount;
            }
        }
        if let Some(cr) = self.accounts.get_mut(&transfer.credit_account_id) {
            if pending {
                cr.credits_pending += amount;
            } else {
                cr.credits_posted += amount;
            }
        }

        let mut stored = transfer.clone();
        self.commit(&mut stored);
        Ok(())
    }

    fn resolve_pending(&mut self, transfer: &Transfer) -> Result<(), CreateTransferResult> {
        if transfer.pending_id == 0 {
            return Err(CreateTransferResult::PendingIdMustNotBeZero);
        }
        if transfer.pending_id == transfer.id {
            return Err(CreateTransferResult::PendingIdMustBeDifferent);
        }

        let pending = self
            .transfers
            .get(&transfer.pending_id)
            .ok_or(CreateTransferResult::PendingTransferNotFound)?;
        if pending.kind() != TransferKind::Pending {
            return Err(CreateTransferResult::PendingTransferNotPending);
        }
        match self.resolutions.get(&pending.id) {
            Some(TransferStatus::Posted) => {
                return Err(CreateTransferResult::PendingTransferAlreadyPosted);
            }
            Some(TransferStatus::Voided) => {
                return Err(CreateTransferResult::PendingTransferAlreadyVoided);
            }
            _ => {}
        }

        // Zero fields inherit from the pending transfer
        if transfer.debit_account_id != 0 && transfer.debit_account_id != pending.debit_account_id {
            return Err(CreateTransferResult::PendingTransferHasDifferentDebitAccountId);
        }
        if transfer.credit_account_id != 0
            && transfer.credit_account_id != pending.credit_account_id
        {
            return Err(CreateTransferResult::PendingTransferHasDifferentCreditAccountId);
        }
        if transfer.ledger != 0 && transfer.ledger != pending.ledger {
            return Err(CreateTransferResult::PendingTransferHasDifferentLedger);
        }
        if transfer.code != 0 && transfer.code != pending.code {
            return Err(CreateTransferResult::PendingTransferHasDifferentCode);
        }

        let posting = transfer.kind() == TransferKind::PostPending;
        let amount = if transfer.amount == 0 {
            pending.amount
        } else {
            transfer.amount
        };
        if posting && amount > pending.amount {
            return Err(CreateTransferResult::ExceedsPendingTransferAmount);
        }
        if !posting && amount != pending.amount {
            return Err(CreateTransferResult::PendingTransferHasDifferentAmount);
        }

        let mut stored = Transfer {
            id: transfer.id,
            debit_account_id: pending.debit_account_id,
            credit_account_id: pending.credit_account_id,
            amount,
            pending_id: pending.id,
            ledger: pending.ledger,
            code: pending.code,
            flags: transfer.flags,
            timestamp: 0,
        };
        let reserved = pending.amount;

        if let Some(dr) = self.accounts.get_mut(&stored.debit_account_id) {
            dr.debits_pending -= reserved;
            if posting {
                dr.debits_posted += amount;
            }
        }
        if let Some(cr) = self.accounts.get_mut(&stored.credit_account_id) {
            cr.credits_pending -= reserved;
            if posting {
                cr.credits_posted += amount;
            }
        }

        let status = if posting {
            TransferStatus::Posted
        } else {
            TransferStatus::Voided
        };
        self.resolutions.insert(stored.pending_id, status);
        self.commit(&mut stored);
        Ok(())
    }

    fn commit(&mut self, transfer: &mut Transfer) {
        transfer.timestamp = self.next_timestamp();
        self.log.push(transfer.id);
        self.transfers.insert(transfer.id, transfer.clone());
    }
}

/// In-process ledger engine
#[derive(Default)]
pub struct InMemoryLedger {
    state: Mutex<LedgerState>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of committed transfers
    pub fn transfer_count(&self) -> usize {
        self.state().log.len()
    }
}

#[async_trait]
impl LedgerEngine for InMemoryLedger {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn create_accounts(
        &self,
        accounts: &[Account],
    ) -> Result<Vec<CreateAccountError>, EngineError> {
        let mut state = self.state();
        let mut errors = Vec::new();
        for (index, account) in accounts.iter().enumerate() {
            if let Err(result) = state.create_account(account) {
                errors.push(CreateAccountError {
                    index: index as u32,
                    result,
                });
            }
        }
        Ok(errors)
    }

    async fn create_transfers(
        &self,
        transfers: &[Transfer],
    ) -> Result<Vec<CreateTransferError>, EngineError> {
        let mut state = self.state();
        let mut errors = Vec::new();
        for (index, transfer) in transfers.iter().enumerate() {
            if let Err(result) = state.create_transfer(transfer) {
                errors.push(CreateTransferError {
                    index: index as u32,
                    result,
                });
            }
        }
        Ok(errors)
    }

    async fn lookup_accounts(&self, ids: &[u128]) -> Result<Vec<Account>, EngineError> {
        let state = self.state();
        Ok(ids
            .iter()
            .filter_map(|id| state.accounts.get(id).cloned())
            .collect())
    }

    async fn lookup_transfers(&self, ids: &[u128]) -> Result<Vec<Transfer>, EngineError> {
        let state = self.state();
        Ok(ids
            .iter()
            .filter_map(|id| state.transfers.get(id).cloned())
            .collect())
    }

    async fn get_account_transfers(
        &self,
        filter: &AccountFilter,
    ) -> Result<Vec<Transfer>, EngineError> {
        let state = self.state();
        let limit = filter.limit as usize;
        let matching = |id: &u128| {
            state
                .transfers
                .get(id)
                .filter(|t| filter.matches(t))
                .cloned()
        };

        let page = if filter.reversed {
            state.log.iter().rev().filter_map(matching).take(limit).collect()
        } else {
            state.log.iter().filter_map(matching).take(limit).collect()
        };
        Ok(page)
    }
}
