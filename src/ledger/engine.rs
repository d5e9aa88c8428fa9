//! Ledger Engine Port
//!
//! The raw batch contract of the double-entry engine. Batch creates return
//! result codes for the failed items only; an empty vector means every item
//! was applied.
//!
//! Adapters:
//! - [`super::memory::InMemoryLedger`] (development backend, tests)
//! - [`super::remote::RemoteLedger`] (JSON over HTTP)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{Account, AccountFilter, Transfer};

/// Per-item result codes for `create_accounts`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateAccountResult {
    IdMustNotBeZero,
    FlagsAreMutuallyExclusive,
    LedgerMustNotBeZero,
    CodeMustNotBeZero,
    Exists,
    ExistsWithDifferentFlags,
}

impl CreateAccountResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdMustNotBeZero => "id_must_not_be_zero",
            Self::FlagsAreMutuallyExclusive => "flags_are_mutually_exclusive",
            Self::LedgerMustNotBeZero => "ledger_must_not_be_zero",
            Self::CodeMustNotBeZero => "code_must_not_be_zero",
            Self::Exists => "exists",
            Self::ExistsWithDifferentFlags => "exists_with_different_flags",
        }
    }
}

/// Per-item result codes for `create_transfers`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreateTransferResult {
    IdMustNotBeZero,
    FlagsAreMutuallyExclusive,
    AccountsMustBeDifferent,
    AmountMustNotBeZero,
    LedgerMustNotBeZero,
    CodeMustNotBeZero,
    DebitAccountNotFound,
    CreditAccountNotFound,
    AccountsMustHaveTheSameLedger,
    TransferMustHaveTheSameLedgerAsAccounts,
    PendingIdMustBeZero,
    PendingIdMustNotBeZero,
    PendingIdMustBeDifferent,
    PendingTransferNotFound,
    PendingTransferNotPending,
    PendingTransferHasDifferentDebitAccountId,
    PendingTransferHasDifferentCreditAccountId,
    PendingTransferHasDifferentLedger,
    PendingTransferHasDifferentCode,
    ExceedsPendingTransferAmount,
    PendingTransferHasDifferentAmount,
    PendingTransferAlreadyPosted,
    PendingTransferAlreadyVoided,
    Exists,
    ExistsWithDifferentFlags,
    Overflow,
    ExceedsCredits,
    ExceedsDebits,
}

impl CreateTransferResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::IdMustNotBeZero => "id_must_not_be_zero",
            Self::FlagsAreMutuallyExclusive => "flags_are_mutually_exclusive",
            Self::AccountsMustBeDifferent => "accounts_must_be_different",
            Self::AmountMustNotBeZero => "amount_must_not_be_zero",
            Self::LedgerMustNotBeZero => "ledger_must_not_be_zero",
            Self::CodeMustNotBeZero => "code_must_not_be_zero",
            Self::DebitAccountNotFound => "debit_account_not_found",
            Self::CreditAccountNotFound => "credit_account_not_found",
            Self::AccountsMustHaveTheSameLedger => "accounts_must_have_the_same_ledger",
            Self::TransferMustHaveTheSameLedgerAsAccounts => {
                "transfer_must_have_the_same_ledger_as_accounts"
            }
            Self::PendingIdMustBeZero => "pending_id_must_be_zero",
            Self::PendingIdMustNotBeZero => "pending_id_must_not_be_zero",
            Self::PendingIdMustBeDifferent => "pending_id_must_be_different",
            Self::PendingTransferNotFound => "pending_transfer_not_found",
            Self::PendingTransferNotPending => "pending_transfer_not_pending",
            Self::PendingTransferHasDifferentDebitAccountId => {
                "pending_transfer_has_different_debit_account_id"
            }
            Self::PendingTransferHasDifferentCreditAccountId => {
                "pending_transfer_has_different_credit_account_id"
            }
            Self::PendingTransferHasDifferentLedger => "pending_transfer_has_different_ledger",
            Self::PendingTransferHasDifferentCode => "pending_transfer_has_different_code",
            Self::ExceedsPendingTransferAmount => "exceeds_pending_transfer_amount",
            Self::PendingTransferHasDifferentAmount => "pending_transfer_has_different_amount",
            Self::PendingTransferAlreadyPosted => "pending_transfer_already_posted",
            Self::PendingTransferAlreadyVoided => "pending_transfer_already_voided",
            Self::Exists => "exists",
            Self::ExistsWithDifferentFlags => "exists_with_different_flags",
            Self::Overflow => "overflow",
            Self::ExceedsCredits => "exceeds_credits",
            Self::ExceedsDebits => "exceeds_debits",
        }
    }
}

/// Failed item of a `create_accounts` batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccountError {
    pub index: u32,
    pub result: CreateAccountResult,
}

/// Failed item of a `create_transfers` batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTransferError {
    pub index: u32,
    pub result: CreateTransferResult,
}

/// Failures talking to the engine (as opposed to per-item rejections)
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Ledger transport error: {0}")]
    Transport(String),

    #[error("Ledger protocol error: {0}")]
    Protocol(String),

    #[error("Ledger unavailable: {0}")]
    Unavailable(String),
}

/// Double-entry ledger engine
#[async_trait]
pub trait LedgerEngine: Send + Sync {
    /// Adapter name for logging
    fn name(&self) -> &'static str;

    async fn create_accounts(
        &self,
        accounts: &[Account],
    ) -> Result<Vec<CreateAccountError>, EngineError>;

    async fn create_transfers(
        &self,
        transfers: &[Transfer],
    ) -> Result<Vec<CreateTransferError>, EngineError>;

    /// Accounts that exist, in request order; unknown IDs are skipped
    async fn lookup_accounts(&self, ids: &[u128]) -> Result<Vec<Account>, EngineError>;

    /// Transfers that exist, in request order; unknown IDs are skipped
    async fn lookup_transfers(&self, ids: &[u128]) -> Result<Vec<Transfer>, EngineError>;

    /// Transfers touching `filter.account_id`, ordered by timestamp
    async fn get_account_transfers(
        &self,
        filter: &AccountFilter,
    ) -> Result<Vec<Transfer>, EngineError>;
}
