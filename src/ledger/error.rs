//! Ledger Client Error Types

use thiserror::Error;

use super::engine::{CreateTransferResult, EngineError};
use crate::codec::CodecError;

/// Errors surfaced by [`super::LedgerClient`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not enough funds")]
    NotEnoughFunds,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unexpected ledger error: {0}")]
    Unexpected(String),
}

impl LedgerError {
    /// Map a per-item engine rejection to the client taxonomy
    pub fn from_transfer_result(result: CreateTransferResult) -> Self {
        match result {
            CreateTransferResult::ExceedsCredits | CreateTransferResult::ExceedsDebits => {
                LedgerError::NotEnoughFunds
            }
            CreateTransferResult::PendingTransferNotFound => {
                LedgerError::NotFound("pending transfer".to_string())
            }
            other => LedgerError::Unexpected(other.as_str().to_string()),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidRequest(_) => "INVALID_REQUEST",
            LedgerError::NotEnoughFunds => "NOT_ENOUGH_FUNDS",
            LedgerError::NotFound(_) => "NOT_FOUND",
            LedgerError::Unexpected(_) => "UNEXPECTED",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::InvalidRequest(_) => 400,
            LedgerError::NotEnoughFunds => 422,
            LedgerError::NotFound(_) => 404,
            LedgerError::Unexpected(_) => 500,
        }
    }
}

impl From<CodecError> for LedgerError {
    fn from(e: CodecError) -> Self {
        LedgerError::InvalidRequest(e.to_string())
    }
}

impl From<EngineError> for LedgerError {
    fn from(e: EngineError) -> Self {
        LedgerError::Unexpected(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_rejections_are_not_enough_funds() {
        assert_eq!(
            LedgerError::from_transfer_result(CreateTransferResult::ExceedsDebits),
            LedgerError::NotEnoughFunds
        );
        assert_eq!(
            LedgerError::from_transfer_result(CreateTransferResult::ExceedsCredits),
            LedgerError::NotEnoughFunds
        );
    }

    #[test]
    fn test_resolution_rejections() {
        assert!(matches!(
            LedgerError::from_transfer_result(CreateTransferResult::PendingTransferNotFound),
            LedgerError::NotFound(_)
        ));
        assert_eq!(
            LedgerError::from_transfer_result(CreateTransferResult::PendingTransferAlreadyPosted),
            LedgerError::Unexpected("pending_transfer_already_posted".into())
        );
    }

    #[test]
    fn test_http_status() {
        assert_eq!(LedgerError::InvalidRequest("x".into()).http_status(), 400);
        assert_eq!(LedgerError::NotEnoughFunds.http_status(), 422);
        assert_eq!(
            LedgerError::from(EngineError::Transport("down".into())).http_status(),
            500
        );
    }
}
