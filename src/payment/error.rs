//! Payment Error Types
//!
//! Closed taxonomy returned by every payment operation. Lower layers
//! (codec, ledger, store) convert into it via `From`.

use thiserror::Error;

use crate::codec::CodecError;
use crate::ledger::LedgerError;
use crate::store::StoreError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaymentError {
    /// Malformed or missing input; nothing was called
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The ledger's balance limits forbid the movement
    #[error("Not enough funds")]
    NotEnoughFunds,

    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique key already present in the correlation store
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl PaymentError {
    pub fn not_implemented(operation: &str) -> Self {
        PaymentError::Unexpected(format!("{} is not implemented", operation))
    }

    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::InvalidRequest(_) => "INVALID_REQUEST",
            PaymentError::NotEnoughFunds => "NOT_ENOUGH_FUNDS",
            PaymentError::NotFound(_) => "NOT_FOUND",
            PaymentError::Conflict(_) => "CONFLICT",
            PaymentError::Unexpected(_) => "UNEXPECTED",
        }
    }

    /// HTTP status for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            PaymentError::InvalidRequest(_) => 400,
            PaymentError::NotEnoughFunds => 422,
            PaymentError::NotFound(_) => 404,
            PaymentError::Conflict(_) => 409,
            PaymentError::Unexpected(_) => 500,
        }
    }
}

impl From<CodecError> for PaymentError {
    fn from(e: CodecError) -> Self {
        PaymentError::InvalidRequest(e.to_string())
    }
}

impl From<LedgerError> for PaymentError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InvalidRequest(msg) => PaymentError::InvalidRequest(msg),
            LedgerError::NotEnoughFunds => PaymentError::NotEnoughFunds,
            LedgerError::NotFound(msg) => PaymentError::NotFound(msg),
            LedgerError::Unexpected(msg) => PaymentError::Unexpected(msg),
        }
    }
}

impl From<StoreError> for PaymentError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation(msg) => PaymentError::Conflict(msg),
            StoreError::Database(msg) => PaymentError::Unexpected(msg),
        }
    }
}
