//! External views of ledger accounts and transfers
//!
//! Every 128-bit value is canonical lowercase hex and every timestamp an
//! RFC 3339 string with nanosecond precision.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::types::{Account, Transfer, TransferStatus};
use crate::codec::{format_timestamp, format_u128};

/// Ledger account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AccountView {
    #[schema(example = "1")]
    pub id: String,
    #[schema(example = "0")]
    pub debits_pending: String,
    #[schema(example = "64")]
    pub debits_posted: String,
    pub credits_pending: String,
    pub credits_posted: String,
    pub ledger: u32,
    #[schema(example = 718)]
    pub code: u16,
    pub flags: u16,
    #[schema(example = "2024-05-01T12:00:00.000000001Z")]
    pub timestamp: String,
}

impl From<&Account> for AccountView {
    fn from(a: &Account) -> Self {
        Self {
            id: format_u128(a.id),
            debits_pending: format_u128(a.debits_pending),
            debits_posted: format_u128(a.debits_posted),
            credits_pending: format_u128(a.credits_pending),
            credits_posted: format_u128(a.credits_posted),
            ledger: a.ledger,
            code: a.code,
            flags: a.flags.bits(),
            timestamp: format_timestamp(a.timestamp),
        }
    }
}

/// Ledger transfer with its resolution state
///
/// Exactly one of `pending`, `posted`, `voided` is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TransferView {
    pub id: String,
    pub debit_account_id: String,
    pub credit_account_id: String,
    #[schema(example = "64")]
    pub amount: String,
    /// Reservation resolved by this transfer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_id: Option<String>,
    pub ledger: u32,
    pub code: u16,
    pub flags: u16,
    pub timestamp: String,
    pub pending: bool,
    pub posted: bool,
    pub voided: bool,
}

impl TransferView {
    pub fn new(t: &Transfer, status: TransferStatus) -> Self {
        Self {
            id: format_u128(t.id),
            debit_account_id: format_u128(t.debit_account_id),
            credit_account_id: format_u128(t.credit_account_id),
            amount: format_u128(t.amount),
            pending_id: (t.pending_id != 0).then(|| format_u128(t.pending_id)),
            ledger: t.ledger,
            code: t.code,
            flags: t.flags.bits(),
            timestamp: format_timestamp(t.timestamp),
            pending: status == TransferStatus::Pending,
            posted: status == TransferStatus::Posted,
            voided: status == TransferStatus::Voided,
        }
    }
}

/// Account transfer listing parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TransferQuery {
    /// Inclusive lower bound (RFC 3339), default epoch
    pub min_timestamp: Option<String>,
    /// Inclusive upper bound (RFC 3339), default now
    pub max_timestamp: Option<String>,
    /// Page size, default 50, max 8190
    pub limit: Option<u32>,
    /// Newest first
    pub reversed: Option<bool>,
}
