//! Ledger Core Types
//!
//! Accounts and transfers as the ledger engine stores them. Flag bit values
//! match the engine's wire format.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

use crate::codec::hex_u128;

// ============================================================================
// Flags
// ============================================================================

/// Account flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountFlags(u16);

impl AccountFlags {
    pub const NONE: Self = Self(0);
    /// Reject any transfer that would make debits exceed credits
    pub const DEBITS_MUST_NOT_EXCEED_CREDITS: Self = Self(1 << 1);
    /// Reject any transfer that would make credits exceed debits
    pub const CREDITS_MUST_NOT_EXCEED_DEBITS: Self = Self(1 << 2);

    #[inline]
    pub fn bits(&self) -> u16 {
        self.0
    }

    #[inline]
    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    #[inline]
    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for AccountFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Transfer flag bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferFlags(u16);

impl TransferFlags {
    pub const NONE: Self = Self(0);
    /// Reserve funds without posting them
    pub const PENDING: Self = Self(1 << 1);
    /// Resolve a pending transfer by posting it
    pub const POST_PENDING_TRANSFER: Self = Self(1 << 2);
    /// Resolve a pending transfer by releasing it
    pub const VOID_PENDING_TRANSFER: Self = Self(1 << 3);

    #[inline]
    pub fn bits(&self) -> u16 {
        self.0
    }

    #[inline]
    pub fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    #[inline]
    pub fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Number of phase flags set (at most one is valid)
    pub fn phase_count(&self) -> u32 {
        let phase = Self::PENDING.0 | Self::POST_PENDING_TRANSFER.0 | Self::VOID_PENDING_TRANSFER.0;
        (self.0 & phase).count_ones()
    }
}

impl BitOr for TransferFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Which phase of the two-phase protocol a transfer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferKind {
    /// Single-phase, posted on creation
    Single,
    /// Reservation awaiting post or void
    Pending,
    /// Posts a reservation
    PostPending,
    /// Voids a reservation
    VoidPending,
}

impl TransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::Single => "SINGLE",
            TransferKind::Pending => "PENDING",
            TransferKind::PostPending => "POST_PENDING",
            TransferKind::VoidPending => "VOID_PENDING",
        }
    }
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Account
// ============================================================================

/// Ledger account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(with = "hex_u128")]
    pub id: u128,
    #[serde(with = "hex_u128")]
    pub debits_pending: u128,
    #[serde(with = "hex_u128")]
    pub debits_posted: u128,
    #[serde(with = "hex_u128")]
    pub credits_pending: u128,
    #[serde(with = "hex_u128")]
    pub credits_posted: u128,
    pub ledger: u32,
    pub code: u16,
    pub flags: AccountFlags,
    /// Assigned by the engine (nanoseconds)
    #[serde(default)]
    pub timestamp: u64,
}

impl Account {
    /// New account with zeroed balances
    pub fn new(id: u128, ledger: u32, code: u16, flags: AccountFlags) -> Self {
        Self {
            id,
            debits_pending: 0,
            debits_posted: 0,
            credits_pending: 0,
            credits_posted: 0,
            ledger,
            code,
            flags,
            timestamp: 0,
        }
    }

    /// `debits_posted - credits_posted`, saturating at the i128 range
    pub fn posted_balance(&self) -> i128 {
        let debits = i128::try_from(self.debits_posted).unwrap_or(i128::MAX);
        let credits = i128::try_from(self.credits_posted).unwrap_or(i128::MAX);
        debits.saturating_sub(credits)
    }
}

// ============================================================================
// Transfer
// ============================================================================

/// Ledger transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    #[serde(with = "hex_u128")]
    pub id: u128,
    #[serde(with = "hex_u128")]
    pub debit_account_id: u128,
    #[serde(with = "hex_u128")]
    pub credit_account_id: u128,
    #[serde(with = "hex_u128")]
    pub amount: u128,
    /// Reservation being resolved (post/void only, 0 otherwise)
    #[serde(with = "hex_u128", default)]
    pub pending_id: u128,
    pub ledger: u32,
    pub code: u16,
    pub flags: TransferFlags,
    /// Assigned by the engine (nanoseconds)
    #[serde(default)]
    pub timestamp: u64,
}

impl Transfer {
    /// Phase of this transfer
    pub fn kind(&self) -> TransferKind {
        if self.flags.contains(TransferFlags::POST_PENDING_TRANSFER) {
            TransferKind::PostPending
        } else if self.flags.contains(TransferFlags::VOID_PENDING_TRANSFER) {
            TransferKind::VoidPending
        } else if self.flags.contains(TransferFlags::PENDING) {
            TransferKind::Pending
        } else {
            TransferKind::Single
        }
    }
}

/// Resolution state of a transfer as seen by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferStatus {
    /// Reservation not yet resolved
    Pending,
    /// Posted (single-phase, a post-pending transfer, or a posted reservation)
    Posted,
    /// Voided (a void-pending transfer, or a voided reservation)
    Voided,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "PENDING",
            TransferStatus::Posted => "POSTED",
            TransferStatus::Voided => "VOIDED",
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Engine-side filter for account transfer listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountFilter {
    #[serde(with = "hex_u128")]
    pub account_id: u128,
    /// Inclusive lower bound (nanoseconds)
    pub timestamp_min: u64,
    /// Inclusive upper bound (nanoseconds)
    pub timestamp_max: u64,
    pub limit: u32,
    /// Include transfers debiting the account
    pub debits: bool,
    /// Include transfers crediting the account
    pub credits: bool,
    /// Newest first
    pub reversed: bool,
}

impl AccountFilter {
    /// Filter for both sides of `account_id` in `[min, max]`
    pub fn both_sides(account_id: u128, timestamp_min: u64, timestamp_max: u64, limit: u32) -> Self {
        Self {
            account_id,
            timestamp_min,
            timestamp_max,
            limit,
            debits: true,
            credits: true,
            reversed: false,
        }
    }

    /// True if `transfer` falls inside this filter (ignoring limit/order)
    pub fn matches(&self, transfer: &Transfer) -> bool {
        let side = (self.debits && transfer.debit_account_id == self.account_id)
            || (self.credits && transfer.credit_account_id == self.account_id);
        side && transfer.timestamp >= self.timestamp_min && transfer.timestamp <= self.timestamp_max
    }
}
