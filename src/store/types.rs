//! Correlation record types

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Status of a deposit or payout correlation row
///
/// Advances only `pending -> posted` or `pending -> voided`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Posted,
    Voided,
}

impl PaymentStatus {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Posted => "posted",
            PaymentStatus::Voided => "voided",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "posted" => Some(PaymentStatus::Posted),
            "voided" => Some(PaymentStatus::Voided),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal transition applied to a pending row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    Posted,
    Voided,
}

impl Resolution {
    pub fn status(&self) -> PaymentStatus {
        match self {
            Resolution::Posted => PaymentStatus::Posted,
            Resolution::Voided => PaymentStatus::Voided,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.status().as_str()
    }
}

// ============================================================================
// Deposits
// ============================================================================

/// Row of `banking.deposits`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositRecord {
    pub payment_intent_id: String,
    pub transfer_id: String,
    pub customer_id: String,
    pub user_id: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub posted_at: Option<DateTime<Utc>>,
    pub voided_at: Option<DateTime<Utc>>,
}

/// Insert parameters for a deposit row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeposit {
    pub payment_intent_id: String,
    pub transfer_id: String,
    pub customer_id: String,
    pub user_id: String,
}

/// Ledger reference of a pending deposit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingDeposit {
    pub transfer_id: String,
    pub user_id: String,
}

// ============================================================================
// Payouts
// ============================================================================

/// Row of `banking.payouts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoutRecord {
    pub transfer_id: String,
    pub account_id: String,
    pub user_id: String,
    pub payout_id: Option<String>,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub posted_at: Option<DateTime<Utc>>,
    pub voided_at: Option<DateTime<Utc>>,
}

/// Insert parameters for a payout row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayout {
    pub transfer_id: String,
    pub account_id: String,
    pub user_id: String,
}

/// Ledger reference of a pending payout
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingPayout {
    pub transfer_id: String,
    pub user_id: String,
}
