//! Payment request/response types and input validation
//!
//! Validation runs before any ledger or store call. Ledger identifiers and
//! amounts are re-encoded in canonical hex so correlation rows always hold
//! the same spelling the ledger returns.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::PaymentError;
use crate::codec::canonical_u128;
use crate::store::PaymentStatus;

/// Upper bound for external processor identifiers
pub const MAX_EXTERNAL_ID_LEN: usize = 255;

/// Trimmed, non-empty external identifier
pub fn require_text(field: &'static str, value: &str) -> Result<String, PaymentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PaymentError::InvalidRequest(format!(
            "{} must not be empty",
            field
        )));
    }
    if trimmed.len() > MAX_EXTERNAL_ID_LEN {
        return Err(PaymentError::InvalidRequest(format!(
            "{} exceeds {} characters",
            field, MAX_EXTERNAL_ID_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Non-zero 128-bit hex value in canonical form
pub fn require_hex(field: &'static str, value: &str) -> Result<String, PaymentError> {
    Ok(canonical_u128(field, value)?)
}

// ============================================================================
// Deposits
// ============================================================================

/// Create a deposit (direct or pending)
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateDepositRequest {
    #[schema(example = "pi_1")]
    pub payment_intent_id: String,
    #[schema(example = "cus_1")]
    pub customer_id: String,
    /// Ledger account ID of the user (hex)
    #[schema(example = "18f3a2c4e5b6")]
    pub user_id: String,
    /// Amount in minor units (hex)
    #[schema(example = "64")]
    pub amount: String,
}

/// Validated deposit input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositInput {
    pub payment_intent_id: String,
    pub customer_id: String,
    pub user_id: String,
    pub amount: String,
}

impl CreateDepositRequest {
    pub fn validate(&self) -> Result<DepositInput, PaymentError> {
        Ok(DepositInput {
            payment_intent_id: require_text("payment_intent_id", &self.payment_intent_id)?,
            customer_id: require_text("customer_id", &self.customer_id)?,
            user_id: require_hex("user_id", &self.user_id)?,
            amount: require_hex("amount", &self.amount)?,
        })
    }
}

/// Post or void a pending deposit
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResolveDepositRequest {
    /// Pending ledger transfer ID (hex)
    pub transfer_id: String,
    pub user_id: String,
    pub amount: String,
}

/// Validated pending-deposit resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveDepositInput {
    pub transfer_id: String,
    pub user_id: String,
    pub amount: String,
}

impl ResolveDepositRequest {
    pub fn validate(&self) -> Result<ResolveDepositInput, PaymentError> {
        Ok(ResolveDepositInput {
            transfer_id: require_hex("transfer_id", &self.transfer_id)?,
            user_id: require_hex("user_id", &self.user_id)?,
            amount: require_hex("amount", &self.amount)?,
        })
    }
}

/// Idempotency lookup result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PendingDepositResponse {
    pub transfer_id: String,
    pub user_id: String,
}

// ============================================================================
// Payouts
// ============================================================================

/// Reserve funds for a payout
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePayoutRequest {
    pub user_id: String,
    /// Connected account receiving the payout
    #[schema(example = "acct_1")]
    pub account_id: String,
    #[schema(example = "32")]
    pub amount: String,
}

/// Validated payout input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutInput {
    pub user_id: String,
    pub account_id: String,
    pub amount: String,
}

impl CreatePayoutRequest {
    pub fn validate(&self) -> Result<PayoutInput, PaymentError> {
        Ok(PayoutInput {
            user_id: require_hex("user_id", &self.user_id)?,
            account_id: require_text("account_id", &self.account_id)?,
            amount: require_hex("amount", &self.amount)?,
        })
    }
}

/// Bind an external payout ID to a pending payout
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetPayoutIdRequest {
    #[schema(example = "po_1")]
    pub payout_id: String,
}

/// Post or void a pending payout
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ResolvePayoutRequest {
    #[schema(example = "po_1")]
    pub payout_id: String,
    pub amount: String,
}

/// Validated payout resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvePayoutInput {
    pub payout_id: String,
    pub amount: String,
}

impl ResolvePayoutRequest {
    pub fn validate(&self) -> Result<ResolvePayoutInput, PaymentError> {
        Ok(ResolvePayoutInput {
            payout_id: require_text("payout_id", &self.payout_id)?,
            amount: require_hex("amount", &self.amount)?,
        })
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Ledger transfer created by an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TransferIdResponse {
    pub transfer_id: String,
}

/// Outcome of a post or void
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ResolvedTransfer {
    /// The reservation that was resolved
    pub transfer_id: String,
    /// The post/void transfer written to the ledger
    pub resolution_id: String,
    #[schema(value_type = String, example = "posted")]
    pub status: PaymentStatus,
}
