//! Payout Orchestrator
//!
//! Payouts move funds from the float account to the user's account
//! (debit = float, credit = user). The user account's credit limit makes
//! the ledger reject payouts larger than the user's balance.
//!
//! ## Compensation
//! A reservation whose payout row cannot be written is voided immediately.
//! A failed void is logged and left for reconciliation; it is never retried.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::error::PaymentError;
use super::types::{
    CreatePayoutRequest, ResolvePayoutRequest, ResolvedTransfer, require_hex, require_text,
};
use crate::ledger::LedgerClient;
use crate::store::{CorrelationStore, NewPayout, Resolution};

pub struct PayoutOrchestrator {
    ledger: Arc<LedgerClient>,
    store: Arc<dyn CorrelationStore>,
}

impl PayoutOrchestrator {
    pub fn new(ledger: Arc<LedgerClient>, store: Arc<dyn CorrelationStore>) -> Self {
        Self { ledger, store }
    }

    /// Reserve a payout and record it as `pending`
    pub async fn create_pending(&self, req: &CreatePayoutRequest) -> Result<String, PaymentError> {
        let input = req.validate()?;
        let float = self.ledger.float_account_id();

        let transfer_id = self
            .ledger
            .create_pending_transfer(&float, &input.user_id, &input.amount)
            .await?;

        let row = NewPayout {
            transfer_id: transfer_id.clone(),
            account_id: input.account_id,
            user_id: input.user_id,
        };
        let failure = match self.store.insert_payout(&row).await {
            Ok(0) => Some(PaymentError::Unexpected(
                "payout row was not inserted".to_string(),
            )),
            Ok(_) => None,
            Err(e) => Some(PaymentError::from(e)),
        };

        if let Some(err) = failure {
            error!(
                transfer_id = %transfer_id,
                user_id = %row.user_id,
                error = %err,
                "Failed to record payout, voiding reservation"
            );
            self.compensate(&float, &row.user_id, &input.amount, &transfer_id)
                .await;
            return Err(err);
        }

        info!(
            transfer_id = %transfer_id,
            user_id = %row.user_id,
            amount = %input.amount,
            "Pending payout created"
        );
        Ok(transfer_id)
    }

    /// Bind the processor's payout ID to the row created for `transfer_id`
    pub async fn set_payout_id(&self, transfer_id: &str, payout_id: &str) -> Result<(), PaymentError> {
        let transfer_id = require_hex("transfer_id", transfer_id)?;
        let payout_id = require_text("payout_id", payout_id)?;

        if !self.store.bind_payout_id(&transfer_id, &payout_id).await? {
            warn!(transfer_id = %transfer_id, payout_id = %payout_id, "No payout row for transfer");
            return Err(PaymentError::NotFound(format!(
                "payout for transfer {}",
                transfer_id
            )));
        }

        info!(transfer_id = %transfer_id, payout_id = %payout_id, "Payout ID bound");
        Ok(())
    }

    pub async fn post_pending(
        &self,
        req: &ResolvePayoutRequest,
    ) -> Result<ResolvedTransfer, PaymentError> {
        self.resolve(req, Resolution::Posted).await
    }

    pub async fn void_pending(
        &self,
        req: &ResolvePayoutRequest,
    ) -> Result<ResolvedTransfer, PaymentError> {
        self.resolve(req, Resolution::Voided).await
    }

    async fn resolve(
        &self,
        req: &ResolvePayoutRequest,
        resolution: Resolution,
    ) -> Result<ResolvedTransfer, PaymentError> {
        let input = req.validate()?;

        let Some(payout) = self.store.find_pending_payout(&input.payout_id).await? else {
            warn!(payout_id = %input.payout_id, resolution = resolution.as_str(), "No pending payout");
            return Err(PaymentError::NotFound(format!(
                "pending payout {}",
                input.payout_id
            )));
        };

        let float = self.ledger.float_account_id();
        let resolution_id = match resolution {
            Resolution::Posted => {
                self.ledger
                    .post_pending_transfer(&float, &payout.user_id, &input.amount, &payout.transfer_id)
                    .await?
            }
            Resolution::Voided => {
                self.ledger
                    .void_pending_transfer(&float, &payout.user_id, &input.amount, &payout.transfer_id)
                    .await?
            }
        };

        if !self.store.resolve_payout(&input.payout_id, resolution).await? {
            warn!(
                payout_id = %input.payout_id,
                transfer_id = %payout.transfer_id,
                resolution = resolution.as_str(),
                "Payout resolved in ledger but row was no longer pending"
            );
            return Err(PaymentError::NotFound(format!(
                "pending payout {}",
                input.payout_id
            )));
        }

        info!(
            payout_id = %input.payout_id,
            transfer_id = %payout.transfer_id,
            user_id = %payout.user_id,
            amount = %input.amount,
            resolution = resolution.as_str(),
            "Pending payout resolved"
        );
        Ok(ResolvedTransfer {
            transfer_id: payout.transfer_id,
            resolution_id,
            status: resolution.status(),
        })
    }

    /// Void a reservation whose payout row could not be written
    async fn compensate(&self, float: &str, user_id: &str, amount: &str, transfer_id: &str) {
        match self
            .ledger
            .void_pending_transfer(float, user_id, amount, transfer_id)
            .await
        {
            Ok(void_id) => warn!(
                transfer_id = %transfer_id,
                void_id = %void_id,
                "Payout reservation voided"
            ),
            Err(e) => error!(
                transfer_id = %transfer_id,
                user_id = %user_id,
                amount = %amount,
                error = %e,
                "Compensation failed: payout reservation left pending"
            ),
        }
    }
}
