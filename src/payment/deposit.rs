//! Deposit Orchestrator
//!
//! Deposits move funds from the user's account into the float account
//! (debit = user, credit = float).
//!
//! ## Flows
//! - Direct: ledger transfer, then a `posted` row. A failed insert leaves the
//!   ledger posted with no row; it is logged and surfaced, not compensated.
//! - Two-phase: ledger reservation, then a `pending` row. Post/void resolve
//!   the reservation first, then move the row out of `pending`.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::error::PaymentError;
use super::types::{
    CreateDepositRequest, PendingDepositResponse, ResolveDepositRequest, ResolvedTransfer,
    require_text,
};
use crate::ledger::LedgerClient;
use crate::store::{CorrelationStore, NewDeposit, Resolution};

pub struct DepositOrchestrator {
    ledger: Arc<LedgerClient>,
    store: Arc<dyn CorrelationStore>,
}

impl DepositOrchestrator {
    pub fn new(ledger: Arc<LedgerClient>, store: Arc<dyn CorrelationStore>) -> Self {
        Self { ledger, store }
    }

    /// Single-phase deposit recorded as `posted`
    pub async fn create_and_post(&self, req: &CreateDepositRequest) -> Result<String, PaymentError> {
        let input = req.validate()?;
        let float = self.ledger.float_account_id();

        let transfer_id = self
            .ledger
            .create_transfer(&input.user_id, &float, &input.amount)
            .await?;

        let row = NewDeposit {
            payment_intent_id: input.payment_intent_id,
            transfer_id: transfer_id.clone(),
            customer_id: input.customer_id,
            user_id: input.user_id,
        };
        if let Err(e) = self.store.insert_posted_deposit(&row).await {
            error!(
                transfer_id = %transfer_id,
                payment_intent_id = %row.payment_intent_id,
                error = %e,
                "Deposit posted to ledger but correlation row was not written"
            );
            return Err(e.into());
        }

        info!(
            transfer_id = %transfer_id,
            payment_intent_id = %row.payment_intent_id,
            user_id = %row.user_id,
            amount = %input.amount,
            "Deposit posted"
        );
        Ok(transfer_id)
    }

    /// Reserve a deposit and record it as `pending`
    pub async fn create_pending(&self, req: &CreateDepositRequest) -> Result<String, PaymentError> {
        let input = req.validate()?;
        let float = self.ledger.float_account_id();

        let transfer_id = self
            .ledger
            .create_pending_transfer(&input.user_id, &float, &input.amount)
            .await?;

        let row = NewDeposit {
            payment_intent_id: input.payment_intent_id,
            transfer_id: transfer_id.clone(),
            customer_id: input.customer_id,
            user_id: input.user_id,
        };
        if let Err(e) = self.store.insert_pending_deposit(&row).await {
            error!(
                transfer_id = %transfer_id,
                payment_intent_id = %row.payment_intent_id,
                error = %e,
                "Deposit reserved in ledger but correlation row was not written"
            );
            return Err(e.into());
        }

        info!(
            transfer_id = %transfer_id,
            payment_intent_id = %row.payment_intent_id,
            user_id = %row.user_id,
            amount = %input.amount,
            "Pending deposit created"
        );
        Ok(transfer_id)
    }

    /// Ledger reference of a still-pending deposit, if any
    pub async fn get_pending(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<PendingDepositResponse>, PaymentError> {
        let payment_intent_id = require_text("payment_intent_id", payment_intent_id)?;
        let pending = self.store.find_pending_deposit(&payment_intent_id).await?;

        Ok(pending.map(|p| PendingDepositResponse {
            transfer_id: p.transfer_id,
            user_id: p.user_id,
        }))
    }

    pub async fn post_pending(
        &self,
        req: &ResolveDepositRequest,
    ) -> Result<ResolvedTransfer, PaymentError> {
        self.resolve(req, Resolution::Posted).await
    }

    pub async fn void_pending(
        &self,
        req: &ResolveDepositRequest,
    ) -> Result<ResolvedTransfer, PaymentError> {
        self.resolve(req, Resolution::Voided).await
    }

    async fn resolve(
        &self,
        req: &ResolveDepositRequest,
        resolution: Resolution,
    ) -> Result<ResolvedTransfer, PaymentError> {
        let input = req.validate()?;
        let float = self.ledger.float_account_id();

        let resolution_id = match resolution {
            Resolution::Posted => {
                self.ledger
                    .post_pending_transfer(&input.user_id, &float, &input.amount, &input.transfer_id)
                    .await?
            }
            Resolution::Voided => {
                self.ledger
                    .void_pending_transfer(&input.user_id, &float, &input.amount, &input.transfer_id)
                    .await?
            }
        };

        if !self
            .store
            .resolve_deposit(&input.transfer_id, resolution)
            .await?
        {
            warn!(
                transfer_id = %input.transfer_id,
                resolution = resolution.as_str(),
                "Deposit resolved in ledger but no pending row matched"
            );
            return Err(PaymentError::NotFound(format!(
                "pending deposit for transfer {}",
                input.transfer_id
            )));
        }

        info!(
            transfer_id = %input.transfer_id,
            user_id = %input.user_id,
            amount = %input.amount,
            resolution = resolution.as_str(),
            "Pending deposit resolved"
        );
        Ok(ResolvedTransfer {
            transfer_id: input.transfer_id,
            resolution_id,
            status: resolution.status(),
        })
    }
}
