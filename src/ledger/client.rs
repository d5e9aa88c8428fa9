//! Ledger Transfer Client
//!
//! Typed wrapper over the engine port. Inputs are hex strings as received
//! from callers; outputs are [`AccountView`] / [`TransferView`] or canonical
//! hex IDs.
//!
//! ## Direction
//! Every operation takes explicit debit and credit accounts. Callers pick the
//! direction; the client never swaps them.
//!
//! ## Resolution
//! Post and void are at-most-once: an engine rejection is returned as an
//! error and never retried here.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::{FutureExt, StreamExt, TryStreamExt, stream};
use tracing::{error, info, warn};

use super::engine::{CreateAccountResult, LedgerEngine};
use super::error::LedgerError;
use super::types::{
    Account, AccountFilter, AccountFlags, Transfer, TransferFlags, TransferKind, TransferStatus,
};
use super::view::{AccountView, TransferQuery, TransferView};
use crate::codec::{format_u128, now_nanos, parse_nonzero_u128, parse_timestamp};

/// Default page size for account transfer listing
pub const DEFAULT_TRANSFER_LIMIT: u32 = 50;

/// Engine batch ceiling
pub const MAX_TRANSFER_LIMIT: u32 = 8190;

/// Concurrent history scans when deriving reservation state
const RESOLVE_CONCURRENCY: usize = 4;

/// Fixed ledger parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerSettings {
    pub float_account_id: u128,
    pub ledger: u32,
    pub account_code: u16,
    pub transfer_code: u16,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            float_account_id: 1,
            ledger: 1,
            account_code: 718,
            transfer_code: 1,
        }
    }
}

/// Parsed resolution request
struct Resolution {
    debit: u128,
    credit: u128,
    amount: u128,
    pending_id: u128,
}

/// Ledger Transfer Client
pub struct LedgerClient {
    engine: Arc<dyn LedgerEngine>,
    settings: LedgerSettings,
}

impl LedgerClient {
    pub fn new(engine: Arc<dyn LedgerEngine>, settings: LedgerSettings) -> Self {
        Self { engine, settings }
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// Float account ID as canonical hex
    pub fn float_account_id(&self) -> String {
        format_u128(self.settings.float_account_id)
    }

    /// Engine adapter name
    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    /// Single-phase transfer, posted immediately
    pub async fn create_transfer(
        &self,
        debit: &str,
        credit: &str,
        amount: &str,
    ) -> Result<String, LedgerError> {
        let transfer = self.new_transfer(debit, credit, amount, TransferFlags::NONE)?;
        self.submit("create_transfer", transfer).await
    }

    /// Reserve `amount` on both accounts' pending counters
    pub async fn create_pending_transfer(
        &self,
        debit: &str,
        credit: &str,
        amount: &str,
    ) -> Result<String, LedgerError> {
        let transfer = self.new_transfer(debit, credit, amount, TransferFlags::PENDING)?;
        self.submit("create_pending_transfer", transfer).await
    }

    /// Post a reservation
    pub async fn post_pending_transfer(
        &self,
        debit: &str,
        credit: &str,
        amount: &str,
        pending_transfer_id: &str,
    ) -> Result<String, LedgerError> {
        let r = Self::parse_resolution(debit, credit, amount, pending_transfer_id)?;
        let transfer = self.resolution_transfer(r, TransferFlags::POST_PENDING_TRANSFER);
        self.submit("post_pending_transfer", transfer).await
    }

    /// Void a reservation
    pub async fn void_pending_transfer(
        &self,
        debit: &str,
        credit: &str,
        amount: &str,
        pending_transfer_id: &str,
    ) -> Result<String, LedgerError> {
        let r = Self::parse_resolution(debit, credit, amount, pending_transfer_id)?;
        let transfer = self.resolution_transfer(r, TransferFlags::VOID_PENDING_TRANSFER);
        self.submit("void_pending_transfer", transfer).await
    }

    /// Look up a transfer and derive its resolution state
    pub async fn lookup_transfer(&self, transfer_id: &str) -> Result<TransferView, LedgerError> {
        let id = parse_nonzero_u128("transfer_id", transfer_id)?;
        let transfer = self
            .engine
            .lookup_transfers(&[id])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| LedgerError::NotFound(format!("transfer {}", format_u128(id))))?;

        let statuses = self.resolve_statuses(std::slice::from_ref(&transfer)).await?;
        Ok(TransferView::new(&transfer, status_of(&statuses, &transfer)))
    }

    /// One time-bounded page of transfers touching `account_id`
    pub async fn get_account_transfers(
        &self,
        account_id: &str,
        query: &TransferQuery,
    ) -> Result<Vec<TransferView>, LedgerError> {
        let account_id = parse_nonzero_u128("account_id", account_id)?;
        let min = match query.min_timestamp.as_deref() {
            Some(s) => parse_timestamp(s)?,
            None => 0,
        };
        let max = match query.max_timestamp.as_deref() {
            Some(s) => parse_timestamp(s)?,
            None => now_nanos(),
        };
        if min > max {
            return Err(LedgerError::InvalidRequest(
                "min_timestamp must not be after max_timestamp".to_string(),
            ));
        }

        let limit = query
            .limit
            .unwrap_or(DEFAULT_TRANSFER_LIMIT)
            .clamp(1, MAX_TRANSFER_LIMIT);
        let mut filter = AccountFilter::both_sides(account_id, min, max, limit);
        filter.reversed = query.reversed.unwrap_or(false);

        let transfers = self.engine.get_account_transfers(&filter).await?;
        let statuses = self.resolve_statuses(&transfers).await?;
        Ok(transfers
            .iter()
            .map(|t| TransferView::new(t, status_of(&statuses, t)))
            .collect())
    }

    // ========================================================================
    // Accounts
    // ========================================================================

    pub async fn lookup_account(&self, account_id: &str) -> Result<AccountView, LedgerError> {
        let id = parse_nonzero_u128("account_id", account_id)?;
        self.engine
            .lookup_accounts(&[id])
            .await?
            .first()
            .map(AccountView::from)
            .ok_or_else(|| LedgerError::NotFound(format!("account {}", format_u128(id))))
    }

    /// Create a user account with a fresh ID
    ///
    /// User accounts carry `credits_must_not_exceed_debits`, so payouts cannot
    /// exceed what was deposited.
    pub async fn create_account(&self) -> Result<String, LedgerError> {
        let account = Account::new(
            ulid::Ulid::new().into(),
            self.settings.ledger,
            self.settings.account_code,
            AccountFlags::CREDITS_MUST_NOT_EXCEED_DEBITS,
        );
        let id = format_u128(account.id);

        let errors = self.engine.create_accounts(&[account]).await.map_err(|e| {
            error!(error = %e, "Failed to create account");
            LedgerError::from(e)
        })?;
        if let Some(err) = errors.first() {
            warn!(account_id = %id, result = err.result.as_str(), "Ledger rejected account");
            return Err(LedgerError::Unexpected(err.result.as_str().to_string()));
        }

        info!(account_id = %id, "Created account");
        Ok(id)
    }

    /// Create the float account; an existing one is success
    pub async fn ensure_float_account(&self) -> Result<(), LedgerError> {
        let account = Account::new(
            self.settings.float_account_id,
            self.settings.ledger,
            self.settings.account_code,
            AccountFlags::NONE,
        );

        let errors = self.engine.create_accounts(&[account]).await?;
        match errors.first().map(|e| e.result) {
            None => {
                info!(account_id = %self.float_account_id(), "Created float account");
                Ok(())
            }
            Some(CreateAccountResult::Exists) => Ok(()),
            Some(result) => {
                error!(
                    account_id = %self.float_account_id(),
                    result = result.as_str(),
                    "Failed to ensure float account exists"
                );
                Err(LedgerError::Unexpected(result.as_str().to_string()))
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn new_transfer(
        &self,
        debit: &str,
        credit: &str,
        amount: &str,
        flags: TransferFlags,
    ) -> Result<Transfer, LedgerError> {
        Ok(Transfer {
            id: ulid::Ulid::new().into(),
            debit_account_id: parse_nonzero_u128("debit_account_id", debit)?,
            credit_account_id: parse_nonzero_u128("credit_account_id", credit)?,
            amount: parse_nonzero_u128("amount", amount)?,
            pending_id: 0,
            ledger: self.settings.ledger,
            code: self.settings.transfer_code,
            flags,
            timestamp: 0,
        })
    }

    fn parse_resolution(
        debit: &str,
        credit: &str,
        amount: &str,
        pending_transfer_id: &str,
    ) -> Result<Resolution, LedgerError> {
        Ok(Resolution {
            debit: parse_nonzero_u128("debit_account_id", debit)?,
            credit: parse_nonzero_u128("credit_account_id", credit)?,
            amount: parse_nonzero_u128("amount", amount)?,
            pending_id: parse_nonzero_u128("pending_transfer_id", pending_transfer_id)?,
        })
    }

    fn resolution_transfer(&self, r: Resolution, flags: TransferFlags) -> Transfer {
        Transfer {
            id: ulid::Ulid::new().into(),
            debit_account_id: r.debit,
            credit_account_id: r.credit,
            amount: r.amount,
            pending_id: r.pending_id,
            ledger: self.settings.ledger,
            code: self.settings.transfer_code,
            flags,
            timestamp: 0,
        }
    }

    async fn submit(&self, op: &'static str, transfer: Transfer) -> Result<String, LedgerError> {
        let transfer_id = format_u128(transfer.id);

        let errors = self
            .engine
            .create_transfers(std::slice::from_ref(&transfer))
            .await
            .map_err(|e| {
                error!(op, transfer_id = %transfer_id, error = %e, "Ledger call failed");
                LedgerError::from(e)
            })?;

        if let Some(err) = errors.first() {
            warn!(
                op,
                transfer_id = %transfer_id,
                pending_id = %format_u128(transfer.pending_id),
                result = err.result.as_str(),
                "Ledger rejected transfer"
            );
            return Err(LedgerError::from_transfer_result(err.result));
        }

        info!(
            op,
            transfer_id = %transfer_id,
            amount = %format_u128(transfer.amount),
            "Ledger transfer committed"
        );
        Ok(transfer_id)
    }

    /// Resolution state of every transfer in `transfers`, keyed by ID
    ///
    /// A reservation is posted or voided if a later transfer on its debit
    /// account references it. Reservations are grouped by debit account and
    /// each account's history is paged once, forward from its oldest
    /// reservation, until every reservation is matched or the history ends.
    async fn resolve_statuses<'a>(
        &self,
        transfers: &'a [Transfer],
    ) -> Result<HashMap<u128, TransferStatus>, LedgerError> {
        let mut statuses = HashMap::with_capacity(transfers.len());
        let mut reservations: HashMap<u128, Vec<&'a Transfer>> = HashMap::new();
        for t in transfers {
            match t.kind() {
                TransferKind::Single | TransferKind::PostPending => {
                    statuses.insert(t.id, TransferStatus::Posted);
                }
                TransferKind::VoidPending => {
                    statuses.insert(t.id, TransferStatus::Voided);
                }
                TransferKind::Pending => reservations.entry(t.debit_account_id).or_default().push(t),
            }
        }

        let scans: Vec<_> = reservations
            .into_iter()
            .map(|(debit, group): (u128, Vec<&'a Transfer>)| self.scan_resolutions(debit, group).boxed())
            .collect();
        let scanned: Vec<HashMap<u128, TransferStatus>> = stream::iter(scans)
            .buffer_unordered(RESOLVE_CONCURRENCY)
            .try_collect()
            .await?;
        statuses.extend(scanned.into_iter().flatten());
        Ok(statuses)
    }

    async fn scan_resolutions(
        &self,
        debit_account_id: u128,
        reservations: Vec<&Transfer>,
    ) -> Result<HashMap<u128, TransferStatus>, LedgerError> {
        let mut outstanding: HashSet<u128> = reservations.iter().map(|t| t.id).collect();
        let mut statuses = HashMap::with_capacity(outstanding.len());
        let oldest = reservations.iter().map(|t| t.timestamp).min().unwrap_or(0);

        let mut filter =
            AccountFilter::both_sides(debit_account_id, oldest, u64::MAX, MAX_TRANSFER_LIMIT);
        filter.credits = false;

        while !outstanding.is_empty() {
            let page = self.engine.get_account_transfers(&filter).await?;

            for t in &page {
                let status = match t.kind() {
                    TransferKind::PostPending => TransferStatus::Posted,
                    TransferKind::VoidPending => TransferStatus::Voided,
                    _ => continue,
                };
                if outstanding.remove(&t.pending_id) {
                    statuses.insert(t.pending_id, status);
                }
            }

            match page.last() {
                Some(last) if page.len() == filter.limit as usize => {
                    filter.timestamp_min = last.timestamp + 1;
                }
                _ => break,
            }
        }

        statuses.extend(outstanding.into_iter().map(|id| (id, TransferStatus::Pending)));
        Ok(statuses)
    }
}

fn status_of(statuses: &HashMap<u128, TransferStatus>, transfer: &Transfer) -> TransferStatus {
    statuses
        .get(&transfer.id)
        .copied()
        .unwrap_or(TransferStatus::Pending)
}
