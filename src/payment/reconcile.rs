//! Reconciler
//!
//! Read-only scan of correlation rows stuck in `pending`. Each row's ledger
//! transfer is looked up and classified; rows whose ledger transfer is
//! already resolved (or missing) are reported and logged. Nothing is
//! written back.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::{StreamExt, stream};
use tracing::{debug, error, info, warn};

use super::error::PaymentError;
use crate::ledger::{LedgerClient, LedgerError, TransferView};
use crate::store::CorrelationStore;

/// Ledger lookups in flight per scan
const LOOKUP_CONCURRENCY: usize = 8;

/// Reconciler scheduling
#[derive(Debug, Clone)]
pub struct ReconcilerConfig {
    /// How often to scan
    pub scan_interval: Duration,
    /// How long a row must be pending to be checked
    pub stale_threshold: Duration,
    /// Maximum rows per table per scan
    pub batch_size: u32,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_secs(60),
            stale_threshold: Duration::from_secs(300),
            batch_size: 100,
        }
    }
}

/// Which table a row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Deposit,
    Payout,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Deposit => "deposit",
            RecordKind::Payout => "payout",
        }
    }
}

/// Ledger state of a pending row's transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Ledger agrees: still pending
    StillPending,
    /// Ledger posted the reservation; the row lags behind
    ResolvedPosted,
    /// Ledger voided the reservation; the row lags behind
    ResolvedVoided,
    /// Row references a transfer the ledger does not know
    MissingInLedger,
}

impl Classification {
    fn from_view(view: &TransferView) -> Self {
        if view.posted {
            Classification::ResolvedPosted
        } else if view.voided {
            Classification::ResolvedVoided
        } else {
            Classification::StillPending
        }
    }

    pub fn is_discrepancy(&self) -> bool {
        !matches!(self, Classification::StillPending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::StillPending => "STILL_PENDING",
            Classification::ResolvedPosted => "RESOLVED_POSTED",
            Classification::ResolvedVoided => "RESOLVED_VOIDED",
            Classification::MissingInLedger => "MISSING_IN_LEDGER",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One checked row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub kind: RecordKind,
    /// Payment intent ID for deposits, payout row's transfer ID for payouts
    pub key: String,
    pub transfer_id: String,
    pub classification: Classification,
}

/// Result of one scan
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    pub findings: Vec<Finding>,
}

impl ReconcileReport {
    pub fn scanned(&self) -> usize {
        self.findings.len()
    }

    pub fn discrepancies(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.classification.is_discrepancy())
    }
}

pub struct Reconciler {
    ledger: Arc<LedgerClient>,
    store: Arc<dyn CorrelationStore>,
    config: ReconcilerConfig,
}

impl Reconciler {
    pub fn new(
        ledger: Arc<LedgerClient>,
        store: Arc<dyn CorrelationStore>,
        config: ReconcilerConfig,
    ) -> Self {
        Self {
            ledger,
            store,
            config,
        }
    }

    /// Run the scan loop forever
    pub async fn run(&self) -> ! {
        info!(
            scan_interval_secs = self.config.scan_interval.as_secs(),
            stale_threshold_secs = self.config.stale_threshold.as_secs(),
            "Starting reconciler"
        );

        loop {
            match self.scan(self.config.stale_threshold).await {
                Ok(report) => {
                    let flagged = report.discrepancies().count();
                    if flagged > 0 {
                        warn!(
                            scanned = report.scanned(),
                            flagged, "Reconciliation found discrepancies"
                        );
                    } else {
                        debug!(scanned = report.scanned(), "Reconciliation clean");
                    }
                }
                Err(e) => error!(error = %e, "Reconciliation scan failed"),
            }

            tokio::time::sleep(self.config.scan_interval).await;
        }
    }

    /// Classify pending rows created more than `older_than` ago
    pub async fn scan(&self, older_than: Duration) -> Result<ReconcileReport, PaymentError> {
        let deposits = self
            .store
            .find_stale_deposits(older_than, self.config.batch_size)
            .await?;
        let payouts = self
            .store
            .find_stale_payouts(older_than, self.config.batch_size)
            .await?;

        let rows = deposits
            .into_iter()
            .map(|d| (RecordKind::Deposit, d.payment_intent_id, d.transfer_id))
            .chain(
                payouts
                    .into_iter()
                    .map(|p| (RecordKind::Payout, p.transfer_id.clone(), p.transfer_id)),
            );

        let mut checks = stream::iter(rows)
            .map(|(kind, key, transfer_id)| async move {
                let classification = self.classify(&transfer_id).await?;
                Ok::<_, PaymentError>(Finding {
                    kind,
                    key,
                    transfer_id,
                    classification,
                })
            })
            .buffered(LOOKUP_CONCURRENCY);

        let mut report = ReconcileReport::default();
        while let Some(result) = checks.next().await {
            let finding = result?;
            if finding.classification.is_discrepancy() {
                warn!(
                    kind = finding.kind.as_str(),
                    key = %finding.key,
                    transfer_id = %finding.transfer_id,
                    classification = %finding.classification,
                    "Pending row disagrees with ledger"
                );
            }
            report.findings.push(finding);
        }
        Ok(report)
    }

    async fn classify(&self, transfer_id: &str) -> Result<Classification, PaymentError> {
        match self.ledger.lookup_transfer(transfer_id).await {
            Ok(view) => Ok(Classification::from_view(&view)),
            Err(LedgerError::NotFound(_)) | Err(LedgerError::InvalidRequest(_)) => {
                Ok(Classification::MissingInLedger)
            }
            Err(e) => Err(e.into()),
        }
    }
}
