use std::sync::Arc;

use crate::db::Database;
use crate::ledger::LedgerClient;
use crate::payment::PaymentService;

/// Gateway shared state
#[derive(Clone)]
pub struct AppState {
    /// Deposit and payout orchestration
    pub payments: Arc<dyn PaymentService>,
    /// Direct ledger access for account and transfer queries
    pub ledger: Arc<LedgerClient>,
    /// PostgreSQL, when the correlation store is database-backed
    pub db: Option<Arc<Database>>,
}

impl AppState {
    pub fn new(
        payments: Arc<dyn PaymentService>,
        ledger: Arc<LedgerClient>,
        db: Option<Arc<Database>>,
    ) -> Self {
        Self {
            payments,
            ledger,
            db,
        }
    }
}
