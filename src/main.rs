//! Float Ledger - Transfer Orchestration Service
//!
//! ```text
//! ┌──────────┐    ┌──────────┐    ┌──────────┐
//! │ Gateway  │───▶│ Payments │───▶│  Ledger  │  (reserve / post / void)
//! │  (HTTP)  │    │ (orch.)  │───▶│  Store   │  (correlation rows)
//! └──────────┘    └──────────┘    └──────────┘
//!                       ▲
//!                 ┌──────────┐
//!                 │Reconciler│  (optional, read-only)
//!                 └──────────┘
//! ```
//!
//! Usage: `float_ledger [--env dev] [--port 8080]`

use std::sync::Arc;

use anyhow::Context;
use tracing::Instrument;

use float_ledger::config::AppConfig;
use float_ledger::db::Database;
use float_ledger::gateway::{self, state::AppState};
use float_ledger::ledger::LedgerClient;
use float_ledger::payment::{PaymentServiceImpl, Reconciler};
use float_ledger::store::{CorrelationStore, MemoryCorrelationStore, PgCorrelationStore};

// ============================================================
// ARGUMENTS
// ============================================================

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

// ============================================================
// MAIN
// ============================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = float_ledger::logging::init_logging(&app_config);

    tracing::info!(env = %env, "Starting float_ledger");

    // Ledger
    let engine = app_config.ledger.engine()?;
    let ledger = Arc::new(LedgerClient::new(engine, app_config.ledger.settings()?));
    ledger
        .ensure_float_account()
        .await
        .context("Failed to ensure float account")?;
    tracing::info!(
        engine = ledger.engine_name(),
        float_account_id = %ledger.float_account_id(),
        "Ledger ready"
    );

    // Correlation store
    let (store, db): (Arc<dyn CorrelationStore>, Option<Arc<Database>>) =
        match app_config.postgres_url.as_deref() {
            Some(url) => {
                let db = Arc::new(
                    Database::connect(url)
                        .await
                        .context("Failed to connect to PostgreSQL")?,
                );
                db.apply_schema()
                    .await
                    .context("Failed to apply banking schema")?;
                (Arc::new(PgCorrelationStore::new(db.pool().clone())), Some(db))
            }
            None => {
                tracing::warn!("postgres_url not set, correlation records are kept in memory");
                (Arc::new(MemoryCorrelationStore::new()), None)
            }
        };
    tracing::info!(store = store.name(), "Correlation store ready");

    // Reconciler
    if app_config.reconciler.enabled {
        let reconciler = Reconciler::new(
            ledger.clone(),
            store.clone(),
            app_config.reconciler.worker_config(),
        );
        tokio::spawn(
            async move {
                reconciler.run().await;
            }
            .instrument(tracing::info_span!("reconciler")),
        );
    }

    // Gateway
    let payments = Arc::new(PaymentServiceImpl::new(ledger.clone(), store));
    let state = Arc::new(AppState::new(payments, ledger, db));
    let port = get_port_override().unwrap_or(app_config.gateway.port);

    gateway::run_server(&app_config.gateway.host, port, state).await
}
