//! Float Ledger - Transfer Orchestration & Consistency Engine
//!
//! Moves money between a two-phase double-entry ledger and relational
//! correlation records, keeping the two in step.
//!
//! # Modules
//!
//! - [`codec`] - 128-bit hex and RFC 3339 nanosecond encodings
//! - [`ledger`] - Ledger engine port, adapters and the typed transfer client
//! - [`store`] - Correlation store (PostgreSQL / in-memory)
//! - [`payment`] - Deposit and payout orchestrators, reconciler
//! - [`gateway`] - HTTP surface
//! - [`config`] / [`logging`] / [`db`] - Service plumbing

pub mod codec;
pub mod config;
pub mod db;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod payment;
pub mod store;

// Convenient re-exports at crate root
pub use ledger::{LedgerClient, LedgerError, LedgerSettings};
pub use payment::{PaymentError, PaymentService, PaymentServiceImpl};
pub use store::{CorrelationStore, StoreError};
