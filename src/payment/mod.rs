//! Payments
//!
//! Orchestration of deposits and payouts across the ledger and the
//! correlation store.
//!
//! ## Ordering
//! Every flow writes the ledger first and the correlation row second. The
//! two are never atomic:
//! - payout creation compensates a failed row insert by voiding the
//!   reservation
//! - deposits and resolutions log the divergence and surface the error
//! - [`Reconciler`] reports rows still `pending` whose ledger transfer has
//!   moved on

pub mod deposit;
pub mod error;
pub mod payout;
pub mod reconcile;
pub mod service;
pub mod types;

#[cfg(test)]
mod integration_tests;

pub use deposit::DepositOrchestrator;
pub use error::PaymentError;
pub use payout::PayoutOrchestrator;
pub use reconcile::{Classification, ReconcileReport, Reconciler, ReconcilerConfig};
pub use service::{PaymentService, PaymentServiceImpl};
pub use types::{
    CreateDepositRequest, CreatePayoutRequest, PendingDepositResponse, ResolveDepositRequest,
    ResolvePayoutRequest, ResolvedTransfer, SetPayoutIdRequest, TransferIdResponse,
};
