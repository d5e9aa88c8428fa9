//! Ledger
//!
//! Client side of the double-entry, two-phase ledger engine.
//!
//! - `types`: accounts, transfers, flags as the engine stores them
//! - `engine`: the async engine port and its result codes
//! - `memory` / `remote`: engine adapters
//! - `client`: [`LedgerClient`], the typed transfer surface used by payments
//! - `view`: hex/RFC 3339 views returned to callers

pub mod client;
pub mod engine;
pub mod error;
pub mod memory;
pub mod remote;
pub mod types;
pub mod view;

pub use client::{LedgerClient, LedgerSettings};
pub use engine::{EngineError, LedgerEngine};
pub use error::LedgerError;
pub use memory::InMemoryLedger;
pub use remote::RemoteLedger;
pub use types::{Account, AccountFlags, Transfer, TransferFlags, TransferStatus};
pub use view::{AccountView, TransferQuery, TransferView};
