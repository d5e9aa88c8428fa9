//! HTTP handlers, one module per resource

pub mod deposit;
pub mod health;
pub mod ledger;
pub mod payout;

pub use deposit::{
    create_deposit, create_pending_deposit, get_pending_deposit, post_pending_deposit,
    void_pending_deposit,
};
pub use health::{HealthResponse, health_check};
pub use ledger::{AccountIdResponse, create_account, get_account, get_account_transfers, get_transfer};
pub use payout::{create_pending_payout, post_pending_payout, set_payout_id, void_pending_payout};
