//! OpenAPI Documentation
//!
//! OpenAPI JSON: `http://localhost:8080/api-docs/openapi.json`

use utoipa::OpenApi;

use crate::gateway::handlers::{AccountIdResponse, HealthResponse};
use crate::ledger::{AccountView, TransferView};
use crate::payment::{
    CreateDepositRequest, CreatePayoutRequest, PendingDepositResponse, ResolveDepositRequest,
    ResolvePayoutRequest, ResolvedTransfer, SetPayoutIdRequest, TransferIdResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Float Ledger API",
        version = "1.0.0",
        description = "Deposit and payout orchestration over a two-phase double-entry ledger.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        // Deposits
        crate::gateway::handlers::deposit::create_deposit,
        crate::gateway::handlers::deposit::create_pending_deposit,
        crate::gateway::handlers::deposit::get_pending_deposit,
        crate::gateway::handlers::deposit::post_pending_deposit,
        crate::gateway::handlers::deposit::void_pending_deposit,
        // Payouts
        crate::gateway::handlers::payout::create_pending_payout,
        crate::gateway::handlers::payout::set_payout_id,
        crate::gateway::handlers::payout::post_pending_payout,
        crate::gateway::handlers::payout::void_pending_payout,
        // Ledger
        crate::gateway::handlers::ledger::create_account,
        crate::gateway::handlers::ledger::get_account,
        crate::gateway::handlers::ledger::get_account_transfers,
        crate::gateway::handlers::ledger::get_transfer,
    ),
    components(
        schemas(
            HealthResponse,
            CreateDepositRequest,
            ResolveDepositRequest,
            PendingDepositResponse,
            CreatePayoutRequest,
            SetPayoutIdRequest,
            ResolvePayoutRequest,
            TransferIdResponse,
            ResolvedTransfer,
            AccountIdResponse,
            AccountView,
            TransferView,
        )
    ),
    tags(
        (name = "Deposits", description = "Direct and two-phase deposits into the float account"),
        (name = "Payouts", description = "Two-phase payouts from the float account"),
        (name = "Ledger", description = "Account and transfer queries"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;
