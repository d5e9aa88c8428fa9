//! Ledger query handlers
//!
//! Thin pass-through to [`crate::ledger::LedgerClient`] for onboarding and
//! support tooling. Fund movements go through the payment routes only.

use std::sync::Arc;

use axum::extract::{Path, State};
use serde::Serialize;
use utoipa::ToSchema;

use super::super::extract::ApiQuery;
use super::super::state::AppState;
use super::super::types::{ApiResult, created, ok};
use crate::ledger::{AccountView, TransferQuery, TransferView};

/// Newly created account
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountIdResponse {
    #[schema(example = "18f3a2c4e5b6")]
    pub account_id: String,
}

/// Create a user account
///
/// POST /api/v1/ledger/accounts
#[utoipa::path(
    post,
    path = "/api/v1/ledger/accounts",
    responses(
        (status = 201, description = "Account created", body = AccountIdResponse),
        (status = 500, description = "Ledger failure")
    ),
    tag = "Ledger"
)]
pub async fn create_account(State(state): State<Arc<AppState>>) -> ApiResult<AccountIdResponse> {
    let account_id = state.ledger.create_account().await?;
    created(AccountIdResponse { account_id })
}

/// Look up an account's balances
///
/// GET /api/v1/ledger/accounts/{id}
#[utoipa::path(
    get,
    path = "/api/v1/ledger/accounts/{id}",
    params(("id" = String, Path, description = "Account ID (hex)")),
    responses(
        (status = 200, description = "Account", body = AccountView),
        (status = 400, description = "Malformed ID"),
        (status = 404, description = "Account not found")
    ),
    tag = "Ledger"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<AccountView> {
    ok(state.ledger.lookup_account(&id).await?)
}

/// List transfers touching an account
///
/// GET /api/v1/ledger/accounts/{id}/transfers
#[utoipa::path(
    get,
    path = "/api/v1/ledger/accounts/{id}/transfers",
    params(("id" = String, Path, description = "Account ID (hex)"), TransferQuery),
    responses(
        (status = 200, description = "Transfers in timestamp order", body = Vec<TransferView>),
        (status = 400, description = "Malformed ID or timestamp")
    ),
    tag = "Ledger"
)]
pub async fn get_account_transfers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ApiQuery(query): ApiQuery<TransferQuery>,
) -> ApiResult<Vec<TransferView>> {
    ok(state.ledger.get_account_transfers(&id, &query).await?)
}

/// Look up a transfer and its resolution state
///
/// GET /api/v1/ledger/transfers/{id}
#[utoipa::path(
    get,
    path = "/api/v1/ledger/transfers/{id}",
    params(("id" = String, Path, description = "Transfer ID (hex)")),
    responses(
        (status = 200, description = "Transfer", body = TransferView),
        (status = 404, description = "Transfer not found")
    ),
    tag = "Ledger"
)]
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<TransferView> {
    ok(state.ledger.lookup_transfer(&id).await?)
}
