//! Deposit handlers

use std::sync::Arc;

use axum::extract::{Path, State};

use super::super::extract::ApiJson;
use super::super::state::AppState;
use super::super::types::{ApiResult, created, ok};
use crate::payment::{
    CreateDepositRequest, PendingDepositResponse, ResolveDepositRequest, ResolvedTransfer,
    TransferIdResponse,
};

/// Create and post a deposit in one step
///
/// POST /api/v1/deposits
#[utoipa::path(
    post,
    path = "/api/v1/deposits",
    request_body = CreateDepositRequest,
    responses(
        (status = 201, description = "Deposit posted", body = TransferIdResponse),
        (status = 400, description = "Malformed identifier or amount"),
        (status = 409, description = "Payment intent already recorded"),
        (status = 500, description = "Ledger or store failure")
    ),
    tag = "Deposits"
)]
pub async fn create_deposit(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateDepositRequest>,
) -> ApiResult<TransferIdResponse> {
    let transfer_id = state.payments.create_and_post_deposit(&req).await?;
    created(TransferIdResponse { transfer_id })
}

/// Reserve a deposit on the ledger
///
/// POST /api/v1/deposits/pending
#[utoipa::path(
    post,
    path = "/api/v1/deposits/pending",
    request_body = CreateDepositRequest,
    responses(
        (status = 201, description = "Pending deposit created", body = TransferIdResponse),
        (status = 400, description = "Malformed identifier or amount"),
        (status = 409, description = "Payment intent already recorded")
    ),
    tag = "Deposits"
)]
pub async fn create_pending_deposit(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateDepositRequest>,
) -> ApiResult<TransferIdResponse> {
    let transfer_id = state.payments.create_pending_deposit(&req).await?;
    created(TransferIdResponse { transfer_id })
}

/// Idempotency lookup for a payment intent
///
/// GET /api/v1/deposits/pending/{payment_intent_id}
#[utoipa::path(
    get,
    path = "/api/v1/deposits/pending/{payment_intent_id}",
    params(("payment_intent_id" = String, Path, description = "Processor payment intent ID")),
    responses(
        (status = 200, description = "Pending reservation, or null data when none exists", body = PendingDepositResponse)
    ),
    tag = "Deposits"
)]
pub async fn get_pending_deposit(
    State(state): State<Arc<AppState>>,
    Path(payment_intent_id): Path<String>,
) -> ApiResult<Option<PendingDepositResponse>> {
    ok(state.payments.get_pending_deposit(&payment_intent_id).await?)
}

/// Post a pending deposit
///
/// POST /api/v1/deposits/pending/post
#[utoipa::path(
    post,
    path = "/api/v1/deposits/pending/post",
    request_body = ResolveDepositRequest,
    responses(
        (status = 200, description = "Deposit posted", body = ResolvedTransfer),
        (status = 404, description = "Reservation missing or already resolved")
    ),
    tag = "Deposits"
)]
pub async fn post_pending_deposit(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ResolveDepositRequest>,
) -> ApiResult<ResolvedTransfer> {
    ok(state.payments.post_pending_deposit(&req).await?)
}

/// Void a pending deposit
///
/// POST /api/v1/deposits/pending/void
#[utoipa::path(
    post,
    path = "/api/v1/deposits/pending/void",
    request_body = ResolveDepositRequest,
    responses(
        (status = 200, description = "Deposit voided", body = ResolvedTransfer),
        (status = 404, description = "Reservation missing or already resolved")
    ),
    tag = "Deposits"
)]
pub async fn void_pending_deposit(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ResolveDepositRequest>,
) -> ApiResult<ResolvedTransfer> {
    ok(state.payments.void_pending_deposit(&req).await?)
}
