//! Payout handlers

use std::sync::Arc;

use axum::extract::{Path, State};

use super::super::extract::ApiJson;
use super::super::state::AppState;
use super::super::types::{ApiResult, created, ok};
use crate::payment::{
    CreatePayoutRequest, ResolvePayoutRequest, ResolvedTransfer, SetPayoutIdRequest,
    TransferIdResponse,
};

/// Reserve funds for a payout
///
/// POST /api/v1/payouts/pending
#[utoipa::path(
    post,
    path = "/api/v1/payouts/pending",
    request_body = CreatePayoutRequest,
    responses(
        (status = 201, description = "Pending payout created", body = TransferIdResponse),
        (status = 400, description = "Malformed identifier or amount"),
        (status = 422, description = "Payout exceeds the user's balance"),
        (status = 500, description = "Ledger or store failure; the reservation is voided")
    ),
    tag = "Payouts"
)]
pub async fn create_pending_payout(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreatePayoutRequest>,
) -> ApiResult<TransferIdResponse> {
    let transfer_id = state.payments.create_pending_payout(&req).await?;
    created(TransferIdResponse { transfer_id })
}

/// Bind the processor payout ID to a pending payout
///
/// PUT /api/v1/payouts/{transfer_id}/payout-id
#[utoipa::path(
    put,
    path = "/api/v1/payouts/{transfer_id}/payout-id",
    params(("transfer_id" = String, Path, description = "Pending ledger transfer ID (hex)")),
    request_body = SetPayoutIdRequest,
    responses(
        (status = 200, description = "Payout ID bound", body = TransferIdResponse),
        (status = 404, description = "No payout for this transfer"),
        (status = 409, description = "Payout ID already bound to another transfer")
    ),
    tag = "Payouts"
)]
pub async fn set_payout_id(
    State(state): State<Arc<AppState>>,
    Path(transfer_id): Path<String>,
    ApiJson(req): ApiJson<SetPayoutIdRequest>,
) -> ApiResult<TransferIdResponse> {
    state
        .payments
        .set_payout_id(&transfer_id, &req.payout_id)
        .await?;
    ok(TransferIdResponse { transfer_id })
}

/// Post a pending payout
///
/// POST /api/v1/payouts/post
#[utoipa::path(
    post,
    path = "/api/v1/payouts/post",
    request_body = ResolvePayoutRequest,
    responses(
        (status = 200, description = "Payout posted", body = ResolvedTransfer),
        (status = 404, description = "No pending payout with this ID")
    ),
    tag = "Payouts"
)]
pub async fn post_pending_payout(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ResolvePayoutRequest>,
) -> ApiResult<ResolvedTransfer> {
    ok(state.payments.post_pending_payout(&req).await?)
}

/// Void a pending payout
///
/// POST /api/v1/payouts/void
#[utoipa::path(
    post,
    path = "/api/v1/payouts/void",
    request_body = ResolvePayoutRequest,
    responses(
        (status = 200, description = "Payout voided", body = ResolvedTransfer),
        (status = 404, description = "No pending payout with this ID")
    ),
    tag = "Payouts"
)]
pub async fn void_pending_payout(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<ResolvePayoutRequest>,
) -> ApiResult<ResolvedTransfer> {
    ok(state.payments.void_pending_payout(&req).await?)
}
