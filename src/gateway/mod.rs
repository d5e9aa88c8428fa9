//! HTTP Gateway
//!
//! JSON surface for the payment orchestrators and ledger queries. Every
//! response uses the `{code, msg, data}` envelope from [`types`].

pub mod extract;
pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    routing::{get, post, put},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;

use state::AppState;
use types::ApiError;

/// Build the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    // ==========================================================================
    // Deposits
    // ==========================================================================
    let deposit_routes = Router::new()
        .route("/", post(handlers::create_deposit))
        .route("/pending", post(handlers::create_pending_deposit))
        .route(
            "/pending/{payment_intent_id}",
            get(handlers::get_pending_deposit),
        )
        .route("/pending/post", post(handlers::post_pending_deposit))
        .route("/pending/void", post(handlers::void_pending_deposit));

    // ==========================================================================
    // Payouts
    // ==========================================================================
    let payout_routes = Router::new()
        .route("/pending", post(handlers::create_pending_payout))
        .route("/{transfer_id}/payout-id", put(handlers::set_payout_id))
        .route("/post", post(handlers::post_pending_payout))
        .route("/void", post(handlers::void_pending_payout));

    // ==========================================================================
    // Ledger
    // ==========================================================================
    let ledger_routes = Router::new()
        .route("/accounts", post(handlers::create_account))
        .route("/accounts/{id}", get(handlers::get_account))
        .route(
            "/accounts/{id}/transfers",
            get(handlers::get_account_transfers),
        )
        .route("/transfers/{id}", get(handlers::get_transfer));

    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .nest("/api/v1/deposits", deposit_routes)
        .nest("/api/v1/payouts", payout_routes)
        .nest("/api/v1/ledger", ledger_routes)
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(openapi::ApiDoc::openapi()) }),
        )
        .fallback(|| async { ApiError::not_found("route not found") })
        .with_state(state)
}

/// Bind and serve until the listener fails
pub async fn run_server(host: &str, port: u16, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {} (port may already be in use)", addr))?;

    tracing::info!(%addr, "Gateway listening");
    tracing::info!("API docs: http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .await
        .context("Gateway server error")?;
    Ok(())
}
