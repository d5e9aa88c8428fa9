//! Health check handler

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use super::super::state::AppState;
use super::super::types::ApiResponse;

/// Health check response data
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_u64)]
    pub timestamp_ms: u64,
    /// Build revision
    #[schema(example = "a1b2c3d")]
    pub version: &'static str,
    /// Ledger engine adapter
    #[schema(example = "memory")]
    pub ledger: &'static str,
}

/// Health check endpoint
///
/// Pings the correlation database (when configured) and the float account
/// on the ledger. Dependency details are never exposed.
///
/// - Healthy: 200 OK + {code: 0, data: {...}}
/// - Unhealthy: 503 Service Unavailable + {code: 503, msg: "unavailable"}
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse, content_type = "application/json"),
        (status = 503, description = "Service unavailable")
    ),
    tag = "System"
)]
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    // Rate limit: only ping dependencies once per interval
    static LAST_CHECK_MS: AtomicU64 = AtomicU64::new(0);
    static LAST_HEALTHY: AtomicBool = AtomicBool::new(true);
    const CHECK_INTERVAL_MS: u64 = 5000;

    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let last_check = LAST_CHECK_MS.load(Ordering::Relaxed);
    let healthy = if now_ms.saturating_sub(last_check) > CHECK_INTERVAL_MS {
        LAST_CHECK_MS.store(now_ms, Ordering::Relaxed);
        let healthy = check_dependencies(&state).await;
        LAST_HEALTHY.store(healthy, Ordering::Relaxed);
        healthy
    } else {
        LAST_HEALTHY.load(Ordering::Relaxed)
    };

    if healthy {
        (
            StatusCode::OK,
            Json(ApiResponse::success(HealthResponse {
                timestamp_ms: now_ms,
                version: env!("GIT_HASH"),
                ledger: state.ledger.engine_name(),
            })),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                code: 503,
                msg: "unavailable".to_string(),
                data: None,
            }),
        )
    }
}

async fn check_dependencies(state: &AppState) -> bool {
    if let Some(ref db) = state.db
        && let Err(e) = db.health_check().await
    {
        tracing::error!(error = %e, "[HEALTH] PostgreSQL ping failed");
        return false;
    }

    let float = state.ledger.float_account_id();
    if let Err(e) = state.ledger.lookup_account(&float).await {
        tracing::error!(error = %e, "[HEALTH] Float account lookup failed");
        return false;
    }
    true
}
