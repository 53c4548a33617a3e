//! Health Check Endpoints
//!
//! - /health - Liveness
//! - /health/ping - Simple pong
//! - /health/live - Process alive check
//! - /health/ready - Storage reachability, plus whether a sweep is running

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use caseflow_assign::{AssignmentOrchestrator, EscalationSweeper};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HealthDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Readiness details.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthDetails {
    pub storage: ComponentHealth,
    /// An escalation sweep holds the sweep guard right now.
    pub sweep_in_progress: bool,
    pub version: String,
    pub uptime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ComponentHealth {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentHealth {
    fn reachable(latency_ms: u64) -> Self {
        Self {
            status: HealthStatus::Healthy,
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    fn unreachable(error: String) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            error: Some(error),
        }
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /health/ping - Simple pong response
#[utoipa::path(
    get,
    path = "/health/ping",
    tag = "Health",
    responses(
        (status = 200, description = "Service is responding", body = String),
    ),
)]
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// GET /health/live - Process liveness check
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Process is alive", body = HealthResponse),
    ),
)]
pub async fn liveness() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: HealthStatus::Healthy,
        message: Some("Caseflow is accepting requests".to_string()),
        details: None,
    })
}

/// GET /health/ready - Readiness check
///
/// Ready means the assignment store answers an overdue scan. A running sweep
/// is reported but never makes the service unready.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Assignment store reachable", body = HealthResponse),
        (status = 503, description = "Assignment store unreachable", body = HealthResponse),
    ),
)]
pub async fn readiness(
    State(orchestrator): State<Arc<AssignmentOrchestrator>>,
    State(sweeper): State<Arc<EscalationSweeper>>,
    State(start_time): State<Instant>,
) -> impl IntoResponse {
    let storage = match probe_store(&orchestrator).await {
        Ok(latency) => ComponentHealth::reachable(latency),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness probe failed");
            ComponentHealth::unreachable(e)
        }
    };
    let status = storage.status;

    let response = HealthResponse {
        status,
        message: None,
        details: Some(HealthDetails {
            storage,
            sweep_in_progress: sweeper.is_running(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: start_time.elapsed().as_secs(),
        }),
    };

    let code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(response))
}

/// Time a one-row overdue scan against the store.
async fn probe_store(orchestrator: &AssignmentOrchestrator) -> Result<u64, String> {
    let started = Instant::now();
    orchestrator
        .store()
        .assignment_list_overdue(orchestrator.now(), Some(1))
        .await
        .map(|_| started.elapsed().as_millis() as u64)
        .map_err(|e| format!("Assignment store check failed: {}", e))
}

// ============================================================================
// ROUTER
// ============================================================================

/// Create health check router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(liveness))
        .route("/ping", get(ping))
        .route("/live", get(liveness))
        .route("/ready", get(readiness))
}
