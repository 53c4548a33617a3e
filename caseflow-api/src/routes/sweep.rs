//! Escalation Sweep REST API Routes
//!
//! Trigger a sweep on demand and read the counters shared with the
//! background task.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use caseflow_assign::SweepReport;
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    jobs::{run_sweep_cycle, EscalationSweepMetrics, EscalationSweepSnapshot},
    state::AppState,
};

/// POST /api/v1/sweeps - Run an escalation sweep now
#[utoipa::path(
    post,
    path = "/api/v1/sweeps",
    tag = "Sweeps",
    responses(
        (status = 200, description = "Sweep finished", body = SweepReport),
        (status = 409, description = "A sweep is already running", body = ApiError),
        (status = 500, description = "Overdue scan failed", body = ApiError),
    ),
)]
pub async fn run_sweep(State(state): State<AppState>) -> ApiResult<Json<SweepReport>> {
    let report = run_sweep_cycle(&state.sweeper, &state.sweep_config, &state.sweep_metrics).await?;
    Ok(Json(report))
}

/// GET /api/v1/sweeps/metrics - Sweep counters since startup
#[utoipa::path(
    get,
    path = "/api/v1/sweeps/metrics",
    tag = "Sweeps",
    responses(
        (status = 200, description = "Metrics snapshot", body = EscalationSweepSnapshot),
    ),
)]
pub async fn sweep_metrics(
    State(metrics): State<Arc<EscalationSweepMetrics>>,
) -> Json<EscalationSweepSnapshot> {
    Json(metrics.snapshot())
}

/// Create the sweep routes router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", post(run_sweep))
        .route("/metrics", get(sweep_metrics))
}
