//! Caseflow API Server Entry Point
//!
//! Bootstraps configuration and storage, spawns the escalation sweep task,
//! and starts the Axum HTTP server.

use std::sync::Arc;

use caseflow_api::config::assignment_config_from_env;
use caseflow_api::{
    create_api_router, escalation_sweep_task, seed, telemetry, ApiConfig, ApiError, ApiResult,
    AppState, EscalationSweepConfig,
};
use caseflow_assign::AssignmentOrchestrator;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> ApiResult<()> {
    telemetry::init_tracing(&telemetry::TelemetryConfig::default())?;

    let api_config = ApiConfig::from_env();
    let sweep_config = EscalationSweepConfig::from_env();
    let assignment_config = assignment_config_from_env()?;

    let storage = Arc::new(seed::load_storage(api_config.seed_file.as_deref())?);
    let orchestrator =
        Arc::new(AssignmentOrchestrator::from_storage(storage).with_config(assignment_config));
    let state = AppState::new(orchestrator, sweep_config.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweep_handle = if sweep_config.enabled {
        Some(tokio::spawn(escalation_sweep_task(
            Arc::clone(&state.sweeper),
            sweep_config,
            Arc::clone(&state.sweep_metrics),
            shutdown_rx,
        )))
    } else {
        tracing::warn!("Escalation sweep task disabled");
        None
    };

    let app = create_api_router(state, &api_config);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting Caseflow API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    let _ = shutdown_tx.send(true);
    if let Some(handle) = sweep_handle {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Escalation sweep task panicked");
        }
    }

    Ok(())
}
