//! Caseflow API - REST Layer
//!
//! Exposes the assignment engine over HTTP (Axum), runs the scheduled
//! escalation sweep, and wires up logging and configuration for the server
//! binary.

pub mod config;
pub mod constants;
pub mod error;
pub mod extractors;
pub mod jobs;
mod macros;
pub mod openapi;
pub mod routes;
pub mod seed;
pub mod state;
pub mod telemetry;

// Re-export commonly used types
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use jobs::{escalation_sweep_task, EscalationSweepConfig, EscalationSweepMetrics};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::AppState;
