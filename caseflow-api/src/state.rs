//! Shared application state for Axum routers.

use std::sync::Arc;

use caseflow_assign::{AssignmentOrchestrator, EscalationSweeper};

use crate::jobs::{EscalationSweepConfig, EscalationSweepMetrics};

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AssignmentOrchestrator>,
    pub sweeper: Arc<EscalationSweeper>,
    pub sweep_config: EscalationSweepConfig,
    /// Same counters the background sweep task writes to.
    pub sweep_metrics: Arc<EscalationSweepMetrics>,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Build state around an orchestrator, with a sweeper sized by `sweep_config`.
    pub fn new(orchestrator: Arc<AssignmentOrchestrator>, sweep_config: EscalationSweepConfig) -> Self {
        let sweeper = Arc::new(
            EscalationSweeper::new(Arc::clone(&orchestrator)).with_batch_size(sweep_config.batch_size),
        );
        Self {
            orchestrator,
            sweeper,
            sweep_config,
            sweep_metrics: Arc::new(EscalationSweepMetrics::new()),
            start_time: std::time::Instant::now(),
        }
    }
}

crate::impl_from_ref!(Arc<AssignmentOrchestrator>, orchestrator);
crate::impl_from_ref!(Arc<EscalationSweeper>, sweeper);
crate::impl_from_ref!(Arc<EscalationSweepMetrics>, sweep_metrics);
crate::impl_from_ref!(std::time::Instant, start_time);
