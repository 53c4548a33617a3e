//! Escalation Sweep Background Task
//!
//! Periodically escalates pending assignments whose acceptance deadline has
//! passed. Each cycle delegates to [`EscalationSweeper::run_once`], which
//! reassigns overdue work to the least-loaded eligible caseworker or flags it
//! for attention when no one can take it.
//!
//! # Configuration
//!
//! ```rust
//! use caseflow_api::jobs::EscalationSweepConfig;
//! use std::time::Duration;
//!
//! let config = EscalationSweepConfig {
//!     check_interval: Duration::from_secs(900), // Every 15 minutes
//!     batch_size: 500,                          // Escalate up to 500 per cycle
//!     log_escalations: true,
//!     enabled: true,
//! };
//! ```

use crate::constants::{DEFAULT_SWEEP_BATCH_SIZE, DEFAULT_SWEEP_CHECK_INTERVAL_SECS};
use caseflow_assign::{EscalationSweeper, SweepReport};
use caseflow_core::{AssignmentError, CaseflowError, CaseflowResult};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Configuration for the escalation sweep background task.
#[derive(Debug, Clone)]
pub struct EscalationSweepConfig {
    /// How often to sweep for overdue assignments (default: 15 minutes)
    pub check_interval: Duration,

    /// Maximum number of overdue assignments escalated per cycle
    /// (default: 500)
    pub batch_size: usize,

    /// Whether to log a summary of every non-empty cycle (default: true)
    pub log_escalations: bool,

    /// Whether the server spawns the task at all (default: true)
    pub enabled: bool,
}

impl Default for EscalationSweepConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(DEFAULT_SWEEP_CHECK_INTERVAL_SECS),
            batch_size: DEFAULT_SWEEP_BATCH_SIZE,
            log_escalations: true,
            enabled: true,
        }
    }
}

impl EscalationSweepConfig {
    /// Create EscalationSweepConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `CASEFLOW_SWEEP_CHECK_INTERVAL_SECS`: Seconds between sweeps (default: 900)
    /// - `CASEFLOW_SWEEP_BATCH_SIZE`: Max assignments per sweep (default: 500)
    /// - `CASEFLOW_SWEEP_LOG_ESCALATIONS`: Whether to log cycle summaries (default: true)
    /// - `CASEFLOW_SWEEP_ENABLED`: Whether to run the task (default: true)
    pub fn from_env() -> Self {
        let check_interval = Duration::from_secs(
            std::env::var("CASEFLOW_SWEEP_CHECK_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_SWEEP_CHECK_INTERVAL_SECS),
        );

        let batch_size = std::env::var("CASEFLOW_SWEEP_BATCH_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_SWEEP_BATCH_SIZE);

        let log_escalations = std::env::var("CASEFLOW_SWEEP_LOG_ESCALATIONS")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(true);

        let enabled = std::env::var("CASEFLOW_SWEEP_ENABLED")
            .ok()
            .map(|s| s.to_lowercase() != "false")
            .unwrap_or(true);

        Self {
            check_interval,
            batch_size,
            log_escalations,
            enabled,
        }
    }

    /// Create a configuration for development with a short interval.
    pub fn development() -> Self {
        Self {
            check_interval: Duration::from_secs(30),
            batch_size: 50,
            log_escalations: true,
            enabled: true,
        }
    }

    /// Create a configuration for production.
    pub fn production() -> Self {
        Self {
            check_interval: Duration::from_secs(DEFAULT_SWEEP_CHECK_INTERVAL_SECS),
            batch_size: DEFAULT_SWEEP_BATCH_SIZE,
            log_escalations: false,
            enabled: true,
        }
    }
}

// ============================================================================
// METRICS
// ============================================================================

/// Counters for escalation sweep activity since startup.
///
/// Shared between the background task and the HTTP surface so manual
/// sweeps and scheduled ones land in the same totals.
#[derive(Debug, Default)]
pub struct EscalationSweepMetrics {
    /// Sweep cycles that ran to completion
    pub cycles: AtomicU64,

    /// Cycles skipped because another sweep held the run slot
    pub skipped_cycles: AtomicU64,

    /// Overdue assignments picked up by completed cycles
    pub processed: AtomicU64,

    /// Assignments moved to a new caseworker
    pub reassigned: AtomicU64,

    /// Assignments flagged for attention
    pub flagged: AtomicU64,

    /// Per-item failures plus failed scans
    pub errors: AtomicU64,
}

impl EscalationSweepMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the outcome of one sweep attempt into the counters.
    pub fn record(&self, result: &CaseflowResult<SweepReport>) {
        match result {
            Ok(report) => {
                self.cycles.fetch_add(1, Ordering::Relaxed);
                self.processed
                    .fetch_add(report.processed as u64, Ordering::Relaxed);
                self.reassigned
                    .fetch_add(report.reassigned as u64, Ordering::Relaxed);
                self.flagged
                    .fetch_add(report.flagged as u64, Ordering::Relaxed);
                self.errors
                    .fetch_add(report.failed as u64, Ordering::Relaxed);
            }
            Err(CaseflowError::Assignment(AssignmentError::SweepInProgress)) => {
                self.skipped_cycles.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.errors.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Get current snapshot of all metrics.
    pub fn snapshot(&self) -> EscalationSweepSnapshot {
        EscalationSweepSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            skipped_cycles: self.skipped_cycles.load(Ordering::Relaxed),
            processed: self.processed.load(Ordering::Relaxed),
            reassigned: self.reassigned.load(Ordering::Relaxed),
            flagged: self.flagged.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of sweep metrics at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct EscalationSweepSnapshot {
    pub cycles: u64,
    pub skipped_cycles: u64,
    pub processed: u64,
    pub reassigned: u64,
    pub flagged: u64,
    pub errors: u64,
}

// ============================================================================
// BACKGROUND TASK
// ============================================================================

/// Run one sweep and record it in `metrics`.
///
/// Used by both the scheduled task and `POST /api/v1/sweeps`.
pub async fn run_sweep_cycle(
    sweeper: &EscalationSweeper,
    config: &EscalationSweepConfig,
    metrics: &EscalationSweepMetrics,
) -> CaseflowResult<SweepReport> {
    let result = sweeper.run_once().await;
    metrics.record(&result);

    match &result {
        Ok(report) if !report.is_empty() && config.log_escalations => {
            tracing::info!(
                processed = report.processed,
                reassigned = report.reassigned,
                flagged = report.flagged,
                failed = report.failed,
                "Escalation sweep cycle completed"
            );
        }
        Ok(_) => {}
        Err(CaseflowError::Assignment(AssignmentError::SweepInProgress)) => {
            tracing::debug!("Escalation sweep already running, skipping cycle");
        }
        Err(e) => {
            tracing::error!(error = %e, "Escalation sweep failed");
        }
    }

    result
}

/// Background task that periodically escalates overdue assignments.
///
/// Runs until the shutdown signal is received.
///
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let metrics = Arc::new(EscalationSweepMetrics::new());
/// tokio::spawn(escalation_sweep_task(sweeper, config, Arc::clone(&metrics), shutdown_rx));
///
/// // On shutdown
/// let _ = shutdown_tx.send(true);
/// ```
pub async fn escalation_sweep_task(
    sweeper: Arc<EscalationSweeper>,
    config: EscalationSweepConfig,
    metrics: Arc<EscalationSweepMetrics>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut sweep_interval = interval(config.check_interval);
    sweep_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tracing::info!(
        check_interval_secs = config.check_interval.as_secs(),
        batch_size = config.batch_size,
        "Escalation sweep task started"
    );

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    tracing::info!("Escalation sweep task shutting down");
                    break;
                }
            }

            _ = sweep_interval.tick() => {
                // Errors are already logged and counted.
                let _ = run_sweep_cycle(&sweeper, &config, &metrics).await;
            }
        }
    }

    let snapshot = metrics.snapshot();
    tracing::info!(
        cycles = snapshot.cycles,
        skipped_cycles = snapshot.skipped_cycles,
        processed = snapshot.processed,
        reassigned = snapshot.reassigned,
        flagged = snapshot.flagged,
        errors = snapshot.errors,
        "Escalation sweep task completed"
    );
}

// ============================================================================
// TESTS
// ============================================================================
