//! Background Jobs for the Caseflow API
//!
//! - `escalation_sweep`: Reassigns or flags pending assignments past their
//!   acceptance deadline
//!
//! # Usage
//!
//! ```ignore
//! use caseflow_api::jobs::{escalation_sweep_task, EscalationSweepConfig, EscalationSweepMetrics};
//! use tokio::sync::watch;
//!
//! let (shutdown_tx, shutdown_rx) = watch::channel(false);
//! let metrics = Arc::new(EscalationSweepMetrics::new());
//! tokio::spawn(escalation_sweep_task(sweeper, EscalationSweepConfig::from_env(), metrics, shutdown_rx));
//!
//! // On shutdown
//! let _ = shutdown_tx.send(true);
//! ```

pub mod escalation_sweep;

pub use escalation_sweep::{
    escalation_sweep_task, run_sweep_cycle, EscalationSweepConfig, EscalationSweepMetrics,
    EscalationSweepSnapshot,
};
