//! Caseflow Assign - Assignment Workflow Engine
//!
//! Owns every transition of a client-to-caseworker assignment: creation,
//! acceptance, reassignment, completion, cancellation and the deadline
//! escalation sweep. Storage is reached only through the traits in
//! `caseflow-storage`, so the engine runs the same over any backend.

pub mod audit;
pub mod locks;
pub mod orchestrator;
pub mod selector;
pub mod sweeper;
pub mod types;

pub use audit::TracingAuditSink;
pub use locks::{AssignmentLocks, KeyedLocks};
pub use orchestrator::{AssignmentOrchestrator, DEFAULT_AUDIT_TIMEOUT};
pub use selector::{pick_least_loaded, CandidateSelector, LeastLoadedSelector};
pub use sweeper::{EscalationSweeper, DEFAULT_SWEEP_BATCH_SIZE};
pub use types::*;
