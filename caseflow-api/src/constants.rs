//! Constants for the Caseflow API
//!
//! Default values for the server, CORS and the escalation sweep job.

// ============================================================================
// SERVER
// ============================================================================

/// Default bind host
pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default per-request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// CORS
// ============================================================================

/// Default CORS max age in seconds (24 hours)
pub const DEFAULT_CORS_MAX_AGE_SECS: u64 = 86400;

// ============================================================================
// ESCALATION SWEEP
// ============================================================================

/// Default interval between escalation sweeps (15 minutes)
pub const DEFAULT_SWEEP_CHECK_INTERVAL_SECS: u64 = 900;

/// Default maximum number of overdue assignments handled per sweep
pub const DEFAULT_SWEEP_BATCH_SIZE: usize = caseflow_assign::DEFAULT_SWEEP_BATCH_SIZE;

// ============================================================================
// TESTS
// ============================================================================
