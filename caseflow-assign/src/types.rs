//! Request and result types for orchestrator operations.

use caseflow_core::{AssignmentId, CaseOutcome, CasePriority, CaseworkerId, ClientId, TenantId};
use serde::{Deserialize, Serialize};

/// Create an assignment for an explicitly chosen caseworker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AssignClientRequest {
    pub client_id: ClientId,
    pub tenant_id: TenantId,
    pub caseworker_id: CaseworkerId,
    pub assigned_by: CaseworkerId,
    #[serde(default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub priority: Option<CasePriority>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Create an assignment, letting the candidate selector pick the caseworker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AutoAssignRequest {
    pub client_id: ClientId,
    pub tenant_id: TenantId,
    pub assigned_by: CaseworkerId,
    #[serde(default)]
    pub case_type: Option<String>,
    #[serde(default)]
    pub priority: Option<CasePriority>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl AutoAssignRequest {
    pub fn with_caseworker(self, caseworker_id: CaseworkerId) -> AssignClientRequest {
        AssignClientRequest {
            client_id: self.client_id,
            tenant_id: self.tenant_id,
            caseworker_id,
            assigned_by: self.assigned_by,
            case_type: self.case_type,
            priority: self.priority,
            notes: self.notes,
        }
    }
}

/// Move an assignment to a new holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReassignRequest {
    pub new_caseworker_id: CaseworkerId,
    pub reassigned_by: CaseworkerId,
    pub reason: String,
    /// Set by the escalation sweeper; administrators leave it false.
    #[serde(default)]
    pub is_auto_reassignment: bool,
    /// Only reassign while this caseworker still holds the assignment open.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_holder: Option<CaseworkerId>,
}

impl ReassignRequest {
    /// An administrator-initiated reassignment.
    pub fn manual(new_caseworker_id: CaseworkerId, reassigned_by: CaseworkerId, reason: &str) -> Self {
        Self {
            new_caseworker_id,
            reassigned_by,
            reason: reason.to_string(),
            is_auto_reassignment: false,
            expected_holder: None,
        }
    }

    pub fn with_expected_holder(mut self, holder: CaseworkerId) -> Self {
        self.expected_holder = Some(holder);
        self
    }
}

/// Close an assignment with a final case status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CompleteRequest {
    pub final_status: CaseOutcome,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Administratively cancel an open assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CancelRequest {
    pub cancelled_by: CaseworkerId,
    pub reason: String,
}

/// Move every open assignment from one caseworker to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BulkReassignRequest {
    pub old_caseworker_id: CaseworkerId,
    pub new_caseworker_id: CaseworkerId,
    pub reassigned_by: CaseworkerId,
    pub reason: String,
}

/// One item of a bulk reassignment that did not go through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BulkReassignFailure {
    pub assignment_id: AssignmentId,
    pub error: String,
}

/// Outcome of a bulk reassignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BulkReassignResult {
    pub reassigned_count: usize,
    pub failed_count: usize,
    pub failures: Vec<BulkReassignFailure>,
}

/// Why escalation flagged an assignment instead of reassigning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum FlagReason {
    /// The automatic reassignment budget is spent; status moved to reassigned.
    AttemptsExhausted,
    /// No other caseworker could take it; status left pending.
    NoCandidate,
    /// The client record is gone or no longer a client of the tenant;
    /// status moved to reassigned.
    ClientUnavailable,
}

/// Result of escalating a single overdue assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EscalationOutcome {
    Reassigned {
        from: CaseworkerId,
        to: CaseworkerId,
    },
    Flagged {
        reason: FlagReason,
    },
    /// No longer pending or no longer overdue once the lock was held.
    Skipped,
}

/// Tally of one escalation sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SweepReport {
    /// Overdue assignments found by the scan.
    pub processed: usize,
    pub reassigned: usize,
    pub flagged: usize,
    pub skipped: usize,
    /// Items whose escalation returned an error.
    pub failed: usize,
}

impl SweepReport {
    pub fn record(&mut self, outcome: &EscalationOutcome) {
        match outcome {
            EscalationOutcome::Reassigned { .. } => self.reassigned += 1,
            EscalationOutcome::Flagged { .. } => self.flagged += 1,
            EscalationOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.processed == 0
    }
}
