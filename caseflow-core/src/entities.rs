//! Core entity structures
//!
//! Entities refer to each other only by identifier. Joins happen through the
//! store and registry lookups.

use crate::{
    AssignmentConfig, AssignmentId, AssignmentStatus, CaseOutcome, CasePriority, CaseworkerId,
    ClientId, DirectoryRole, EntityIdType, TenantId, Timestamp,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// ASSIGNMENT
// ============================================================================

/// One holder's tenure on an assignment.
///
/// Entries are append-only. Only `accepted_date` and the reassignment fields
/// of the last entry are filled in after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HistoryEntry {
    pub caseworker_id: CaseworkerId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub assigned_date: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub accepted_date: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub reassigned_date: Option<Timestamp>,
    pub reassign_reason: Option<String>,
    pub assigned_by: CaseworkerId,
}

impl HistoryEntry {
    pub fn new(caseworker_id: CaseworkerId, assigned_date: Timestamp, assigned_by: CaseworkerId) -> Self {
        Self {
            caseworker_id,
            assigned_date,
            accepted_date: None,
            reassigned_date: None,
            reassign_reason: None,
            assigned_by,
        }
    }

    pub fn with_reason(mut self, reason: &str) -> Self {
        self.reassign_reason = Some(reason.to_string());
        self
    }
}

/// Binding of one client to the caseworker currently responsible for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Assignment {
    pub assignment_id: AssignmentId,
    pub tenant_id: TenantId,
    pub client_id: ClientId,
    pub current_caseworker_id: CaseworkerId,
    pub status: AssignmentStatus,

    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub assigned_date: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub accepted_date: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub acceptance_deadline: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub completed_date: Option<Timestamp>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub cancelled_date: Option<Timestamp>,
    pub cancellation_reason: Option<String>,

    /// Caseworker who first brought the client in.
    pub onboarded_by: CaseworkerId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub onboarding_date: Timestamp,

    pub case_type: Option<String>,
    pub case_status: Option<String>,
    pub priority: CasePriority,

    pub history: Vec<HistoryEntry>,

    pub auto_reassignment_enabled: bool,
    pub auto_reassignment_attempts: u32,
    pub max_auto_reassignment_attempts: u32,
    /// True when the current holder was put there by the escalation sweeper.
    pub is_auto_reassigned: bool,
    pub requires_attention: bool,

    pub notes: Option<String>,

    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub created_at: Timestamp,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub updated_at: Timestamp,
}

impl Assignment {
    /// Create a pending assignment with its first history entry.
    pub fn new(
        tenant_id: TenantId,
        client_id: ClientId,
        caseworker_id: CaseworkerId,
        assigned_by: CaseworkerId,
        now: Timestamp,
        config: &AssignmentConfig,
    ) -> Self {
        Self {
            assignment_id: AssignmentId::now_v7(),
            tenant_id,
            client_id,
            current_caseworker_id: caseworker_id,
            status: AssignmentStatus::Pending,
            assigned_date: now,
            accepted_date: None,
            acceptance_deadline: config.deadline_for(now),
            completed_date: None,
            cancelled_date: None,
            cancellation_reason: None,
            onboarded_by: caseworker_id,
            onboarding_date: now,
            case_type: None,
            case_status: None,
            priority: CasePriority::default(),
            history: vec![HistoryEntry::new(caseworker_id, now, assigned_by)],
            auto_reassignment_enabled: config.auto_reassignment_enabled_default,
            auto_reassignment_attempts: 0,
            max_auto_reassignment_attempts: config.max_auto_reassignment_attempts,
            is_auto_reassigned: false,
            requires_attention: false,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_case_type(mut self, case_type: Option<String>) -> Self {
        self.case_type = case_type;
        self
    }

    pub fn with_priority(mut self, priority: CasePriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Entry of the current holder.
    pub fn current_entry(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    pub fn current_entry_mut(&mut self) -> Option<&mut HistoryEntry> {
        self.history.last_mut()
    }

    pub fn is_held_by(&self, caseworker_id: CaseworkerId) -> bool {
        self.current_caseworker_id == caseworker_id
    }

    /// Pending past its acceptance deadline.
    pub fn is_overdue(&self, now: Timestamp) -> bool {
        self.status == AssignmentStatus::Pending && self.acceptance_deadline < now
    }

    /// Overdue and eligible for escalation.
    pub fn is_escalation_candidate(&self, now: Timestamp) -> bool {
        self.auto_reassignment_enabled && self.is_overdue(now)
    }

    pub fn attempts_exhausted(&self) -> bool {
        self.auto_reassignment_attempts >= self.max_auto_reassignment_attempts
    }

    /// Append to the free-text notes, one paragraph per call.
    pub fn append_notes(&mut self, notes: &str) {
        let notes = notes.trim();
        if notes.is_empty() {
            return;
        }
        self.notes = Some(match self.notes.take() {
            Some(existing) if !existing.is_empty() => format!("{}\n{}", existing, notes),
            _ => notes.to_string(),
        });
    }
}

// ============================================================================
// CASEWORKER
// ============================================================================

/// Round `successful / completed` to a whole percentage. Zero when nothing
/// has been completed.
pub fn success_rate(successful: u32, completed: u32) -> u32 {
    if completed == 0 {
        return 0;
    }
    (f64::from(successful) / f64::from(completed) * 100.0).round() as u32
}

/// Tenant staff member who can hold assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Caseworker {
    pub caseworker_id: CaseworkerId,
    pub tenant_id: TenantId,
    pub name: String,
    pub is_active: bool,
    pub is_available_for_new_clients: bool,
    pub max_client_capacity: Option<u32>,
    /// Open (pending, accepted or active) assignments currently held.
    pub current_workload: u32,
    /// Case-type tags this caseworker specializes in.
    pub specialization: Vec<String>,
    pub completed_cases: u32,
    pub successful_cases: u32,
    pub rejected_cases: u32,
    /// Percentage in 0..=100.
    pub case_success_rate: u32,
}

impl Caseworker {
    pub fn new(tenant_id: TenantId, name: &str) -> Self {
        Self {
            caseworker_id: CaseworkerId::now_v7(),
            tenant_id,
            name: name.to_string(),
            is_active: true,
            is_available_for_new_clients: true,
            max_client_capacity: None,
            current_workload: 0,
            specialization: Vec::new(),
            completed_cases: 0,
            successful_cases: 0,
            rejected_cases: 0,
            case_success_rate: 0,
        }
    }

    pub fn with_specialization(mut self, tags: &[&str]) -> Self {
        self.specialization = tags.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_workload(mut self, workload: u32) -> Self {
        self.current_workload = workload;
        self
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.max_client_capacity = Some(capacity);
        self
    }

    pub fn with_availability(mut self, available: bool) -> Self {
        self.is_available_for_new_clients = available;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
        self
    }

    /// Eligible for selection: active and taking new clients.
    pub fn is_selectable(&self) -> bool {
        self.is_active && self.is_available_for_new_clients
    }

    pub fn has_specialization(&self, case_type: &str) -> bool {
        self.specialization.iter().any(|s| s == case_type)
    }

    pub fn is_at_capacity(&self) -> bool {
        self.max_client_capacity
            .is_some_and(|cap| self.current_workload >= cap)
    }

    /// Apply a workload delta, floored at zero.
    pub fn adjust_workload(&mut self, delta: i32) {
        self.current_workload = if delta.is_negative() {
            self.current_workload.saturating_sub(delta.unsigned_abs())
        } else {
            self.current_workload.saturating_add(delta as u32)
        };
    }

    /// Record a finished case and refresh the success rate.
    pub fn record_completion(&mut self, outcome: CaseOutcome) {
        self.completed_cases += 1;
        match outcome {
            CaseOutcome::Approved => self.successful_cases += 1,
            CaseOutcome::Rejected => self.rejected_cases += 1,
            CaseOutcome::CaseClosed => {}
        }
        self.case_success_rate = success_rate(self.successful_cases, self.completed_cases);
    }
}

// ============================================================================
// CLIENT
// ============================================================================

/// Entry in the client directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Client {
    pub client_id: ClientId,
    pub tenant_id: TenantId,
    pub name: String,
    pub role: DirectoryRole,
    pub assigned_to: Option<CaseworkerId>,
    pub onboarded_by: Option<CaseworkerId>,
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date-time"))]
    pub onboarding_date: Option<Timestamp>,
    pub case_type: Option<String>,
    pub case_status: Option<String>,
}

impl Client {
    pub fn new(tenant_id: TenantId, name: &str) -> Self {
        Self {
            client_id: ClientId::now_v7(),
            tenant_id,
            name: name.to_string(),
            role: DirectoryRole::Client,
            assigned_to: None,
            onboarded_by: None,
            onboarding_date: None,
            case_type: None,
            case_status: None,
        }
    }

    pub fn with_role(mut self, role: DirectoryRole) -> Self {
        self.role = role;
        self
    }

    pub fn is_client(&self) -> bool {
        self.role == DirectoryRole::Client
    }
}
