//! Configuration types

use crate::*;
use serde::{Deserialize, Serialize};

/// Default cap on automatic reassignments before an assignment is flagged.
pub const DEFAULT_MAX_AUTO_REASSIGNMENT_ATTEMPTS: u32 = 3;

/// Reason recorded on history entries created by escalation.
pub const DEFAULT_ESCALATION_REASON: &str = "deadline exceeded";

/// Assignment workflow configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(default)]
pub struct AssignmentConfig {
    /// Business hours a caseworker has to accept a new assignment.
    pub acceptance_window_hours: u32,
    /// Cap copied onto each new assignment.
    pub max_auto_reassignment_attempts: u32,
    /// Whether new assignments take part in escalation sweeps.
    pub auto_reassignment_enabled_default: bool,
    /// Recorded as `assigned_by` on history entries written by the sweeper.
    pub system_actor_id: CaseworkerId,
    /// Reason recorded on escalation reassignments.
    pub escalation_reason: String,
}

impl Default for AssignmentConfig {
    fn default() -> Self {
        Self {
            acceptance_window_hours: DEFAULT_ACCEPTANCE_WINDOW_HOURS,
            max_auto_reassignment_attempts: DEFAULT_MAX_AUTO_REASSIGNMENT_ATTEMPTS,
            auto_reassignment_enabled_default: true,
            system_actor_id: CaseworkerId::nil(),
            escalation_reason: DEFAULT_ESCALATION_REASON.to_string(),
        }
    }
}

impl AssignmentConfig {
    /// Validate the configuration.
    ///
    /// Validates:
    /// - acceptance_window_hours > 0
    /// - escalation_reason is not blank
    pub fn validate(&self) -> CaseflowResult<()> {
        if self.acceptance_window_hours == 0 {
            return Err(CaseflowError::Config(ConfigError::InvalidValue {
                field: "acceptance_window_hours".to_string(),
                value: self.acceptance_window_hours.to_string(),
                reason: "acceptance_window_hours must be greater than 0".to_string(),
            }));
        }

        if self.escalation_reason.trim().is_empty() {
            return Err(CaseflowError::Config(ConfigError::MissingRequired {
                field: "escalation_reason".to_string(),
            }));
        }

        Ok(())
    }

    /// Deadline for an assignment (re)assigned at `assigned_date`.
    pub fn deadline_for(&self, assigned_date: Timestamp) -> Timestamp {
        add_business_hours(assigned_date, self.acceptance_window_hours)
    }
}
