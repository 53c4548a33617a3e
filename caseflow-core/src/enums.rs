//! Enum types for assignments, cases and directory entries

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity type discriminator used in errors and audit records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EntityType {
    Assignment,
    Client,
    Caseworker,
    Tenant,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// ASSIGNMENT STATUS
// ============================================================================

/// Lifecycle status of an assignment.
///
/// ```text
/// Pending ──accept──→ Accepted ──activate──→ Active ──complete──→ Completed
///    │                    │                     │
///    ├──escalation exhausted──→ Reassigned       │
///    └────────────── cancel (from any open) ─────┴──→ Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Waiting for the holder to accept before the acceptance deadline
    Pending,
    /// Holder accepted the client
    Accepted,
    /// Holder is actively working the case
    Active,
    /// Case finished (terminal)
    Completed,
    /// Escalation gave up on this assignment (terminal unless rescued manually)
    Reassigned,
    /// Administratively cancelled (terminal)
    Cancelled,
}

impl AssignmentStatus {
    /// Convert to database string representation.
    pub fn as_db_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Accepted => "accepted",
            AssignmentStatus::Active => "active",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Reassigned => "reassigned",
            AssignmentStatus::Cancelled => "cancelled",
        }
    }

    /// Parse from database string representation.
    pub fn from_db_str(s: &str) -> Result<Self, AssignmentStatusParseError> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(AssignmentStatus::Pending),
            "accepted" => Ok(AssignmentStatus::Accepted),
            "active" => Ok(AssignmentStatus::Active),
            "completed" | "complete" => Ok(AssignmentStatus::Completed),
            "reassigned" => Ok(AssignmentStatus::Reassigned),
            "cancelled" | "canceled" => Ok(AssignmentStatus::Cancelled),
            _ => Err(AssignmentStatusParseError(s.to_string())),
        }
    }

    /// Open statuses hold a slot in the caseworker's workload and take part in
    /// the one-open-assignment-per-client rule.
    pub fn is_open(&self) -> bool {
        matches!(
            self,
            AssignmentStatus::Pending | AssignmentStatus::Accepted | AssignmentStatus::Active
        )
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }

    /// All statuses, in lifecycle order.
    pub const ALL: [AssignmentStatus; 6] = [
        AssignmentStatus::Pending,
        AssignmentStatus::Accepted,
        AssignmentStatus::Active,
        AssignmentStatus::Completed,
        AssignmentStatus::Reassigned,
        AssignmentStatus::Cancelled,
    ];
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = AssignmentStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_db_str(s)
    }
}

/// Error when parsing an invalid assignment status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentStatusParseError(pub String);

impl fmt::Display for AssignmentStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid assignment status: {}", self.0)
    }
}

impl std::error::Error for AssignmentStatusParseError {}

// ============================================================================
// CASE PRIORITY
// ============================================================================

/// Priority of the case attached to an assignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum CasePriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl CasePriority {
    pub fn as_db_str(&self) -> &'static str {
        match self {
            CasePriority::Low => "low",
            CasePriority::Medium => "medium",
            CasePriority::High => "high",
            CasePriority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for CasePriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

// ============================================================================
// CASE OUTCOME
// ============================================================================

/// Final status recorded when an assignment is completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum CaseOutcome {
    Approved,
    Rejected,
    #[serde(rename = "Case Closed")]
    CaseClosed,
}

impl CaseOutcome {
    /// Case status label mirrored onto the assignment and the client record.
    pub fn as_case_status(&self) -> &'static str {
        match self {
            CaseOutcome::Approved => "Approved",
            CaseOutcome::Rejected => "Rejected",
            CaseOutcome::CaseClosed => "Case Closed",
        }
    }

    /// Parse a case status label.
    pub fn from_case_status(s: &str) -> Result<Self, CaseOutcomeParseError> {
        match s.trim().to_lowercase().as_str() {
            "approved" => Ok(CaseOutcome::Approved),
            "rejected" => Ok(CaseOutcome::Rejected),
            "case closed" | "case_closed" | "closed" => Ok(CaseOutcome::CaseClosed),
            _ => Err(CaseOutcomeParseError(s.to_string())),
        }
    }
}

impl fmt::Display for CaseOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_case_status())
    }
}

impl FromStr for CaseOutcome {
    type Err = CaseOutcomeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_case_status(s)
    }
}

/// Error when parsing an invalid case outcome string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcomeParseError(pub String);

impl fmt::Display for CaseOutcomeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid case outcome: {}", self.0)
    }
}

impl std::error::Error for CaseOutcomeParseError {}

// ============================================================================
// DIRECTORY ROLE
// ============================================================================

/// Role of an entry in the client directory. Only `Client` entries can be
/// assigned to a caseworker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DirectoryRole {
    Client,
    Staff,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_status_roundtrip() {
        for status in AssignmentStatus::ALL {
            let parsed = AssignmentStatus::from_db_str(status.as_db_str()).unwrap();
            assert_eq!(status, parsed);
        }
    }

    #[test]
    fn test_assignment_status_open_set() {
        assert!(AssignmentStatus::Pending.is_open());
        assert!(AssignmentStatus::Accepted.is_open());
        assert!(AssignmentStatus::Active.is_open());
        assert!(AssignmentStatus::Completed.is_terminal());
        assert!(AssignmentStatus::Reassigned.is_terminal());
        assert!(AssignmentStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_assignment_status_parse_error() {
        let err = AssignmentStatus::from_db_str("lost").unwrap_err();
        assert!(err.to_string().contains("lost"));
    }

    #[test]
    fn test_case_outcome_labels() {
        assert_eq!(CaseOutcome::CaseClosed.as_case_status(), "Case Closed");
        assert_eq!("Case Closed".parse::<CaseOutcome>(), Ok(CaseOutcome::CaseClosed));
        assert_eq!("approved".parse::<CaseOutcome>(), Ok(CaseOutcome::Approved));
        assert!("Pending".parse::<CaseOutcome>().is_err());
    }

    #[test]
    fn test_case_outcome_serde_uses_labels() {
        let json = serde_json::to_string(&CaseOutcome::CaseClosed).unwrap();
        assert_eq!(json, "\"Case Closed\"");
    }

    #[test]
    fn test_priority_default_and_order() {
        assert_eq!(CasePriority::default(), CasePriority::Medium);
        assert!(CasePriority::Urgent > CasePriority::Low);
    }
}
