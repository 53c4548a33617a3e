//! Error types for Caseflow operations

use crate::{AssignmentStatus, EntityType};
use thiserror::Error;
use uuid::Uuid;

/// Storage layer errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("Entity not found: {entity_type:?} with id {id}")]
    NotFound { entity_type: EntityType, id: Uuid },

    #[error("Insert failed for {entity_type:?}: {reason}")]
    InsertFailed { entity_type: EntityType, reason: String },

    #[error("Update failed for {entity_type:?} with id {id}: {reason}")]
    UpdateFailed {
        entity_type: EntityType,
        id: Uuid,
        reason: String,
    },

    #[error("Unique constraint {constraint} violated by existing {entity_type:?} {existing_id}")]
    UniqueViolation {
        entity_type: EntityType,
        constraint: String,
        existing_id: Uuid,
    },

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Storage unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Validation errors for requests and referenced entities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("{entity_type:?} {id} is inactive")]
    InactiveEntity { entity_type: EntityType, id: Uuid },

    #[error("{entity_type:?} {id} does not belong to tenant {tenant_id}")]
    TenantMismatch {
        entity_type: EntityType,
        id: Uuid,
        tenant_id: Uuid,
    },

    #[error("Directory entry {id} is not a client")]
    NotAClient { id: Uuid },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Assignment workflow errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("{entity_type:?} {id} not found")]
    NotFound { entity_type: EntityType, id: Uuid },

    #[error("Client {client_id} already has open assignment {existing_assignment_id}")]
    Conflict {
        client_id: Uuid,
        existing_assignment_id: Uuid,
    },

    #[error("Caseworker {caller} is not the current holder of assignment {assignment_id}")]
    Unauthorized { caller: Uuid, assignment_id: Uuid },

    #[error("Cannot {operation} assignment {assignment_id} in status {status}")]
    InvalidStateTransition {
        assignment_id: Uuid,
        status: AssignmentStatus,
        operation: String,
    },

    #[error("No available caseworker in tenant {tenant_id} (case type: {case_type:?})")]
    NoAvailableCaseworker {
        tenant_id: Uuid,
        case_type: Option<String>,
    },

    #[error("Assignment {assignment_id} is no longer held by {expected} (now {actual}, {status})")]
    HolderChanged {
        assignment_id: Uuid,
        expected: Uuid,
        actual: Uuid,
        status: AssignmentStatus,
    },

    #[error("An escalation sweep is already running")]
    SweepInProgress,
}

/// Audit sink delivery errors. Never propagated out of a transition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuditError {
    #[error("Audit delivery failed: {reason}")]
    DeliveryFailed { reason: String },
}

/// Master error type for all Caseflow errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaseflowError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Assignment error: {0}")]
    Assignment(#[from] AssignmentError),
}

impl CaseflowError {
    /// Shorthand for a workflow-level not-found error.
    pub fn not_found(entity_type: EntityType, id: impl Into<Uuid>) -> Self {
        AssignmentError::NotFound {
            entity_type,
            id: id.into(),
        }
        .into()
    }

    /// Shorthand for an invalid state transition.
    pub fn invalid_transition(
        assignment_id: impl Into<Uuid>,
        status: AssignmentStatus,
        operation: &str,
    ) -> Self {
        AssignmentError::InvalidStateTransition {
            assignment_id: assignment_id.into(),
            status,
            operation: operation.to_string(),
        }
        .into()
    }

    /// Whether this error means a referenced entity does not exist, at any layer.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CaseflowError::Assignment(AssignmentError::NotFound { .. })
                | CaseflowError::Storage(StorageError::NotFound { .. })
        )
    }
}

/// Result type alias for Caseflow operations.
pub type CaseflowResult<T> = Result<T, CaseflowError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_not_found() {
        let err = StorageError::NotFound {
            entity_type: EntityType::Assignment,
            id: Uuid::nil(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("Entity not found"));
        assert!(msg.contains("Assignment"));
        assert!(msg.contains("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn test_assignment_error_display_conflict() {
        let client = Uuid::now_v7();
        let existing = Uuid::now_v7();
        let err = AssignmentError::Conflict {
            client_id: client,
            existing_assignment_id: existing,
        };
        let msg = err.to_string();
        assert!(msg.contains(&client.to_string()));
        assert!(msg.contains(&existing.to_string()));
    }

    #[test]
    fn test_invalid_transition_display() {
        let err = CaseflowError::invalid_transition(Uuid::nil(), AssignmentStatus::Completed, "accept");
        let msg = err.to_string();
        assert!(msg.contains("accept"));
        assert!(msg.contains("completed"));
    }

    #[test]
    fn test_validation_error_display_inactive() {
        let err = ValidationError::InactiveEntity {
            entity_type: EntityType::Caseworker,
            id: Uuid::nil(),
        };
        assert!(err.to_string().contains("inactive"));
    }

    #[test]
    fn test_caseflow_error_from_variants() {
        let storage = CaseflowError::from(StorageError::LockPoisoned);
        assert!(matches!(storage, CaseflowError::Storage(_)));

        let validation = CaseflowError::from(ValidationError::RequiredFieldMissing {
            field: "reason".to_string(),
        });
        assert!(matches!(validation, CaseflowError::Validation(_)));

        let config = CaseflowError::from(ConfigError::MissingRequired {
            field: "acceptance_window_hours".to_string(),
        });
        assert!(matches!(config, CaseflowError::Config(_)));

        let assignment = CaseflowError::from(AssignmentError::SweepInProgress);
        assert!(matches!(assignment, CaseflowError::Assignment(_)));
    }

    #[test]
    fn test_is_not_found_covers_both_layers() {
        assert!(CaseflowError::not_found(EntityType::Client, Uuid::nil()).is_not_found());
        assert!(CaseflowError::from(StorageError::NotFound {
            entity_type: EntityType::Caseworker,
            id: Uuid::nil(),
        })
        .is_not_found());
        assert!(!CaseflowError::from(StorageError::LockPoisoned).is_not_found());
    }
}
