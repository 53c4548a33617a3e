//! HTTP error surface
//!
//! Every failure leaves the API as an [`ApiError`] JSON body whose
//! [`ErrorCode`] fixes the status: not-found is 404, a caller who does not
//! hold the assignment is 403, conflicts and illegal transitions are 409,
//! malformed input is 400, and storage trouble is 500/503.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use caseflow_core::{AssignmentError, CaseflowError, ConfigError, StorageError, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Machine-readable error category, serialized in SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authorization Errors (403)
    // ========================================================================
    /// Caller is not the current holder of the assignment
    NotAssignmentHolder,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request validation failed
    ValidationFailed,

    /// Input is well formed but not acceptable (bad status filter, bind address)
    InvalidInput,

    /// A required field is absent or blank
    MissingField,

    /// Field format is incorrect
    InvalidFormat,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Assignment, caseworker or client does not exist
    EntityNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// Client already has an open assignment
    ActiveAssignmentExists,

    /// Operation conflicts with the assignment's current status
    StateConflict,

    /// No caseworker can take the assignment
    NoAvailableCaseworker,

    /// Another escalation sweep is running
    SweepInProgress,

    // ========================================================================
    // Server Errors (500, 503) and request timeout (408)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Storage operation failed
    StorageError,

    /// Service is temporarily unavailable
    ServiceUnavailable,

    /// Request ran past the configured request timeout
    Timeout,
}

impl ErrorCode {
    /// HTTP status for this code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::NotAssignmentHolder => StatusCode::FORBIDDEN,

            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,

            ErrorCode::EntityNotFound => StatusCode::NOT_FOUND,

            ErrorCode::ActiveAssignmentExists
            | ErrorCode::StateConflict
            | ErrorCode::NoAvailableCaseworker
            | ErrorCode::SweepInProgress => StatusCode::CONFLICT,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::Timeout => StatusCode::REQUEST_TIMEOUT,

            ErrorCode::InternalError | ErrorCode::StorageError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message used when the caller supplies none.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::NotAssignmentHolder => "Caller does not hold this assignment",
            ErrorCode::ValidationFailed => "Assignment request failed validation",
            ErrorCode::InvalidInput => "Input is not acceptable",
            ErrorCode::MissingField => "A required field is missing",
            ErrorCode::InvalidFormat => "Value is not in the expected format",
            ErrorCode::EntityNotFound => "No such record",
            ErrorCode::ActiveAssignmentExists => "Client already has an open assignment",
            ErrorCode::StateConflict => "Assignment status does not allow this operation",
            ErrorCode::NoAvailableCaseworker => "No caseworker is available",
            ErrorCode::SweepInProgress => "An escalation sweep is already running",
            ErrorCode::InternalError => "Unexpected server failure",
            ErrorCode::StorageError => "Storage operation failed",
            ErrorCode::ServiceUnavailable => "Assignment store is unavailable",
            ErrorCode::Timeout => "Request exceeded its time limit",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// JSON error body returned by every failing handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Category; decides the HTTP status
    pub code: ErrorCode,

    /// Human-readable explanation
    pub message: String,

    /// Optional additional details (conflicting ids, offending field, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Error with an explicit message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Error carrying the code's stock message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    /// Add additional details to the error.
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    pub fn entity_not_found(entity_type: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::EntityNotFound,
            format!("{} with id {} not found", entity_type, id),
        )
    }

    pub fn state_conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::StateConflict, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM ENGINE ERRORS
// ============================================================================

impl From<CaseflowError> for ApiError {
    fn from(err: CaseflowError) -> Self {
        match err {
            CaseflowError::Assignment(e) => e.into(),
            CaseflowError::Validation(e) => e.into(),
            CaseflowError::Storage(e) => e.into(),
            CaseflowError::Config(e) => e.into(),
        }
    }
}

impl From<AssignmentError> for ApiError {
    fn from(err: AssignmentError) -> Self {
        let message = err.to_string();
        match err {
            AssignmentError::NotFound { entity_type, id } => {
                ApiError::entity_not_found(entity_type, id)
            }
            AssignmentError::Conflict {
                client_id,
                existing_assignment_id,
            } => ApiError::new(ErrorCode::ActiveAssignmentExists, message).with_details(
                serde_json::json!({
                    "client_id": client_id,
                    "existing_assignment_id": existing_assignment_id,
                }),
            ),
            AssignmentError::Unauthorized { .. } => {
                ApiError::new(ErrorCode::NotAssignmentHolder, message)
            }
            AssignmentError::InvalidStateTransition { status, .. } => {
                ApiError::state_conflict(message)
                    .with_details(serde_json::json!({ "status": status.as_db_str() }))
            }
            AssignmentError::NoAvailableCaseworker { .. } => {
                ApiError::new(ErrorCode::NoAvailableCaseworker, message)
            }
            AssignmentError::HolderChanged { actual, status, .. } => ApiError::state_conflict(message)
                .with_details(serde_json::json!({
                    "current_caseworker_id": actual,
                    "status": status.as_db_str(),
                })),
            AssignmentError::SweepInProgress => ApiError::from_code(ErrorCode::SweepInProgress),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        match &err {
            ValidationError::RequiredFieldMissing { field } => ApiError::missing_field(field),
            _ => ApiError::validation_failed(err.to_string()),
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { entity_type, id } => {
                ApiError::entity_not_found(entity_type, id)
            }
            StorageError::UniqueViolation { existing_id, .. } => {
                ApiError::new(ErrorCode::ActiveAssignmentExists, err.to_string())
                    .with_details(serde_json::json!({ "existing_assignment_id": existing_id }))
            }
            StorageError::Unavailable { .. } => {
                tracing::error!(error = %err, "Storage unavailable");
                ApiError::service_unavailable("Storage temporarily unavailable")
            }
            other => {
                // Keep storage internals out of the response body.
                tracing::error!(error = %other, "Storage error");
                ApiError::from_code(ErrorCode::StorageError)
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!(error = %err, "Configuration error");
        ApiError::internal_error(err.to_string())
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
