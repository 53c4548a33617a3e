//! OpenAPI Specification for the Caseflow API
//!
//! Generated by utoipa from the route annotations and schema derives.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::jobs::EscalationSweepSnapshot;
use crate::routes::assignment::{HolderActionRequest, ManualReassignRequest};
use crate::routes::health::{ComponentHealth, HealthDetails, HealthResponse, HealthStatus};
use crate::routes::{assignment, caseworker, health, sweep};

use caseflow_assign::{
    AssignClientRequest, AutoAssignRequest, BulkReassignFailure, BulkReassignRequest,
    BulkReassignResult, CancelRequest, CompleteRequest, SweepReport,
};
use caseflow_core::{
    Assignment, AssignmentId, AssignmentStatus, CaseOutcome, CasePriority, CaseworkerId, ClientId,
    HistoryEntry, TenantId,
};

/// OpenAPI document for the Caseflow API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Caseflow API",
        version = "0.4.0",
        description = "Client-to-caseworker assignment with business-hour acceptance deadlines and automatic escalation",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local Development")
    ),
    tags(
        (name = "Assignments", description = "Assignment lifecycle: create, accept, activate, reassign, complete, cancel"),
        (name = "Caseworkers", description = "Per-caseworker assignment listings"),
        (name = "Sweeps", description = "Escalation of assignments past their acceptance deadline"),
        (name = "Health", description = "Liveness and readiness probes"),
    ),
    paths(
        assignment::create_assignment,
        assignment::auto_assign,
        assignment::get_assignment,
        assignment::get_history,
        assignment::accept_assignment,
        assignment::activate_assignment,
        assignment::reassign_assignment,
        assignment::complete_assignment,
        assignment::cancel_assignment,
        assignment::bulk_reassign,
        caseworker::list_assignments,
        sweep::run_sweep,
        sweep::sweep_metrics,
        health::ping,
        health::liveness,
        health::readiness,
    ),
    components(
        schemas(
            ApiError,
            ErrorCode,
            Assignment,
            HistoryEntry,
            AssignmentStatus,
            CaseOutcome,
            CasePriority,
            AssignmentId,
            CaseworkerId,
            ClientId,
            TenantId,
            AssignClientRequest,
            AutoAssignRequest,
            HolderActionRequest,
            ManualReassignRequest,
            CompleteRequest,
            CancelRequest,
            BulkReassignRequest,
            BulkReassignResult,
            BulkReassignFailure,
            SweepReport,
            EscalationSweepSnapshot,
            HealthResponse,
            HealthStatus,
            HealthDetails,
            ComponentHealth,
        )
    )
)]
pub struct ApiDoc;

impl ApiDoc {
    /// Render the OpenAPI document as pretty JSON.
    pub fn to_json() -> Result<String, serde_json::Error> {
        let openapi = Self::openapi();
        serde_json::to_string_pretty(&openapi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "Caseflow API");

        let tags = openapi.tags.as_ref().expect("tags");
        assert_eq!(tags.len(), 4);

        let components = openapi.components.as_ref().expect("components");
        assert!(components.schemas.contains_key("Assignment"));
        assert!(components.schemas.contains_key("ApiError"));
    }

    #[test]
    fn test_openapi_paths_exist() {
        let openapi = ApiDoc::openapi();
        for path in [
            "/api/v1/assignments",
            "/api/v1/assignments/auto",
            "/api/v1/assignments/{id}",
            "/api/v1/assignments/{id}/history",
            "/api/v1/assignments/{id}/accept",
            "/api/v1/assignments/{id}/activate",
            "/api/v1/assignments/{id}/reassign",
            "/api/v1/assignments/{id}/complete",
            "/api/v1/assignments/{id}/cancel",
            "/api/v1/assignments/bulk-reassign",
            "/api/v1/caseworkers/{id}/assignments",
            "/api/v1/sweeps",
            "/api/v1/sweeps/metrics",
            "/health/ready",
        ] {
            assert!(openapi.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_openapi_json_serialization() {
        let json = ApiDoc::to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["info"]["title"], "Caseflow API");
    }
}
