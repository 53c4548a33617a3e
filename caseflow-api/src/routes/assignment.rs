//! Assignment REST API Routes
//!
//! Create, transition and inspect client-to-caseworker assignments. Every
//! handler delegates to the [`AssignmentOrchestrator`]; this layer only
//! validates request shape and maps errors to HTTP.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use caseflow_assign::{
    AssignClientRequest, AssignmentOrchestrator, AutoAssignRequest, BulkReassignRequest,
    BulkReassignResult, CancelRequest, CompleteRequest, ReassignRequest,
};
use caseflow_core::{Assignment, AssignmentId, CaseworkerId, HistoryEntry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    extractors::PathId,
    state::AppState,
};

// ============================================================================
// REQUEST TYPES
// ============================================================================

/// Body for holder-only transitions (accept, activate).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HolderActionRequest {
    /// The caseworker performing the action; must be the current holder.
    pub caseworker_id: CaseworkerId,
}

/// Body for an administrator reassignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ManualReassignRequest {
    pub new_caseworker_id: CaseworkerId,
    pub reassigned_by: CaseworkerId,
    pub reason: String,
}

fn require_text(value: &str, field: &str) -> ApiResult<()> {
    if value.trim().is_empty() {
        return Err(ApiError::missing_field(field));
    }
    Ok(())
}

// ============================================================================
// ROUTE HANDLERS
// ============================================================================

/// POST /api/v1/assignments - Assign a client to a chosen caseworker
#[utoipa::path(
    post,
    path = "/api/v1/assignments",
    tag = "Assignments",
    request_body = AssignClientRequest,
    responses(
        (status = 201, description = "Assignment created", body = Assignment),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Client or caseworker not found", body = ApiError),
        (status = 409, description = "Client already has an open assignment", body = ApiError),
    ),
)]
pub async fn create_assignment(
    State(orchestrator): State<Arc<AssignmentOrchestrator>>,
    Json(req): Json<AssignClientRequest>,
) -> ApiResult<impl IntoResponse> {
    let assignment = orchestrator.assign_client(req).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// POST /api/v1/assignments/auto - Assign a client to the least-loaded eligible caseworker
#[utoipa::path(
    post,
    path = "/api/v1/assignments/auto",
    tag = "Assignments",
    request_body = AutoAssignRequest,
    responses(
        (status = 201, description = "Assignment created", body = Assignment),
        (status = 404, description = "Client not found", body = ApiError),
        (status = 409, description = "Open assignment exists or no caseworker available", body = ApiError),
    ),
)]
pub async fn auto_assign(
    State(orchestrator): State<Arc<AssignmentOrchestrator>>,
    Json(req): Json<AutoAssignRequest>,
) -> ApiResult<impl IntoResponse> {
    let assignment = orchestrator.auto_assign_client(req).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// GET /api/v1/assignments/{id} - Fetch an assignment
#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}",
    tag = "Assignments",
    params(
        ("id" = Uuid, Path, description = "Assignment ID")
    ),
    responses(
        (status = 200, description = "Assignment details", body = Assignment),
        (status = 404, description = "Assignment not found", body = ApiError),
    ),
)]
pub async fn get_assignment(
    State(orchestrator): State<Arc<AssignmentOrchestrator>>,
    PathId(id): PathId<AssignmentId>,
) -> ApiResult<Json<Assignment>> {
    Ok(Json(orchestrator.get_assignment(id).await?))
}

/// GET /api/v1/assignments/{id}/history - Holder history, oldest first
#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}/history",
    tag = "Assignments",
    params(
        ("id" = Uuid, Path, description = "Assignment ID")
    ),
    responses(
        (status = 200, description = "History entries", body = Vec<HistoryEntry>),
        (status = 404, description = "Assignment not found", body = ApiError),
    ),
)]
pub async fn get_history(
    State(orchestrator): State<Arc<AssignmentOrchestrator>>,
    PathId(id): PathId<AssignmentId>,
) -> ApiResult<Json<Vec<HistoryEntry>>> {
    Ok(Json(orchestrator.history(id).await?))
}

/// POST /api/v1/assignments/{id}/accept - Holder accepts a pending assignment
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/accept",
    tag = "Assignments",
    params(
        ("id" = Uuid, Path, description = "Assignment ID")
    ),
    request_body = HolderActionRequest,
    responses(
        (status = 200, description = "Assignment accepted", body = Assignment),
        (status = 403, description = "Caller is not the holder", body = ApiError),
        (status = 404, description = "Assignment not found", body = ApiError),
        (status = 409, description = "Assignment is not pending", body = ApiError),
    ),
)]
pub async fn accept_assignment(
    State(orchestrator): State<Arc<AssignmentOrchestrator>>,
    PathId(id): PathId<AssignmentId>,
    Json(req): Json<HolderActionRequest>,
) -> ApiResult<Json<Assignment>> {
    Ok(Json(
        orchestrator.accept_assignment(id, req.caseworker_id).await?,
    ))
}

/// POST /api/v1/assignments/{id}/activate - Holder starts work on an accepted assignment
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/activate",
    tag = "Assignments",
    params(
        ("id" = Uuid, Path, description = "Assignment ID")
    ),
    request_body = HolderActionRequest,
    responses(
        (status = 200, description = "Assignment activated", body = Assignment),
        (status = 403, description = "Caller is not the holder", body = ApiError),
        (status = 404, description = "Assignment not found", body = ApiError),
        (status = 409, description = "Assignment is not accepted", body = ApiError),
    ),
)]
pub async fn activate_assignment(
    State(orchestrator): State<Arc<AssignmentOrchestrator>>,
    PathId(id): PathId<AssignmentId>,
    Json(req): Json<HolderActionRequest>,
) -> ApiResult<Json<Assignment>> {
    Ok(Json(
        orchestrator.activate_assignment(id, req.caseworker_id).await?,
    ))
}

/// POST /api/v1/assignments/{id}/reassign - Move an assignment to another caseworker
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/reassign",
    tag = "Assignments",
    params(
        ("id" = Uuid, Path, description = "Assignment ID")
    ),
    request_body = ManualReassignRequest,
    responses(
        (status = 200, description = "Assignment reassigned", body = Assignment),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Assignment or caseworker not found", body = ApiError),
        (status = 409, description = "Assignment is closed", body = ApiError),
    ),
)]
pub async fn reassign_assignment(
    State(orchestrator): State<Arc<AssignmentOrchestrator>>,
    PathId(id): PathId<AssignmentId>,
    Json(req): Json<ManualReassignRequest>,
) -> ApiResult<Json<Assignment>> {
    require_text(&req.reason, "reason")?;
    let assignment = orchestrator
        .reassign_client(
            id,
            ReassignRequest::manual(req.new_caseworker_id, req.reassigned_by, &req.reason),
        )
        .await?;
    Ok(Json(assignment))
}

/// POST /api/v1/assignments/{id}/complete - Close an assignment with a case outcome
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/complete",
    tag = "Assignments",
    params(
        ("id" = Uuid, Path, description = "Assignment ID")
    ),
    request_body = CompleteRequest,
    responses(
        (status = 200, description = "Assignment completed", body = Assignment),
        (status = 404, description = "Assignment not found", body = ApiError),
        (status = 409, description = "Assignment is not open", body = ApiError),
    ),
)]
pub async fn complete_assignment(
    State(orchestrator): State<Arc<AssignmentOrchestrator>>,
    PathId(id): PathId<AssignmentId>,
    Json(req): Json<CompleteRequest>,
) -> ApiResult<Json<Assignment>> {
    Ok(Json(orchestrator.complete_assignment(id, req).await?))
}

/// POST /api/v1/assignments/{id}/cancel - Administratively cancel an open assignment
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/cancel",
    tag = "Assignments",
    params(
        ("id" = Uuid, Path, description = "Assignment ID")
    ),
    request_body = CancelRequest,
    responses(
        (status = 200, description = "Assignment cancelled", body = Assignment),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Assignment not found", body = ApiError),
        (status = 409, description = "Assignment is not open", body = ApiError),
    ),
)]
pub async fn cancel_assignment(
    State(orchestrator): State<Arc<AssignmentOrchestrator>>,
    PathId(id): PathId<AssignmentId>,
    Json(req): Json<CancelRequest>,
) -> ApiResult<Json<Assignment>> {
    require_text(&req.reason, "reason")?;
    Ok(Json(orchestrator.cancel_assignment(id, req).await?))
}

/// POST /api/v1/assignments/bulk-reassign - Move all open work between caseworkers
#[utoipa::path(
    post,
    path = "/api/v1/assignments/bulk-reassign",
    tag = "Assignments",
    request_body = BulkReassignRequest,
    responses(
        (status = 200, description = "Per-item results", body = BulkReassignResult),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 404, description = "Caseworker not found", body = ApiError),
    ),
)]
pub async fn bulk_reassign(
    State(orchestrator): State<Arc<AssignmentOrchestrator>>,
    Json(req): Json<BulkReassignRequest>,
) -> ApiResult<Json<BulkReassignResult>> {
    require_text(&req.reason, "reason")?;
    if req.old_caseworker_id == req.new_caseworker_id {
        return Err(ApiError::invalid_input(
            "old_caseworker_id and new_caseworker_id must differ",
        ));
    }
    Ok(Json(orchestrator.bulk_reassignment(req).await?))
}

// ============================================================================
// ROUTER SETUP
// ============================================================================

/// Create the assignment routes router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_assignment))
        .route("/auto", post(auto_assign))
        .route("/bulk-reassign", post(bulk_reassign))
        .route("/:id", get(get_assignment))
        .route("/:id/history", get(get_history))
        .route("/:id/accept", post(accept_assignment))
        .route("/:id/activate", post(activate_assignment))
        .route("/:id/reassign", post(reassign_assignment))
        .route("/:id/complete", post(complete_assignment))
        .route("/:id/cancel", post(cancel_assignment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_require_text_rejects_blank() {
        let err = require_text("   ", "reason").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
        assert!(require_text("leave", "reason").is_ok());
    }

    #[test]
    fn test_holder_action_request_deserializes() {
        let id = uuid::Uuid::now_v7();
        let req: HolderActionRequest =
            serde_json::from_value(serde_json::json!({ "caseworker_id": id })).unwrap();
        assert_eq!(req.caseworker_id.to_string(), id.to_string());
    }
}
