//! Caseworker REST API Routes

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use caseflow_assign::AssignmentOrchestrator;
use caseflow_core::{Assignment, AssignmentStatus, CaseworkerId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    extractors::PathId,
    state::AppState,
};

/// Query parameters for listing a caseworker's assignments.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
pub struct ListAssignmentsQuery {
    /// Only return assignments in this status (e.g. `pending`, `active`).
    pub status: Option<String>,
}

impl ListAssignmentsQuery {
    fn status_filter(&self) -> ApiResult<Option<AssignmentStatus>> {
        self.status
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                AssignmentStatus::from_db_str(s).map_err(|_| {
                    ApiError::invalid_input(format!("Unknown assignment status '{}'", s))
                })
            })
            .transpose()
    }
}

/// GET /api/v1/caseworkers/{id}/assignments - Assignments held by a caseworker
#[utoipa::path(
    get,
    path = "/api/v1/caseworkers/{id}/assignments",
    tag = "Caseworkers",
    params(
        ("id" = Uuid, Path, description = "Caseworker ID"),
        ListAssignmentsQuery
    ),
    responses(
        (status = 200, description = "Assignments held by the caseworker", body = Vec<Assignment>),
        (status = 400, description = "Unknown status filter", body = ApiError),
        (status = 404, description = "Caseworker not found", body = ApiError),
    ),
)]
pub async fn list_assignments(
    State(orchestrator): State<Arc<AssignmentOrchestrator>>,
    PathId(id): PathId<CaseworkerId>,
    Query(params): Query<ListAssignmentsQuery>,
) -> ApiResult<Json<Vec<Assignment>>> {
    let status = params.status_filter()?;
    Ok(Json(orchestrator.list_by_caseworker(id, status).await?))
}

/// Create the caseworker routes router.
pub fn create_router() -> Router<AppState> {
    Router::new().route("/:id/assignments", get(list_assignments))
}
