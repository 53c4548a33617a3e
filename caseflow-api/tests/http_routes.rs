//! HTTP-level tests for the Caseflow API router over in-memory storage.

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use caseflow_api::{create_api_router, ApiConfig, AppState, EscalationSweepConfig};
use caseflow_assign::AssignmentOrchestrator;
use caseflow_core::{Assignment, AssignmentId, CaseworkerId, EntityIdType};
use caseflow_storage::CaseworkerRegistry;
use caseflow_test_utils::fixtures::{self, World};
use caseflow_test_utils::ManualClock;
use chrono::Duration;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

// ============================================================================
// HELPERS
// ============================================================================

struct TestApp {
    world: World,
    clock: ManualClock,
    router: Router,
}

fn test_app() -> TestApp {
    let world = World::new();
    let clock = ManualClock::new(fixtures::monday_morning());
    let orchestrator = Arc::new(
        AssignmentOrchestrator::from_storage(Arc::new(world.storage.clone()))
            .with_clock(Arc::new(clock.clone())),
    );
    let state = AppState::new(orchestrator, EscalationSweepConfig::development());
    let router = create_api_router(state, &ApiConfig::default());
    TestApp {
        world,
        clock,
        router,
    }
}

impl TestApp {
    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, value)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(body)).await
    }

    fn assign_body(&self, caseworker: CaseworkerId) -> Value {
        json!({
            "client_id": self.world.client,
            "tenant_id": self.world.tenant_id,
            "caseworker_id": caseworker,
            "assigned_by": self.world.admin,
            "case_type": "housing",
        })
    }

    async fn create(&self) -> Assignment {
        let (status, body) = self
            .post("/api/v1/assignments", self.assign_body(self.world.alice))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        serde_json::from_value(body).unwrap()
    }

    async fn workload(&self, id: CaseworkerId) -> u32 {
        self.world
            .storage
            .caseworker_get(id)
            .await
            .unwrap()
            .unwrap()
            .current_workload
    }
}

// ============================================================================
// HEALTH & DOCS
// ============================================================================

#[tokio::test]
async fn health_endpoints_respond() {
    let app = test_app();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = app.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["details"]["storage"]["status"], "healthy");
    assert_eq!(body["details"]["sweep_in_progress"], false);
}

#[tokio::test]
async fn readiness_reports_unavailable_storage() {
    let app = test_app();
    app.world.storage.set_unavailable(true);
    let (status, body) = app.get("/health/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unhealthy");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = test_app();
    let (status, body) = app.get("/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Caseflow API");
}

// ============================================================================
// ASSIGNMENT LIFECYCLE
// ============================================================================

#[tokio::test]
async fn create_then_fetch_assignment() {
    let app = test_app();
    let created = app.create().await;
    assert_eq!(created.current_caseworker_id, app.world.alice);
    assert_eq!(app.workload(app.world.alice).await, 1);

    let (status, body) = app
        .get(&format!("/api/v1/assignments/{}", created.assignment_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["case_type"], "housing");

    let (status, body) = app
        .get(&format!("/api/v1/assignments/{}/history", created.assignment_id))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn second_open_assignment_for_client_conflicts() {
    let app = test_app();
    let first = app.create().await;

    let (status, body) = app
        .post("/api/v1/assignments", app.assign_body(app.world.bob))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "ACTIVE_ASSIGNMENT_EXISTS");
    assert_eq!(
        body["details"]["existing_assignment_id"],
        first.assignment_id.to_string()
    );
    assert_eq!(app.workload(app.world.bob).await, 0);
}

#[tokio::test]
async fn only_the_holder_can_accept_and_activate() {
    let app = test_app();
    let created = app.create().await;
    let base = format!("/api/v1/assignments/{}", created.assignment_id);

    let (status, body) = app
        .post(&format!("{base}/accept"), json!({ "caseworker_id": app.world.bob }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "NOT_ASSIGNMENT_HOLDER");

    let (status, body) = app
        .post(&format!("{base}/activate"), json!({ "caseworker_id": app.world.alice }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "STATE_CONFLICT");

    let (status, body) = app
        .post(&format!("{base}/accept"), json!({ "caseworker_id": app.world.alice }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "accepted");

    let (status, body) = app
        .post(&format!("{base}/activate"), json!({ "caseworker_id": app.world.alice }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");
}

#[tokio::test]
async fn reassign_moves_workload() {
    let app = test_app();
    let created = app.create().await;
    let uri = format!("/api/v1/assignments/{}/reassign", created.assignment_id);

    let (status, body) = app
        .post(
            &uri,
            json!({
                "new_caseworker_id": app.world.bob,
                "reassigned_by": app.world.admin,
                "reason": "  ",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "MISSING_FIELD");

    let (status, body) = app
        .post(
            &uri,
            json!({
                "new_caseworker_id": app.world.bob,
                "reassigned_by": app.world.admin,
                "reason": "caseload balancing",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["current_caseworker_id"], app.world.bob.to_string());
    assert_eq!(body["history"].as_array().map(Vec::len), Some(2));
    assert_eq!(app.workload(app.world.alice).await, 0);
    assert_eq!(app.workload(app.world.bob).await, 1);

    // Reassigning to the current holder is rejected.
    let (status, body) = app
        .post(
            &uri,
            json!({
                "new_caseworker_id": app.world.bob,
                "reassigned_by": app.world.admin,
                "reason": "again",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn complete_closes_and_rejects_repeat() {
    let app = test_app();
    let created = app.create().await;
    let uri = format!("/api/v1/assignments/{}/complete", created.assignment_id);

    let (status, body) = app
        .post(&uri, json!({ "final_status": "Approved", "notes": "housed" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "completed");
    assert_eq!(body["case_status"], "Approved");
    assert_eq!(app.workload(app.world.alice).await, 0);

    let (status, body) = app.post(&uri, json!({ "final_status": "Rejected" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "STATE_CONFLICT");
    assert_eq!(body["details"]["status"], "completed");
}

#[tokio::test]
async fn cancel_releases_workload() {
    let app = test_app();
    let created = app.create().await;
    let (status, body) = app
        .post(
            &format!("/api/v1/assignments/{}/cancel", created.assignment_id),
            json!({ "cancelled_by": app.world.admin, "reason": "client moved away" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["cancellation_reason"], "client moved away");
    assert_eq!(app.workload(app.world.alice).await, 0);
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let app = test_app();
    let (status, body) = app
        .get(&format!("/api/v1/assignments/{}", AssignmentId::now_v7()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "ENTITY_NOT_FOUND");

    let (status, body) = app.get("/api/v1/assignments/not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_FORMAT");
}

// ============================================================================
// AUTO ASSIGN & BULK
// ============================================================================

#[tokio::test]
async fn auto_assign_picks_a_caseworker_or_conflicts() {
    let app = test_app();
    let body = json!({
        "client_id": app.world.client,
        "tenant_id": app.world.tenant_id,
        "assigned_by": app.world.admin,
        "case_type": "benefits",
    });
    let (status, created) = app.post("/api/v1/assignments/auto", body).await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    // Only Bob specializes in benefits.
    assert_eq!(created["current_caseworker_id"], app.world.bob.to_string());

    for id in [app.world.alice, app.world.bob] {
        let cw = app.world.storage.caseworker_get(id).await.unwrap().unwrap();
        app.world.add_caseworker(cw.with_availability(false));
    }
    let other = app.world.new_client("dave");
    let (status, body) = app
        .post(
            "/api/v1/assignments/auto",
            json!({
                "client_id": other,
                "tenant_id": app.world.tenant_id,
                "assigned_by": app.world.admin,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "NO_AVAILABLE_CASEWORKER");
}

#[tokio::test]
async fn bulk_reassign_moves_everything() {
    let app = test_app();
    app.create().await;
    let second = app.world.new_client("erin");
    let mut body = app.assign_body(app.world.alice);
    body["client_id"] = json!(second);
    let (status, _) = app.post("/api/v1/assignments", body).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .post(
            "/api/v1/assignments/bulk-reassign",
            json!({
                "old_caseworker_id": app.world.alice,
                "new_caseworker_id": app.world.bob,
                "reassigned_by": app.world.admin,
                "reason": "alice on leave",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["reassigned_count"], 2);
    assert_eq!(body["failed_count"], 0);
    assert_eq!(app.workload(app.world.alice).await, 0);
    assert_eq!(app.workload(app.world.bob).await, 2);
}

// ============================================================================
// CASEWORKER LISTING
// ============================================================================

#[tokio::test]
async fn list_caseworker_assignments_with_filter() {
    let app = test_app();
    app.create().await;
    let base = format!("/api/v1/caseworkers/{}/assignments", app.world.alice);

    let (status, body) = app.get(&base).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = app.get(&format!("{base}?status=pending")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let (status, body) = app.get(&format!("{base}?status=completed")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(0));

    let (status, body) = app.get(&format!("{base}?status=lost")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");

    let (status, _) = app
        .get(&format!(
            "/api/v1/caseworkers/{}/assignments",
            CaseworkerId::now_v7()
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// SWEEPS
// ============================================================================

#[tokio::test]
async fn manual_sweep_escalates_and_updates_metrics() {
    let app = test_app();
    let created = app.create().await;

    let (status, body) = app.post("/api/v1/sweeps", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["processed"], 0);

    app.clock.advance(Duration::hours(30));
    let (status, body) = app.post("/api/v1/sweeps", json!({})).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["reassigned"], 1);

    let (_, moved) = app
        .get(&format!("/api/v1/assignments/{}", created.assignment_id))
        .await;
    assert_eq!(moved["current_caseworker_id"], app.world.bob.to_string());
    assert_eq!(moved["auto_reassignment_attempts"], 1);

    let (status, metrics) = app.get("/api/v1/sweeps/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(metrics["cycles"], 2);
    assert_eq!(metrics["processed"], 1);
    assert_eq!(metrics["reassigned"], 1);
    assert_eq!(metrics["errors"], 0);
}
