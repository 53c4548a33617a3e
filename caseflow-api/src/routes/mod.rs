//! REST API Routes Module
//!
//! Route handlers organized by resource:
//! - Assignments (create, transitions, history, bulk reassignment)
//! - Caseworker assignment listings
//! - Escalation sweeps (manual trigger, metrics)
//! - Health checks
//!
//! Plus the OpenAPI document and CORS support for browser-based clients.

pub mod assignment;
pub mod caseworker;
pub mod health;
pub mod sweep;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::ApiConfig;
use crate::error::{ApiError, ErrorCode};
use crate::openapi::ApiDoc;
use crate::state::AppState;

// ============================================================================
// OPENAPI
// ============================================================================

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

// ============================================================================
// ROUTER
// ============================================================================

/// Build the full API router over shared state.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    let api_routes = Router::new()
        .nest("/assignments", assignment::create_router())
        .nest("/caseworkers", caseworker::create_router())
        .nest("/sweeps", sweep::create_router());

    #[allow(unused_mut)]
    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health::create_router())
        .route("/openapi.json", get(openapi_json))
        .with_state(state);

    #[cfg(feature = "swagger-ui")]
    {
        use utoipa_swagger_ui::SwaggerUi;
        router = router.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
    }

    with_request_timeout(router, config.request_timeout)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(config))
}

/// Abort requests after `timeout` with a `TIMEOUT` error body.
fn with_request_timeout(router: Router, timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::map_response(timeout_as_api_error))
}

/// The timeout layer answers with a bare 408; give it the usual error body.
async fn timeout_as_api_error(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return ApiError::from_code(ErrorCode::Timeout).into_response();
    }
    response
}

/// Build the CORS layer from configuration.
///
/// With no configured origins every origin is allowed; otherwise origins are
/// matched with [`ApiConfig::is_origin_allowed`], so `*.` wildcards work.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(config.cors_max_age_secs));

    if config.cors_origins.is_empty() {
        tracing::info!("CORS: Development mode - allowing all origins");
        cors.allow_origin(Any)
    } else {
        tracing::info!(
            "CORS: Production mode - allowing origins: {:?}",
            config.cors_origins
        );
        let allowed = config.clone();
        let cors = cors.allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts| {
                origin
                    .to_str()
                    .map(|o| allowed.is_origin_allowed(o))
                    .unwrap_or(false)
            },
        ));
        if config.cors_allow_credentials {
            cors.allow_credentials(true)
        } else {
            cors
        }
    }
}
