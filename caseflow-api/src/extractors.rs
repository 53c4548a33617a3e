//! Custom path extractors for type-safe entity IDs.
//!
//! `PathId<T>` parses a single `:id` path segment into one of the
//! `EntityIdType` newtypes and rejects malformed ids with an [`ApiError`].

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use caseflow_core::EntityIdType;
use uuid::Uuid;

use crate::error::{ApiError, ErrorCode};

/// Extractor for a type-safe entity ID from the path.
///
/// ```rust,ignore
/// async fn get_assignment(
///     PathId(assignment_id): PathId<AssignmentId>,
/// ) -> ApiResult<impl IntoResponse> {
///     // assignment_id is AssignmentId, not Uuid
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathId<T: EntityIdType>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathId<T>
where
    S: Send + Sync,
    T: EntityIdType,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(uuid): Path<Uuid> = Path::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                ApiError::new(
                    ErrorCode::InvalidFormat,
                    format!("Invalid {} id in path: {}", T::ENTITY_NAME, e.body_text()),
                )
                .with_details(serde_json::json!({ "path": parts.uri.path() }))
            })?;

        Ok(PathId(T::new(uuid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use caseflow_core::AssignmentId;

    async fn extract(uri: &str) -> Result<PathId<AssignmentId>, ApiError> {
        // Path params are populated by the router; drive the extractor through one.
        use axum::{routing::get, Router};
        use tower::ServiceExt;

        let app = Router::new().route(
            "/items/:id",
            get(|PathId(id): PathId<AssignmentId>| async move { id.to_string() }),
        );
        let response = app
            .oneshot(Request::builder().uri(uri).body(axum::body::Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        if status.is_success() {
            let id: Uuid = std::str::from_utf8(&body).unwrap().parse().unwrap();
            Ok(PathId(AssignmentId::new(id)))
        } else {
            Err(serde_json::from_slice(&body).unwrap())
        }
    }

    #[tokio::test]
    async fn test_valid_uuid_is_extracted() {
        let id = Uuid::now_v7();
        let PathId(extracted) = extract(&format!("/items/{}", id)).await.unwrap();
        assert_eq!(extracted.as_uuid(), id);
    }

    #[tokio::test]
    async fn test_malformed_uuid_is_rejected() {
        let err = extract("/items/not-a-uuid").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidFormat);
        assert!(err.message.contains("Assignment"));
        assert_eq!(err.details.unwrap()["path"], "/items/not-a-uuid");
    }
}
