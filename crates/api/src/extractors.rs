//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request, rejection::JsonRejection},
    http::request::Parts,
};
use serde::Deserialize;
use taiwanstay_common::AppError;
use taiwanstay_db::entities::user;

/// Authenticated user extractor.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .map(AuthUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional authenticated user extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<user::Model>);

impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<user::Model>().cloned()))
    }
}

/// JSON request body.
///
/// Malformed, incomplete or untyped bodies become `BadRequest` so they use
/// the same error envelope as every other failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

/// `?limit=&offset=` query parameters.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    /// Requested limit clamped to `1..=100`, 20 when absent.
    #[must_use]
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[derive(Debug, Deserialize)]
    struct StatusBody {
        #[allow(dead_code)]
        status: String,
    }

    fn json_request(body: &'static str, content_type: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().method("PATCH").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn test_json_body_missing_field_is_bad_request() {
        let req = json_request(r#"{"reason":"x"}"#, Some("application/json"));
        let result = JsonBody::<StatusBody>::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest(msg)) if msg.contains("status")));
    }

    #[tokio::test]
    async fn test_json_body_without_content_type_is_bad_request() {
        let req = json_request(r#"{"status":"PAUSED"}"#, None);
        let result = JsonBody::<StatusBody>::from_request(req, &()).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_pagination_clamps() {
        let p = Pagination {
            limit: Some(1000),
            offset: None,
        };
        assert_eq!(p.limit(), 100);
        assert_eq!(p.offset(), 0);
        assert_eq!(Pagination::default().limit(), 20);
        let zero = Pagination {
            limit: Some(0),
            offset: Some(40),
        };
        assert_eq!(zero.limit(), 1);
        assert_eq!(zero.offset(), 40);
    }
}
