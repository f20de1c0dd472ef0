//! Body, query and path extractors whose rejections are rendered as `JsonApiError`.

use axum::async_trait;
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::JsonApiError;

/// `Json<T>` that fails with a JSON 400 instead of axum's plain-text 422.
pub struct ApiJson<T>(pub T);

/// `Query<T>` that fails with a JSON 400.
pub struct ApiQuery<T>(pub T);

/// `Path<T>` that fails with a JSON 400.
pub struct ApiPath<T>(pub T);

fn rejected(status: StatusCode, text: String) -> JsonApiError {
    debug!(%status, %text, "request rejected by extractor");
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => JsonApiError::bad_request(text),
        other => JsonApiError::new(other, other.canonical_reason().unwrap_or("Error"), Some(text)),
    }
}

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;
        Ok(Self(value))
    }
}

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| rejected(e.status(), e.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unprocessable_becomes_validation_error() {
        let e = rejected(StatusCode::UNPROCESSABLE_ENTITY, "unknown variant `BEER`".into());
        assert_eq!(e.code, StatusCode::BAD_REQUEST);
        assert_eq!(e.error, "Validation Error");
        assert_eq!(e.message.as_deref(), Some("unknown variant `BEER`"));
    }

    #[test]
    fn other_statuses_are_kept() {
        let e = rejected(StatusCode::UNSUPPORTED_MEDIA_TYPE, "expected application/json".into());
        assert_eq!(e.code, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(e.status, 415);
        assert_eq!(e.error, "Unsupported Media Type");
    }
}
