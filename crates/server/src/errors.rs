use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use service::auth::errors::AuthError;
use service::errors::ServiceError;

/// JSON error body: `{"status": 404, "error": "Not Found", "message": "..."}`.
#[derive(Debug, Serialize)]
pub struct JsonApiError {
    #[serde(skip)]
    pub code: StatusCode,
    pub status: u16,
    pub error: String,
    pub message: Option<String>,
}

impl JsonApiError {
    pub fn new(code: StatusCode, error: &str, message: Option<String>) -> Self {
        Self { code, status: code.as_u16(), error: error.to_string(), message }
    }

    pub fn unauthorized(message: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", Some(message.to_string()))
    }

    pub fn forbidden(message: &str) -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden", Some(message.to_string()))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Validation Error", Some(message.into()))
    }

    /// 500 without internal detail; the cause is logged by the caller.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some("internal server error".into()))
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        (self.code, Json(self)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(m) => JsonApiError::bad_request(m),
            ServiceError::Forbidden(m) => JsonApiError::new(StatusCode::FORBIDDEN, "Forbidden", Some(m)),
            ServiceError::NotFound(m) => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(m)),
            ServiceError::Conflict(m) => JsonApiError::new(StatusCode::CONFLICT, "Conflict", Some(m)),
            ServiceError::External(m) => {
                error!(err = %m, "upstream call failed");
                JsonApiError::new(StatusCode::BAD_GATEWAY, "Bad Gateway", Some(m))
            }
            ServiceError::Mail(m) => {
                error!(err = %m, "mail delivery failed");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(format!("mail error: {m}")))
            }
            other => {
                error!(err = %other, "request failed");
                JsonApiError::internal()
            }
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Unauthorized => JsonApiError::unauthorized("invalid username or password"),
            AuthError::Disabled => JsonApiError::unauthorized("user is disabled"),
            AuthError::TokenError(m) => JsonApiError::unauthorized(&m),
            AuthError::Validation(m) => JsonApiError::bad_request(m),
            AuthError::Conflict => JsonApiError::new(StatusCode::CONFLICT, "Conflict", Some(e.to_string())),
            AuthError::NotFound => JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some(e.to_string())),
            other => {
                error!(err = %other, code = other.code(), "auth failure");
                JsonApiError::internal()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("runtime check failed: {0}")]
    Runtime(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_status() {
        let cases = [
            (ServiceError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ServiceError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ServiceError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ServiceError::Conflict("x".into()), StatusCode::CONFLICT),
            (ServiceError::External("x".into()), StatusCode::BAD_GATEWAY),
            (ServiceError::Db("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ServiceError::Mail("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, code) in cases {
            let api: JsonApiError = err.into();
            assert_eq!(api.code, code);
            assert_eq!(api.status, code.as_u16());
        }
    }

    #[test]
    fn internal_errors_do_not_leak_detail() {
        let leaks = [
            ServiceError::Db("numeric field overflow in \"payment\"".into()),
            ServiceError::Storage("/srv/uploads/tasks/1: permission denied".into()),
        ];
        for err in leaks {
            let api: JsonApiError = err.into();
            assert_eq!(api.code, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(api.message.as_deref(), Some("internal server error"));
        }
        let api: JsonApiError = AuthError::Repository("relation app_user does not exist".into()).into();
        assert_eq!(api.message.as_deref(), Some("internal server error"));

        let api: JsonApiError = ServiceError::Mail("mail is not configured".into()).into();
        assert!(api.message.unwrap_or_default().contains("not configured"));
    }

    #[test]
    fn auth_errors_are_unauthorized() {
        let api: JsonApiError = AuthError::Unauthorized.into();
        assert_eq!(api.code, StatusCode::UNAUTHORIZED);
        let api: JsonApiError = AuthError::Disabled.into();
        assert_eq!(api.code, StatusCode::UNAUTHORIZED);
    }
}
