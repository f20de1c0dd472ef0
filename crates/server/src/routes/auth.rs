use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use common::geo::GeoClient;
use configs::AppConfig;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::warn;

use service::auth::domain::{AuthUser, Claims, LoginInput};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::service::{AuthConfig, AuthService};
use service::mail::Mailer;
use service::storage::FileStore;
use service::tasks::domain::Viewer;
use service::tasks::repo::seaorm::SeaOrmTaskRepository;
use service::tasks::TaskService;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;

/// Shared handler state.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: Arc<AuthService<SeaOrmAuthRepository>>,
    pub tasks: Arc<TaskService<SeaOrmTaskRepository>>,
    pub files: Arc<FileStore>,
    pub mailer: Arc<dyn Mailer>,
    pub geo: GeoClient,
    pub config: Arc<AppConfig>,
}

impl ServerState {
    pub fn new(
        db: DatabaseConnection,
        config: AppConfig,
        files: Arc<FileStore>,
        mailer: Arc<dyn Mailer>,
        geo: GeoClient,
    ) -> Self {
        let auth_repo = Arc::new(SeaOrmAuthRepository { db: db.clone() });
        let auth = Arc::new(AuthService::new(auth_repo, AuthConfig::from(&config.auth)));
        let tasks = Arc::new(TaskService::new(Arc::new(SeaOrmTaskRepository::new(db.clone()))));
        Self { db, auth, tasks, files, mailer, geo, config: Arc::new(config) }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginOutput {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub full_name: String,
    pub roles: Vec<String>,
}

#[utoipa::path(post, path = "/api/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged in"), (status = 401, description = "Unauthorized")))]
pub async fn login(State(state): State<ServerState>, ApiJson(input): ApiJson<LoginInput>) -> Result<Json<LoginOutput>, JsonApiError> {
    let session = state.auth.login(input).await?;
    let u = session.user;
    Ok(Json(LoginOutput {
        token: session.token,
        token_type: "Bearer",
        id: u.id,
        username: u.username,
        email: u.email,
        full_name: u.full_name,
        roles: u.roles,
    }))
}

#[utoipa::path(get, path = "/api/auth/me", tag = "auth", responses((status = 200, description = "Current user"), (status = 401, description = "Unauthorized")))]
pub async fn me(State(state): State<ServerState>, Extension(claims): Extension<Claims>) -> Result<Json<AuthUser>, JsonApiError> {
    Ok(Json(state.auth.current_user(claims.uid).await?))
}

fn is_public(method: &Method, path: &str) -> bool {
    method == Method::OPTIONS
        || path == "/health"
        || path == "/metrics"
        || path == "/api/auth/login"
        || path.starts_with("/docs")
        || path.starts_with("/api-docs")
}

/// Bearer token check for everything outside the public allow-list.
/// Valid claims are stored in the request extensions.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    if is_public(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }
    let path = req.uri().path().to_string();
    let Some(Authorization(bearer)) = req.headers().typed_get::<Authorization<Bearer>>() else {
        warn!(%path, "missing or malformed Authorization header (expect Bearer)");
        return Err(JsonApiError::unauthorized("missing bearer token"));
    };
    let token = bearer.token().trim();
    match state.auth.verify_token(token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(e) => {
            warn!(%path, err = %e, "token validation failed");
            Err(JsonApiError::unauthorized("invalid or expired token"))
        }
    }
}

pub fn require_admin(claims: &Claims) -> Result<(), JsonApiError> {
    if claims.is_admin() {
        Ok(())
    } else {
        Err(JsonApiError::forbidden("administrator role required"))
    }
}

pub fn viewer(claims: &Claims) -> Viewer {
    Viewer { user_id: claims.uid, is_admin: claims.is_admin() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(roles: &[&str]) -> Claims {
        Claims { sub: "u".into(), uid: 7, roles: roles.iter().map(|r| r.to_string()).collect(), exp: 0 }
    }

    #[test]
    fn public_paths() {
        assert!(is_public(&Method::GET, "/health"));
        assert!(is_public(&Method::POST, "/api/auth/login"));
        assert!(is_public(&Method::GET, "/docs/index.html"));
        assert!(is_public(&Method::OPTIONS, "/api/tasks"));
        assert!(!is_public(&Method::GET, "/api/tasks"));
        assert!(!is_public(&Method::GET, "/api/auth/me"));
    }

    #[test]
    fn admin_guard() {
        assert!(require_admin(&claims(&["ADMIN"])).is_ok());
        assert_eq!(require_admin(&claims(&["MANAGER"])).unwrap_err().status, 403);
        let v = viewer(&claims(&["MANAGER"]));
        assert_eq!(v, Viewer { user_id: 7, is_admin: false });
    }
}
