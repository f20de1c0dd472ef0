use axum::{extract::State, Json};

use service::user_service::{self, UserSummary, Workload};

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[utoipa::path(get, path = "/api/users", tag = "users", responses((status = 200, description = "Active users")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<UserSummary>>, JsonApiError> {
    Ok(Json(user_service::list_users(&state.db).await?))
}

#[utoipa::path(get, path = "/api/users/workload", tag = "users", responses((status = 200, description = "Open tasks per user")))]
pub async fn workload(State(state): State<ServerState>) -> Result<Json<Vec<Workload>>, JsonApiError> {
    Ok(Json(user_service::workload(&state.db).await?))
}
