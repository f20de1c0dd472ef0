use axum::{
    extract::State,
    Json,
};

use models::egrn_extract;
use service::egrn_service::{self, EgrnRequest};

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::routes::auth::ServerState;

#[utoipa::path(get, path = "/api/egrn-extracts", tag = "egrn", responses((status = 200, description = "Extract requests, newest first")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<egrn_extract::Model>>, JsonApiError> {
    Ok(Json(egrn_service::list_extracts(&state.db).await?))
}

#[utoipa::path(post, path = "/api/egrn-extracts", tag = "egrn", request_body = crate::openapi::EgrnRequestDoc, responses((status = 200, description = "Submitted"), (status = 400, description = "Validation Error")))]
pub async fn create(State(state): State<ServerState>, ApiJson(req): ApiJson<EgrnRequest>) -> Result<Json<egrn_extract::Model>, JsonApiError> {
    Ok(Json(egrn_service::create_extract(&state.db, req).await?))
}

#[utoipa::path(get, path = "/api/egrn-extracts/{id}", tag = "egrn", params(("id" = i64, Path, description = "Extract id")), responses((status = 200, description = "Extract"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<Json<egrn_extract::Model>, JsonApiError> {
    Ok(Json(egrn_service::get_extract(&state.db, id).await?))
}
