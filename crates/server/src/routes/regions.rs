use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use models::region;
use service::auth::domain::Claims;
use service::region_service::{self, RegionRequest};

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::auth::{require_admin, ServerState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NameQuery {
    pub name: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct LicenseTypeQuery {
    pub license_type: String,
}

#[utoipa::path(get, path = "/api/regions", tag = "regions", responses((status = 200, description = "Regions")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<region::Model>>, JsonApiError> {
    Ok(Json(region_service::list_regions(&state.db).await?))
}

#[utoipa::path(get, path = "/api/regions/{id}", tag = "regions", params(("id" = i64, Path, description = "Region id")), responses((status = 200, description = "Region"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<Json<region::Model>, JsonApiError> {
    Ok(Json(region_service::get_region(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/regions", tag = "regions", request_body = crate::openapi::RegionRequestDoc, responses((status = 200, description = "Created"), (status = 400, description = "Validation Error")))]
pub async fn create(State(state): State<ServerState>, ApiJson(req): ApiJson<RegionRequest>) -> Result<Json<region::Model>, JsonApiError> {
    Ok(Json(region_service::create_region(&state.db, req).await?))
}

#[utoipa::path(put, path = "/api/regions/{id}", tag = "regions", params(("id" = i64, Path, description = "Region id")), request_body = crate::openapi::RegionRequestDoc, responses((status = 200, description = "Updated"), (status = 403, description = "Forbidden")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<RegionRequest>,
) -> Result<Json<region::Model>, JsonApiError> {
    require_admin(&claims)?;
    Ok(Json(region_service::update_region(&state.db, id, req).await?))
}

#[utoipa::path(delete, path = "/api/regions/{id}", tag = "regions", params(("id" = i64, Path, description = "Region id")), responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden")))]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, JsonApiError> {
    require_admin(&claims)?;
    region_service::delete_region(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/api/regions/search", tag = "regions", params(NameQuery), responses((status = 200, description = "Matching regions")))]
pub async fn search(State(state): State<ServerState>, ApiQuery(q): ApiQuery<NameQuery>) -> Result<Json<Vec<region::Model>>, JsonApiError> {
    Ok(Json(region_service::search_regions(&state.db, &q.name).await?))
}

#[utoipa::path(get, path = "/api/regions/by-license-type", tag = "regions", params(LicenseTypeQuery), responses((status = 200, description = "Regions for a license type")))]
pub async fn by_license_type(State(state): State<ServerState>, ApiQuery(q): ApiQuery<LicenseTypeQuery>) -> Result<Json<Vec<region::Model>>, JsonApiError> {
    Ok(Json(region_service::regions_by_license_type(&state.db, &q.license_type).await?))
}
