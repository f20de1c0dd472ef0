use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use service::auth::domain::Claims;
use service::pagination::{Page, Pagination};
use service::store_service::{self, LicenseStats, StoreFilter, StoreRequest};
use service::tasks::service::today;

use crate::errors::JsonApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::routes::auth::{require_admin, ServerState};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(rename_all = "camelCase", parameter_in = Query)]
pub struct StoreListQuery {
    pub active: Option<bool>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl StoreListQuery {
    fn paging(&self) -> Option<Pagination> {
        if self.page.is_none() && self.per_page.is_none() {
            return None;
        }
        let d = Pagination::default();
        Some(Pagination { page: self.page.unwrap_or(d.page), per_page: self.per_page.unwrap_or(d.per_page) })
    }
}

#[utoipa::path(get, path = "/api/references/stores", tag = "stores", params(StoreListQuery), responses((status = 200, description = "Stores")))]
pub async fn list(State(state): State<ServerState>, ApiQuery(q): ApiQuery<StoreListQuery>) -> Result<Json<Page<models::store::Model>>, JsonApiError> {
    let filter = StoreFilter { active: q.active, search: q.search.clone() };
    Ok(Json(store_service::list_stores(&state.db, &filter, q.paging()).await?))
}

#[utoipa::path(get, path = "/api/references/stores/license-stats", tag = "stores", responses((status = 200, description = "License counters")))]
pub async fn license_stats(State(state): State<ServerState>) -> Result<Json<LicenseStats>, JsonApiError> {
    Ok(Json(store_service::store_license_stats(&state.db, today()).await?))
}

#[utoipa::path(get, path = "/api/references/stores/{id}", tag = "stores", params(("id" = i64, Path, description = "Store id")), responses((status = 200, description = "Store"), (status = 404, description = "Not Found")))]
pub async fn get(State(state): State<ServerState>, ApiPath(id): ApiPath<i64>) -> Result<Json<models::store::Model>, JsonApiError> {
    Ok(Json(store_service::get_store(&state.db, id).await?))
}

#[utoipa::path(post, path = "/api/references/stores", tag = "stores", request_body = crate::openapi::StoreRequestDoc, responses((status = 200, description = "Created"), (status = 409, description = "INN already used")))]
pub async fn create(State(state): State<ServerState>, ApiJson(req): ApiJson<StoreRequest>) -> Result<Json<models::store::Model>, JsonApiError> {
    Ok(Json(store_service::create_store(&state.db, req).await?))
}

#[utoipa::path(put, path = "/api/references/stores/{id}", tag = "stores", params(("id" = i64, Path, description = "Store id")), request_body = crate::openapi::StoreRequestDoc, responses((status = 200, description = "Updated"), (status = 403, description = "Forbidden")))]
pub async fn update(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<StoreRequest>,
) -> Result<Json<models::store::Model>, JsonApiError> {
    require_admin(&claims)?;
    Ok(Json(store_service::update_store(&state.db, id, req).await?))
}

#[utoipa::path(delete, path = "/api/references/stores/{id}", tag = "stores", params(("id" = i64, Path, description = "Store id")), responses((status = 204, description = "Deleted"), (status = 403, description = "Forbidden")))]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<StatusCode, JsonApiError> {
    require_admin(&claims)?;
    store_service::delete_store(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
