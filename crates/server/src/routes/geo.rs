use axum::{
    extract::State,
    Json,
};
use common::types::GeoPoint;
use serde::Deserialize;

use service::geo_service::{self, StoreSurroundings};

use crate::errors::JsonApiError;
use crate::extract::{ApiPath, ApiQuery};
use crate::routes::auth::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AddressQuery {
    pub address: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RadiusQuery {
    /// Metres, 500 by default
    pub radius: Option<u32>,
}

#[utoipa::path(get, path = "/api/geo/geocode", tag = "geo", params(AddressQuery), responses((status = 200, description = "Coordinates"), (status = 404, description = "Address not found"), (status = 502, description = "Nominatim failed")))]
pub async fn geocode(State(state): State<ServerState>, ApiQuery(q): ApiQuery<AddressQuery>) -> Result<Json<GeoPoint>, JsonApiError> {
    Ok(Json(geo_service::geocode(&state.geo, &q.address).await?))
}

#[utoipa::path(get, path = "/api/geo/stores/{id}/nearby", tag = "geo", params(("id" = i64, Path, description = "Store id"), RadiusQuery), responses((status = 200, description = "Points of interest around the store"), (status = 502, description = "Upstream failed")))]
pub async fn nearby(
    State(state): State<ServerState>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(q): ApiQuery<RadiusQuery>,
) -> Result<Json<StoreSurroundings>, JsonApiError> {
    Ok(Json(geo_service::nearby_for_store(&state.db, &state.geo, id, q.radius).await?))
}
