//! Store surroundings via OpenStreetMap.
//!
//! Schools, kindergartens and medical facilities near a store matter for
//! alcohol sale restrictions, so those are looked up by default.

use common::geo::{GeoClient, Poi};
use common::types::GeoPoint;
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use tracing::{info, instrument};

use models::store;

use crate::errors::ServiceError;

pub const DEFAULT_RADIUS_M: u32 = 500;
pub const MAX_RADIUS_M: u32 = 5_000;
pub const DEFAULT_POI_KINDS: &[&str] = &["amenity=school", "amenity=kindergarten", "amenity=hospital", "amenity=clinic", "shop"];

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSurroundings {
    pub store_id: i64,
    pub address: String,
    pub point: GeoPoint,
    pub radius_m: u32,
    pub pois: Vec<Poi>,
}

pub fn effective_radius(radius: Option<u32>) -> Result<u32, ServiceError> {
    match radius {
        None => Ok(DEFAULT_RADIUS_M),
        Some(0) => Err(ServiceError::Validation("radius must be positive".into())),
        Some(r) if r > MAX_RADIUS_M => Err(ServiceError::Validation(format!("radius must not exceed {MAX_RADIUS_M} m"))),
        Some(r) => Ok(r),
    }
}

#[instrument(skip(geo))]
pub async fn geocode(geo: &GeoClient, address: &str) -> Result<GeoPoint, ServiceError> {
    geo.geocode(address).await?.ok_or_else(|| ServiceError::not_found("address"))
}

#[instrument(skip(db, geo))]
pub async fn nearby_for_store(
    db: &DatabaseConnection,
    geo: &GeoClient,
    store_id: i64,
    radius: Option<u32>,
) -> Result<StoreSurroundings, ServiceError> {
    let radius_m = effective_radius(radius)?;
    let store = store::Entity::find_by_id(store_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("store"))?;
    let point = geocode(geo, &store.address).await?;
    let pois = geo.nearby_pois(point, radius_m, DEFAULT_POI_KINDS).await?;
    info!(store_id, count = pois.len(), "store_surroundings_loaded");
    Ok(StoreSurroundings { store_id, address: store.address, point, radius_m, pois })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_bounds() {
        assert_eq!(effective_radius(None).unwrap(), DEFAULT_RADIUS_M);
        assert_eq!(effective_radius(Some(100)).unwrap(), 100);
        assert!(matches!(effective_radius(Some(0)), Err(ServiceError::Validation(_))));
        assert!(matches!(effective_radius(Some(MAX_RADIUS_M + 1)), Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn blank_address_is_validation_error() {
        let geo = GeoClient::new("http://127.0.0.1:9", "http://127.0.0.1:9", "test", 1).unwrap();
        assert!(matches!(geocode(&geo, "  ").await, Err(ServiceError::Validation(_))));
    }
}
