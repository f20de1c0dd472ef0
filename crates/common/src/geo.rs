//! OpenStreetMap lookups: Nominatim geocoding and Overpass POI search.
//!
//! One HTTP call per operation; failures are returned to the caller as-is.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::types::GeoPoint;

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid input: {0}")]
    Invalid(String),
}

/// A point of interest returned by Overpass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    pub id: i64,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub distance_m: f64,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Debug, Deserialize)]
struct OverpassElement {
    id: i64,
    lat: Option<f64>,
    lon: Option<f64>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Clone)]
pub struct GeoClient {
    http: reqwest::Client,
    nominatim_url: String,
    overpass_url: String,
}

impl GeoClient {
    pub fn new(nominatim_url: &str, overpass_url: &str, user_agent: &str, timeout_secs: u64) -> Result<Self, GeoError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .map_err(|e| GeoError::Network(e.to_string()))?;
        Ok(Self {
            http,
            nominatim_url: nominatim_url.trim_end_matches('/').to_string(),
            overpass_url: overpass_url.to_string(),
        })
    }

    /// Resolve a free-form address to coordinates. `Ok(None)` when nothing matched.
    #[instrument(skip(self))]
    pub async fn geocode(&self, address: &str) -> Result<Option<GeoPoint>, GeoError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeoError::Invalid("address is empty".into()));
        }
        let url = format!("{}/search", self.nominatim_url);
        let body = self
            .http
            .get(&url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| GeoError::Network(e.to_string()))?
            .error_for_status()
            .map_err(|e| GeoError::Network(e.to_string()))?
            .text()
            .await
            .map_err(|e| GeoError::Network(e.to_string()))?;
        parse_nominatim(&body)
    }

    /// Nodes within `radius_m` of `center` carrying any of the given tag filters
    /// (`shop`, `amenity=school`, ...), nearest first.
    #[instrument(skip(self))]
    pub async fn nearby_pois(&self, center: GeoPoint, radius_m: u32, kinds: &[&str]) -> Result<Vec<Poi>, GeoError> {
        let query = overpass_query(center, radius_m, kinds)?;
        debug!(%query, "overpass query");
        let body = self
            .http
            .post(&self.overpass_url)
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|e| GeoError::Network(e.to_string()))?
            .error_for_status()
            .map_err(|e| GeoError::Network(e.to_string()))?
            .text()
            .await
            .map_err(|e| GeoError::Network(e.to_string()))?;
        parse_overpass(&body, center)
    }
}

pub fn parse_nominatim(body: &str) -> Result<Option<GeoPoint>, GeoError> {
    let hits: Vec<NominatimHit> = serde_json::from_str(body).map_err(|e| GeoError::Parse(e.to_string()))?;
    let Some(hit) = hits.into_iter().next() else { return Ok(None) };
    let lat = hit.lat.parse::<f64>().map_err(|e| GeoError::Parse(format!("lat: {e}")))?;
    let lon = hit.lon.parse::<f64>().map_err(|e| GeoError::Parse(format!("lon: {e}")))?;
    Ok(Some(GeoPoint { lat, lon }))
}

pub fn overpass_query(center: GeoPoint, radius_m: u32, kinds: &[&str]) -> Result<String, GeoError> {
    if radius_m == 0 {
        return Err(GeoError::Invalid("radius must be positive".into()));
    }
    if kinds.is_empty() {
        return Err(GeoError::Invalid("at least one POI kind is required".into()));
    }
    let mut q = String::from("[out:json][timeout:25];(");
    for kind in kinds {
        let filter = match kind.split_once('=') {
            Some((k, v)) => format!("[\"{k}\"=\"{v}\"]"),
            None => format!("[\"{kind}\"]"),
        };
        q.push_str(&format!("node(around:{radius_m},{},{}){filter};", center.lat, center.lon));
    }
    q.push_str(");out body;");
    Ok(q)
}

pub fn parse_overpass(body: &str, center: GeoPoint) -> Result<Vec<Poi>, GeoError> {
    let resp: OverpassResponse = serde_json::from_str(body).map_err(|e| GeoError::Parse(e.to_string()))?;
    let mut pois: Vec<Poi> = resp
        .elements
        .into_iter()
        .filter_map(|el| {
            let (lat, lon) = (el.lat?, el.lon?);
            Some(Poi {
                id: el.id,
                name: el.tags.get("name").cloned(),
                lat,
                lon,
                distance_m: haversine_m(center, GeoPoint { lat, lon }),
                tags: el.tags,
            })
        })
        .collect();
    pois.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    Ok(pois)
}

/// Great-circle distance in metres.
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOSCOW: GeoPoint = GeoPoint { lat: 55.7558, lon: 37.6173 };

    #[test]
    fn nominatim_first_hit_is_used() {
        let body = r#"[{"lat":"55.75","lon":"37.61","display_name":"Moscow"},{"lat":"1","lon":"2"}]"#;
        let p = parse_nominatim(body).unwrap().unwrap();
        assert_eq!(p, GeoPoint { lat: 55.75, lon: 37.61 });
    }

    #[test]
    fn nominatim_empty_result_is_none() {
        assert_eq!(parse_nominatim("[]").unwrap(), None);
    }

    #[test]
    fn nominatim_garbage_is_parse_error() {
        assert!(matches!(parse_nominatim("{oops"), Err(GeoError::Parse(_))));
    }

    #[test]
    fn overpass_query_contains_each_kind() {
        let q = overpass_query(MOSCOW, 500, &["shop", "amenity=school"]).unwrap();
        assert!(q.contains("node(around:500,55.7558,37.6173)[\"shop\"];"));
        assert!(q.contains("[\"amenity\"=\"school\"]"));
        assert!(q.starts_with("[out:json]"));
    }

    #[test]
    fn overpass_query_rejects_zero_radius() {
        assert!(overpass_query(MOSCOW, 0, &["shop"]).is_err());
        assert!(overpass_query(MOSCOW, 100, &[]).is_err());
    }

    #[test]
    fn overpass_results_sorted_by_distance() {
        let body = r#"{"elements":[
            {"type":"node","id":1,"lat":55.7600,"lon":37.6173,"tags":{"name":"Far"}},
            {"type":"node","id":2,"lat":55.7559,"lon":37.6173,"tags":{"name":"Near","amenity":"school"}},
            {"type":"way","id":3}
        ]}"#;
        let pois = parse_overpass(body, MOSCOW).unwrap();
        assert_eq!(pois.len(), 2);
        assert_eq!(pois[0].name.as_deref(), Some("Near"));
        assert!(pois[0].distance_m < pois[1].distance_m);
    }

    #[test]
    fn haversine_one_degree_latitude() {
        let d = haversine_m(GeoPoint { lat: 0.0, lon: 0.0 }, GeoPoint { lat: 1.0, lon: 0.0 });
        assert!((d - 111_195.0).abs() < 100.0);
    }
}
