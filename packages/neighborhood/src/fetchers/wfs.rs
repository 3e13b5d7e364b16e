//! OGC WFS `GetFeature` queries with `GeoJSON` output.

use dakstudio_fetch::{FetchError, Url, build_url};
use dakstudio_geography_models::{BoundingBox, Coordinate};
use dakstudio_neighborhood_models::AttemptOutcome;
use serde_json::Value;

use super::Properties;

const CRS: &str = "EPSG:4326";

fn base_params(type_name: &str) -> Vec<(&'static str, String)> {
    vec![
        ("service", "WFS".to_string()),
        ("request", "GetFeature".to_string()),
        ("typeName", type_name.to_string()),
        ("srsName", CRS.to_string()),
    ]
}

/// Bounding-box query padded by `pad_deg` around `at`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] for an invalid `base_url`.
pub fn bbox_url(
    base_url: &str,
    type_name: &str,
    at: Coordinate,
    pad_deg: f64,
    count: u32,
) -> Result<Url, FetchError> {
    envelope_url(base_url, type_name, &at.padded(pad_deg), count)
}

/// Bounding-box query over an explicit envelope.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] for an invalid `base_url`.
pub fn envelope_url(
    base_url: &str,
    type_name: &str,
    envelope: &BoundingBox,
    count: u32,
) -> Result<Url, FetchError> {
    let mut params = base_params(type_name);
    params.push(("bbox", envelope.to_wfs_param(CRS)));
    params.push(("count", count.to_string()));
    params.push(("outputFormat", "application/json".to_string()));
    build_url(base_url, &params)
}

/// `INTERSECTS(geom,POINT(lon lat))` CQL query.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] for an invalid `base_url`.
pub fn intersects_url(
    base_url: &str,
    type_name: &str,
    at: Coordinate,
    count: u32,
) -> Result<Url, FetchError> {
    let mut params = base_params(type_name);
    params.push((
        "cql_filter",
        format!("INTERSECTS(geom,POINT({} {}))", at.longitude(), at.latitude()),
    ));
    params.push(("count", count.to_string()));
    params.push(("outputFormat", "application/json".to_string()));
    build_url(base_url, &params)
}

/// Properties of the first `GeoJSON` feature.
///
/// # Errors
///
/// Returns the [`AttemptOutcome`] when there is no usable feature.
pub fn first_properties(body: &Value) -> Result<Properties, AttemptOutcome> {
    super::first_feature_map(body, "properties")
}
