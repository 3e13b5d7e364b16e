//! `ArcGIS` `FeatureServer` spatial queries with Esri JSON output.
//!
//! Esri JSON puts feature properties under `attributes` rather than
//! `properties`, and reports failures as `{ "error": { ... } }` with an
//! HTTP 200 status.

use dakstudio_fetch::{FetchError, Url, build_url};
use dakstudio_geography_models::Coordinate;
use dakstudio_neighborhood_models::AttemptOutcome;
use serde_json::Value;

use super::Properties;

const WKID: u32 = 4326;

fn query_url(layer_url: &str, geometry: &Value, geometry_type: &str) -> Result<Url, FetchError> {
    build_url(
        &format!("{}/query", layer_url.trim_end_matches('/')),
        &[
            ("f", "json".to_string()),
            ("where", "1=1".to_string()),
            ("returnGeometry", "false".to_string()),
            ("outFields", "*".to_string()),
            ("geometry", geometry.to_string()),
            ("geometryType", geometry_type.to_string()),
            ("inSR", WKID.to_string()),
            ("spatialRel", "esriSpatialRelIntersects".to_string()),
        ],
    )
}

/// Point-intersection query at `at`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] for an invalid layer URL.
pub fn point_url(layer_url: &str, at: Coordinate) -> Result<Url, FetchError> {
    let geometry = serde_json::json!({
        "x": at.longitude(),
        "y": at.latitude(),
        "spatialReference": { "wkid": WKID },
    });
    query_url(layer_url, &geometry, "esriGeometryPoint")
}

/// Envelope-intersection query padded by `pad_deg` around `at`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] for an invalid layer URL.
pub fn envelope_url(layer_url: &str, at: Coordinate, pad_deg: f64) -> Result<Url, FetchError> {
    let bbox = at.padded(pad_deg);
    let geometry = serde_json::json!({
        "xmin": bbox.min_lon,
        "ymin": bbox.min_lat,
        "xmax": bbox.max_lon,
        "ymax": bbox.max_lat,
        "spatialReference": { "wkid": WKID },
    });
    query_url(layer_url, &geometry, "esriGeometryEnvelope")
}

/// Attributes of the first Esri feature.
///
/// # Errors
///
/// Returns the [`AttemptOutcome`] when there is no usable feature or the
/// service reported an error.
pub fn first_attributes(body: &Value) -> Result<Properties, AttemptOutcome> {
    if let Some(error) = body.get("error") {
        return Err(AttemptOutcome::Malformed {
            message: format!(
                "ArcGIS API error: {}",
                error["message"].as_str().unwrap_or("unknown error")
            ),
        });
    }
    super::first_feature_map(body, "attributes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use dakstudio_fetch::testing::describe;

    fn at() -> Coordinate {
        Coordinate::new(52.08, 4.31).unwrap()
    }

    fn geometry_param(url: &Url) -> Value {
        let raw = url
            .query_pairs()
            .find(|(k, _)| k == "geometry")
            .map(|(_, v)| v.into_owned())
            .unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn point_url_carries_esri_point_geometry() {
        let url = point_url("https://arcgis.example/FeatureServer/0", at()).unwrap();
        let described = describe(&url);
        assert!(described.starts_with("arcgis.example/FeatureServer/0/query?"));
        assert!(described.contains("geometryType=esriGeometryPoint"));
        let geometry = geometry_param(&url);
        assert_eq!(geometry["x"], 4.31);
        assert_eq!(geometry["y"], 52.08);
        assert_eq!(geometry["spatialReference"]["wkid"], 4326);
    }

    #[test]
    fn envelope_url_pads_around_point() {
        let url = envelope_url("https://arcgis.example/FeatureServer/0/", at(), 0.5).unwrap();
        let described = describe(&url);
        assert!(described.starts_with("arcgis.example/FeatureServer/0/query?"));
        assert!(described.contains("geometryType=esriGeometryEnvelope"));
        let geometry = geometry_param(&url);
        assert!((geometry["xmin"].as_f64().unwrap() - 3.81).abs() < 1e-9);
        assert!((geometry["ymax"].as_f64().unwrap() - 52.58).abs() < 1e-9);
    }

    #[test]
    fn extracts_attributes_and_reports_errors() {
        let body = serde_json::json!({
            "features": [{ "attributes": { "GM_NAAM": "'s-Gravenhage" } }]
        });
        assert_eq!(
            first_attributes(&body).unwrap()["GM_NAAM"],
            "'s-Gravenhage"
        );

        let error = serde_json::json!({ "error": { "code": 400, "message": "Invalid layer" } });
        assert_eq!(
            first_attributes(&error),
            Err(AttemptOutcome::Malformed {
                message: "ArcGIS API error: Invalid layer".to_string()
            })
        );

        let geojson_shaped = serde_json::json!({
            "features": [{ "properties": { "GM_NAAM": "x" } }]
        });
        assert_eq!(
            first_attributes(&geojson_shaped),
            Err(AttemptOutcome::NoProperties)
        );
    }
}
