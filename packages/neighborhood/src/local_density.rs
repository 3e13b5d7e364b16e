//! Local dwelling-density estimate from address objects.
//!
//! Counts residential address objects in a small envelope around the
//! point and divides by the envelope's approximate area. Independent of
//! the neighborhood registries, so it still yields a figure when those
//! have no statistics for the area.

use dakstudio_fetch::Fetcher;
use dakstudio_geography_models::{BoundingBox, Coordinate};
use dakstudio_neighborhood_models::{DensitySource, LocalDensity};
use serde_json::Value;

use crate::fetchers::wfs;

const METERS_PER_DEGREE: f64 = 111_320.0;
const SQUARE_METERS_PER_KM2: f64 = 1_000_000.0;

const NOTE: &str = "Address-object approximation (residential units in a local envelope)";

/// Counts residential address objects around `at`.
///
/// Layers are tried in order; the first returning any features is used.
/// Failed or empty layers are skipped, and when none answers the result
/// reports zero dwellings.
pub async fn estimate_local_density(
    fetcher: &Fetcher,
    source: &DensitySource,
    at: Coordinate,
) -> LocalDensity {
    let envelope = envelope_for(source, at);
    let features = first_features(fetcher, source, &envelope).await;

    let dwellings = features
        .iter()
        .filter(|feature| is_residential(feature, source))
        .count() as u64;

    let area = envelope_area_km2(&envelope, at.latitude());
    let density_per_km2 = density(dwellings, area);

    log::debug!(
        "Local density around ({}, {}): {dwellings} dwellings in {area:.4} km2",
        at.latitude(),
        at.longitude()
    );

    LocalDensity {
        dwellings,
        area_km2: round4(area),
        density_per_km2,
        envelope,
        note: NOTE.to_string(),
    }
}

/// Envelope of `lat_pad_deg` north/south and `lon_pad_deg * cos(lat)`
/// east/west.
#[must_use]
pub fn envelope_for(source: &DensitySource, at: Coordinate) -> BoundingBox {
    let lon_pad = source.lon_pad_deg * at.latitude().to_radians().cos();
    at.envelope(source.lat_pad_deg, lon_pad)
}

/// Approximate envelope area with longitude degrees scaled by
/// `cos(latitude)`.
#[must_use]
pub fn envelope_area_km2(envelope: &BoundingBox, latitude: f64) -> f64 {
    let width_m = envelope.width_deg() * METERS_PER_DEGREE * latitude.to_radians().cos();
    let height_m = envelope.height_deg() * METERS_PER_DEGREE;
    width_m * height_m / SQUARE_METERS_PER_KM2
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn density(dwellings: u64, area_km2: f64) -> u64 {
    if area_km2 > 0.0 {
        (dwellings as f64 / area_km2).round() as u64
    } else {
        0
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

async fn first_features(
    fetcher: &Fetcher,
    source: &DensitySource,
    envelope: &BoundingBox,
) -> Vec<Value> {
    for type_name in &source.type_names {
        let url = match wfs::envelope_url(&source.base_url, type_name, envelope, source.count) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("Density source {}: {e}", source.id);
                return Vec::new();
            }
        };

        match fetcher.fetch_json(&url).await {
            Ok(body) => {
                let features = body
                    .get("features")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default();
                if !features.is_empty() {
                    return features;
                }
                log::debug!("Density layer {type_name}: no features");
            }
            Err(e) => log::warn!("Density layer {type_name} failed: {e}"),
        }
    }
    Vec::new()
}

/// `true` if the feature's first present usage property mentions the
/// residential marker. The property may be a string or an array.
fn is_residential(feature: &Value, source: &DensitySource) -> bool {
    let Some(props) = feature.get("properties") else {
        return false;
    };
    let Some(usage) = source
        .usage_properties
        .iter()
        .find_map(|key| props.get(key).filter(|v| !v.is_null()))
    else {
        return false;
    };

    let marker = source.residential_marker.to_lowercase();
    let mentions = |value: &Value| {
        let text = match value {
            Value::String(s) => s.to_lowercase(),
            other => other.to_string().to_lowercase(),
        };
        text.contains(&marker)
    };

    match usage {
        Value::Array(items) => items.iter().any(mentions),
        other => mentions(other),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::registry;
    use dakstudio_fetch::RetryPolicy;
    use dakstudio_fetch::testing::ScriptedTransport;

    fn collection(usages: &[Value]) -> String {
        let features: Vec<Value> = usages
            .iter()
            .map(|usage| {
                serde_json::json!({
                    "type": "Feature",
                    "geometry": null,
                    "properties": { "gebruiksdoel": usage },
                })
            })
            .collect();
        serde_json::json!({ "type": "FeatureCollection", "features": features }).to_string()
    }

    fn equator() -> Coordinate {
        Coordinate::new(0.0, 5.0).unwrap()
    }

    #[test]
    fn envelope_scales_longitude_padding() {
        let source = registry::density_source();
        let at = Coordinate::new(60.0, 5.0).unwrap();
        let envelope = envelope_for(&source, at);
        assert!((envelope.height_deg() - 0.01).abs() < 1e-12);
        assert!((envelope.width_deg() - 0.008).abs() < 1e-9);
    }

    #[test]
    fn equator_envelope_area() {
        let source = registry::density_source();
        let area = envelope_area_km2(&envelope_for(&source, equator()), 0.0);
        assert!((area - 1.982_742_784).abs() < 1e-6);
        assert!((round4(area) - 1.9827).abs() < 1e-12);
    }

    #[tokio::test]
    async fn counts_residential_objects_in_first_non_empty_layer() {
        let body = collection(&[
            Value::from("woonfunctie"),
            Value::from("Woonfunctie"),
            serde_json::json!(["kantoorfunctie", "woonfunctie"]),
            Value::from("winkelfunctie"),
            Value::Null,
        ]);
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(
                    "typeName=bag:verblijfsobject&",
                    200,
                    r#"{"type":"FeatureCollection","features":[]}"#,
                )
                .respond("typeName=bag:verblijfsobjecten&", 200, &body),
        );
        let fetcher = Fetcher::new(transport.clone(), RetryPolicy::immediate(1));

        let result =
            estimate_local_density(&fetcher, &registry::density_source(), equator()).await;

        assert_eq!(result.dwellings, 3);
        assert!((result.area_km2 - 1.9827).abs() < 1e-12);
        assert_eq!(result.density_per_km2, 2);
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn reports_zero_when_every_layer_fails() {
        let transport = Arc::new(ScriptedTransport::new().fail("bag", "connection reset"));
        let fetcher = Fetcher::new(transport.clone(), RetryPolicy::immediate(1));

        let result =
            estimate_local_density(&fetcher, &registry::density_source(), equator()).await;

        assert_eq!(result.dwellings, 0);
        assert_eq!(result.density_per_km2, 0);
        assert!(result.area_km2 > 0.0);
        assert_eq!(transport.request_count(), 2);
    }

    #[test]
    fn falls_back_to_plural_usage_property() {
        let source = registry::density_source();
        let feature = serde_json::json!({
            "properties": { "gebruiksdoelen": ["woonfunctie"] }
        });
        assert!(is_residential(&feature, &source));
        assert!(!is_residential(&serde_json::json!({}), &source));
    }

    #[test]
    fn zero_area_gives_zero_density() {
        assert_eq!(density(10, 0.0), 0);
        assert_eq!(density(10, 1.982_742_784), 5);
    }
}
