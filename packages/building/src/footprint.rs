//! Building outline lookup.
//!
//! Queries the parcel registry for buildings intersecting a small box
//! around the point and takes the first feature's exterior ring.

use dakstudio_fetch::{Fetcher, Url, build_url};
use dakstudio_geography_models::{Coordinate, Outline};
use geojson::{GeoJson, Value};

use crate::BuildingError;
use crate::registry::ParcelRegistry;

const CRS: &str = "EPSG:4326";

/// Footprint query URL for `at`.
///
/// # Errors
///
/// Returns [`BuildingError::Fetch`] if the registry URL is invalid.
pub fn footprint_url(registry: &ParcelRegistry, at: Coordinate) -> Result<Url, BuildingError> {
    Ok(build_url(
        &registry.base_url,
        &[
            ("service", "WFS".to_string()),
            ("request", "GetFeature".to_string()),
            ("version", registry.wfs_version.clone()),
            ("typeName", registry.type_name.clone()),
            ("count", "1".to_string()),
            ("outputFormat", "application/json".to_string()),
            ("srsName", CRS.to_string()),
            ("bbox", at.padded(registry.pad_deg).to_wfs_param(CRS)),
        ],
    )?)
}

/// Fetches the outline of the building at `at`.
///
/// # Errors
///
/// Returns [`BuildingError`] if the request fails after retries or the
/// response is not a feature collection.
pub async fn fetch_footprint(
    fetcher: &Fetcher,
    registry: &ParcelRegistry,
    at: Coordinate,
) -> Result<Option<Outline>, BuildingError> {
    let url = footprint_url(registry, at)?;
    let body = fetcher.fetch(&url).await?;
    parse_footprint(&body)
}

/// Extracts the first feature's exterior ring from a `GeoJSON` body.
///
/// A `Polygon` contributes its first ring, a `MultiPolygon` the first ring
/// of its first part. No features, a missing geometry or any other
/// geometry type is `Ok(None)`.
///
/// # Errors
///
/// Returns [`BuildingError`] if the body is not a `GeoJSON` feature
/// collection.
pub fn parse_footprint(body: &str) -> Result<Option<Outline>, BuildingError> {
    let GeoJson::FeatureCollection(collection) = body.parse::<GeoJson>()? else {
        return Err(BuildingError::Geometry {
            message: "Footprint response is not a FeatureCollection".to_string(),
        });
    };

    let Some(geometry) = collection
        .features
        .into_iter()
        .next()
        .and_then(|feature| feature.geometry)
    else {
        return Ok(None);
    };

    let ring = match geometry.value {
        Value::Polygon(rings) => rings.into_iter().next(),
        Value::MultiPolygon(polygons) => polygons
            .into_iter()
            .next()
            .and_then(|rings| rings.into_iter().next()),
        _ => {
            log::debug!("Footprint feature is not a (multi)polygon");
            None
        }
    };

    Ok(ring.and_then(|ring| Outline::from_lon_lat_ring(&ring)))
}
