//! Building height lookup against the 3D registry.

use dakstudio_fetch::{Fetcher, Url, build_url};
use dakstudio_geography_models::Coordinate;
use serde_json::Value;

use crate::BuildingError;
use crate::registry::HeightRegistry;

/// Height query URL for `at`.
///
/// # Errors
///
/// Returns [`BuildingError::Fetch`] if the registry URL is invalid.
pub fn height_url(registry: &HeightRegistry, at: Coordinate) -> Result<Url, BuildingError> {
    Ok(build_url(
        &registry.base_url,
        &[
            ("lat", at.latitude().to_string()),
            ("lon", at.longitude().to_string()),
        ],
    )?)
}

/// Fetches the height of the building at `at`.
///
/// # Errors
///
/// Returns [`BuildingError`] if the request fails after retries or the
/// body is not JSON.
pub async fn fetch_height(
    fetcher: &Fetcher,
    registry: &HeightRegistry,
    at: Coordinate,
) -> Result<Option<f64>, BuildingError> {
    let url = height_url(registry, at)?;
    let body = fetcher.fetch_json(&url).await?;
    Ok(parse_height(&body, &registry.height_properties))
}

/// Reads the first present height alias from the first feature.
///
/// The value may be a number or numeric text. Non-positive and
/// unparseable heights are treated as unknown; a present but unusable
/// alias does not fall through to the next one.
#[must_use]
pub fn parse_height(body: &Value, aliases: &[String]) -> Option<f64> {
    let props = body.get("features")?.get(0)?.get("properties")?;
    let raw = aliases
        .iter()
        .find_map(|key| props.get(key).filter(|v| !v.is_null()))?;

    let height = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    (height.is_finite() && height > 0.0).then_some(height)
}
