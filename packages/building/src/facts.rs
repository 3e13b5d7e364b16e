//! Construction year and usage lookup for the building at a point.

use dakstudio_fetch::{Fetcher, Url, build_url};
use dakstudio_geography_models::{BuildingFacts, Coordinate};
use serde_json::Value;

use crate::BuildingError;
use crate::registry::ParcelRegistry;

/// Facts query URL: buildings within the registry's radius of `at`.
///
/// # Errors
///
/// Returns [`BuildingError::Fetch`] if the registry URL is invalid.
pub fn facts_url(registry: &ParcelRegistry, at: Coordinate) -> Result<Url, BuildingError> {
    Ok(build_url(
        &registry.base_url,
        &[
            ("service", "WFS".to_string()),
            ("request", "GetFeature".to_string()),
            ("typeName", registry.type_name.clone()),
            ("srsName", "EPSG:4326".to_string()),
            ("outputFormat", "application/json".to_string()),
            (
                "cql_filter",
                format!(
                    "DWITHIN(geom,POINT({} {}),{},meters)",
                    at.longitude(), at.latitude(), registry.facts_radius_m
                ),
            ),
        ],
    )?)
}

/// Fetches registry facts for the building nearest `at`.
///
/// # Errors
///
/// Returns [`BuildingError`] if the request fails after retries or the
/// body is not JSON.
pub async fn fetch_facts(
    fetcher: &Fetcher,
    registry: &ParcelRegistry,
    at: Coordinate,
) -> Result<BuildingFacts, BuildingError> {
    let url = facts_url(registry, at)?;
    let body = fetcher.fetch_json(&url).await?;
    Ok(parse_facts(&body, registry))
}

/// Reads construction year and usage from the first feature.
#[must_use]
pub fn parse_facts(body: &Value, registry: &ParcelRegistry) -> BuildingFacts {
    let Some(props) = body
        .get("features")
        .and_then(|f| f.get(0))
        .and_then(|f| f.get("properties"))
    else {
        return BuildingFacts::default();
    };

    BuildingFacts {
        construction_year: first_present(props, &registry.year_properties).and_then(as_year),
        usage: first_present(props, &registry.usage_properties).and_then(as_usage),
    }
}

fn first_present<'a>(props: &'a Value, aliases: &[String]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|key| props.get(key).filter(|v| !v.is_null()))
}

fn as_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

fn as_usage(value: &Value) -> Option<String> {
    let usage = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        _ => return None,
    };
    (!usage.is_empty()).then_some(usage)
}
