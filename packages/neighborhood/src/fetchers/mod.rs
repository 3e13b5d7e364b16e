//! Request building and response extraction per endpoint type.
//!
//! Each fetcher turns a [`Strategy`] into a URL and pulls the first
//! feature's property map out of the response. Anything short of a
//! property map is reported as an [`AttemptOutcome`] so the chain can
//! move on.

pub mod arcgis;
pub mod wfs;

use dakstudio_fetch::{FetchError, Fetcher, Url};
use dakstudio_geography_models::Coordinate;
use dakstudio_neighborhood_models::{AttemptOutcome, Strategy, StrategyQuery};
use serde_json::{Map, Value};

/// Property map of a matched feature.
pub type Properties = Map<String, Value>;

/// Builds the request URL for a strategy.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if the configured endpoint is not
/// a valid URL.
pub fn request_url(strategy: &Strategy, at: Coordinate) -> Result<Url, FetchError> {
    match &strategy.query {
        StrategyQuery::WfsBbox {
            base_url,
            type_name,
            pad_deg,
            count,
        } => wfs::bbox_url(base_url, type_name, at, *pad_deg, *count),
        StrategyQuery::WfsIntersectsPoint {
            base_url,
            type_name,
            count,
        } => wfs::intersects_url(base_url, type_name, at, *count),
        StrategyQuery::ArcgisPoint { url } => arcgis::point_url(url, at),
        StrategyQuery::ArcgisEnvelope { url, pad_deg } => arcgis::envelope_url(url, at, *pad_deg),
    }
}

/// Runs one strategy and returns the first feature's properties.
///
/// # Errors
///
/// Returns the [`AttemptOutcome`] describing why the step did not match.
pub async fn try_strategy(
    fetcher: &Fetcher,
    strategy: &Strategy,
    at: Coordinate,
) -> Result<Properties, AttemptOutcome> {
    let url = request_url(strategy, at).map_err(|e| AttemptOutcome::Malformed {
        message: e.to_string(),
    })?;

    let body = fetcher.fetch_json(&url).await.map_err(|e| match e {
        FetchError::Json(_) => AttemptOutcome::Malformed {
            message: e.to_string(),
        },
        other => AttemptOutcome::Transport {
            message: other.to_string(),
        },
    })?;

    match &strategy.query {
        StrategyQuery::WfsBbox { .. } | StrategyQuery::WfsIntersectsPoint { .. } => {
            wfs::first_properties(&body)
        }
        StrategyQuery::ArcgisPoint { .. } | StrategyQuery::ArcgisEnvelope { .. } => {
            arcgis::first_attributes(&body)
        }
    }
}

/// Shared extraction: `features[0][key]` as an object.
fn first_feature_map(body: &Value, key: &str) -> Result<Properties, AttemptOutcome> {
    let features = body
        .get("features")
        .and_then(Value::as_array)
        .ok_or_else(|| AttemptOutcome::Malformed {
            message: "No features array in response".to_string(),
        })?;

    let first = features.first().ok_or(AttemptOutcome::Empty)?;

    first
        .get(key)
        .and_then(Value::as_object)
        .cloned()
        .ok_or(AttemptOutcome::NoProperties)
}
