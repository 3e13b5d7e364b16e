#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Building geometry and registry lookups.
//!
//! Three independent lookups keyed by a coordinate, each backed by a
//! registry defined in `registries/`:
//!
//! - [`resolve_footprint`]: the building outline from the parcel registry.
//! - [`resolve_height`]: the building height from the 3D registry.
//! - [`resolve_facts`]: construction year and usage from the parcel
//!   registry.
//!
//! plus [`compute_area`] for the outline. The `resolve_*` functions never
//! fail; errors are logged and reported as "unknown".

pub mod area;
pub mod facts;
pub mod footprint;
pub mod height;
pub mod registry;

use dakstudio_fetch::{FetchError, Fetcher};
use dakstudio_geography_models::{BuildingFacts, Coordinate, Outline};
use thiserror::Error;

pub use area::compute_area;

/// Errors from building lookups.
#[derive(Debug, Error)]
pub enum BuildingError {
    /// The request failed after retries, or the body was not JSON.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// The body was JSON but not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The document parsed but did not have the expected shape.
    #[error("Geometry error: {message}")]
    Geometry {
        /// What was wrong.
        message: String,
    },
}

/// Outline of the building at `at`, or `None` if the registry has none.
pub async fn resolve_footprint(fetcher: &Fetcher, at: Coordinate) -> Option<Outline> {
    match footprint::fetch_footprint(fetcher, &registry::parcel_registry(), at).await {
        Ok(outline) => outline,
        Err(e) => {
            log::warn!("Footprint lookup failed: {e}");
            None
        }
    }
}

/// Height in meters of the building at `at`, or `None` if unknown.
pub async fn resolve_height(fetcher: &Fetcher, at: Coordinate) -> Option<f64> {
    match height::fetch_height(fetcher, &registry::height_registry(), at).await {
        Ok(height) => height,
        Err(e) => {
            log::warn!("Height lookup failed: {e}");
            None
        }
    }
}

/// Registry facts for the building at `at`; empty when unknown.
pub async fn resolve_facts(fetcher: &Fetcher, at: Coordinate) -> BuildingFacts {
    match facts::fetch_facts(fetcher, &registry::parcel_registry(), at).await {
        Ok(facts) => facts,
        Err(e) => {
            log::warn!("Building facts lookup failed: {e}");
            BuildingFacts::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use dakstudio_fetch::RetryPolicy;
    use dakstudio_fetch::testing::ScriptedTransport;

    const PAND: &str = r#"{
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[4.0, 52.0], [4.0015, 52.0], [4.0015, 52.001], [4.0, 52.001], [4.0, 52.0]]]
            }
        }]
    }"#;

    fn at() -> Coordinate {
        Coordinate::new(52.0005, 4.00075).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn footprint_survives_transient_failures() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond("service.pdok.nl", 502, "")
                .then_fail("connection reset")
                .then(200, PAND),
        );
        let fetcher = Fetcher::new(
            transport.clone(),
            RetryPolicy::new(3, Duration::from_millis(800)),
        );

        let outline = resolve_footprint(&fetcher, at()).await.unwrap();

        assert_eq!(outline.len(), 4);
        assert_eq!(transport.request_count(), 3);
        assert!(compute_area(&outline) > 0.0);
    }

    #[tokio::test]
    async fn footprint_degrades_to_none() {
        let transport = Arc::new(ScriptedTransport::new().fail("service.pdok.nl", "dns"));
        let fetcher = Fetcher::new(transport.clone(), RetryPolicy::immediate(3));

        assert!(resolve_footprint(&fetcher, at()).await.is_none());
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn height_and_facts_degrade_independently() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond("api.3dbag.nl", 200, "not json")
                .respond(
                    "DWITHIN",
                    200,
                    r#"{"features":[{"properties":{"bouwjaar":1965}}]}"#,
                ),
        );
        let fetcher = Fetcher::new(transport, RetryPolicy::immediate(1));

        assert_eq!(resolve_height(&fetcher, at()).await, None);
        let facts = resolve_facts(&fetcher, at()).await;
        assert_eq!(facts.construction_year, Some(1965));
        assert_eq!(facts.usage, None);
    }

    #[tokio::test]
    async fn height_reads_registry_property() {
        let transport = Arc::new(ScriptedTransport::new().respond(
            "api.3dbag.nl",
            200,
            r#"{"features":[{"properties":{"maxBuildingHeight":"21.7"}}]}"#,
        ));
        let fetcher = Fetcher::new(transport, RetryPolicy::immediate(1));

        assert_eq!(resolve_height(&fetcher, at()).await, Some(21.7));
    }
}
