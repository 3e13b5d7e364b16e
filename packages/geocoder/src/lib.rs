#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address to coordinate resolution.
//!
//! Converts a free-text address to a WGS84 point using the providers
//! configured via TOML files in `services/`, tried in priority order.
//! Currently a single provider is registered:
//!
//! 1. **PDOK Locatieserver** (priority 1): free, no API key, returns the
//!    best match's centroid as WKT.
//!
//! A provider that fails (network, malformed response) is logged and
//! skipped; only an empty address is an error.

pub mod locatieserver;
pub mod service_registry;

use dakstudio_fetch::{FetchError, Fetcher};
use dakstudio_geography_models::Coordinate;
use serde::Serialize;
use thiserror::Error;

use crate::service_registry::ProviderConfig;

/// A geocoding result with coordinates and metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeocodedAddress {
    /// Resolved point.
    pub coordinate: Coordinate,
    /// The canonical address returned by the provider.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_address: Option<String>,
    /// ID of the service that resolved the address.
    pub provider: String,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// The address was empty or whitespace.
    #[error("Address must not be empty")]
    EmptyAddress,

    /// The request failed after retries.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },
}

/// Resolves `address` to its best match across the enabled providers.
///
/// # Errors
///
/// Returns [`GeocodeError::EmptyAddress`] for a blank address. Provider
/// failures are not errors; they degrade to `Ok(None)`.
pub async fn geocode(
    fetcher: &Fetcher,
    address: &str,
) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let query = address.trim();
    if query.is_empty() {
        return Err(GeocodeError::EmptyAddress);
    }

    for service in service_registry::enabled_services() {
        let result = match &service.provider {
            ProviderConfig::Locatieserver { base_url, rows } => {
                locatieserver::geocode_freeform(fetcher, &service.id, base_url, *rows, query).await
            }
        };

        match result {
            Ok(Some(found)) => {
                log::debug!("Geocoded {query:?} via {}", service.id);
                return Ok(Some(found));
            }
            Ok(None) => log::debug!("{}: no match for {query:?}", service.id),
            Err(e) => log::warn!("{} failed for {query:?}: {e}", service.id),
        }
    }

    Ok(None)
}

/// Resolves `address` to a coordinate, or `None` if no provider matched.
///
/// # Errors
///
/// Returns [`GeocodeError::EmptyAddress`] for a blank address.
pub async fn resolve_address(
    fetcher: &Fetcher,
    address: &str,
) -> Result<Option<Coordinate>, GeocodeError> {
    Ok(geocode(fetcher, address)
        .await?
        .map(|found| found.coordinate))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use dakstudio_fetch::RetryPolicy;
    use dakstudio_fetch::testing::ScriptedTransport;

    const FOUND: &str = r#"{"response":{"numFound":1,"docs":[{"weergavenaam":"Oude Delft 1, Delft","centroide_ll":"POINT(4.3571 52.0116)"}]}}"#;

    fn fetcher(transport: &Arc<ScriptedTransport>, attempts: u32) -> Fetcher {
        Fetcher::new(transport.clone(), RetryPolicy::immediate(attempts))
    }

    #[tokio::test]
    async fn resolves_and_swaps_axis_order() {
        let transport = Arc::new(ScriptedTransport::new().respond(
            "api.pdok.nl/bzk/locatieserver",
            200,
            FOUND,
        ));
        let at = resolve_address(&fetcher(&transport, 3), "Oude Delft 1, Delft")
            .await
            .unwrap()
            .unwrap();
        assert!((at.latitude() - 52.0116).abs() < 1e-9);
        assert!((at.longitude() - 4.3571).abs() < 1e-9);
        assert_eq!(
            transport.requests(),
            vec!["api.pdok.nl/bzk/locatieserver/search/v3_1/free?q=Oude Delft 1, Delft&rows=1"]
        );
    }

    #[tokio::test]
    async fn empty_address_is_rejected_without_requests() {
        let transport = Arc::new(ScriptedTransport::new());
        let err = resolve_address(&fetcher(&transport, 3), "   ")
            .await
            .unwrap_err();
        assert!(matches!(err, GeocodeError::EmptyAddress));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn no_docs_resolves_to_none() {
        let transport = Arc::new(ScriptedTransport::new().respond(
            "locatieserver",
            200,
            r#"{"response":{"numFound":0,"docs":[]}}"#,
        ));
        let result = resolve_address(&fetcher(&transport, 3), "Nergensstraat 99")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn transport_failure_degrades_to_none() {
        let transport = Arc::new(ScriptedTransport::new().fail("locatieserver", "timed out"));
        let result = resolve_address(&fetcher(&transport, 2), "Markt 1, Delft")
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn retries_transient_failure_then_resolves() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond("locatieserver", 503, "")
                .then(200, FOUND),
        );
        let found = geocode(&fetcher(&transport, 3), "Oude Delft 1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.provider, "pdok_locatieserver");
        assert_eq!(transport.request_count(), 2);
    }
}
