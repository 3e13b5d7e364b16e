//! PDOK Locatieserver free-text search client.
//!
//! The service answers with a Solr-style envelope
//! (`{"response": {"numFound": .., "docs": [..]}}`); each doc carries its
//! centroid as WKT in `centroide_ll`, e.g. `POINT(4.3113 52.0799)`.
//!
//! See <https://api.pdok.nl/bzk/locatieserver/search/v3_1/ui/>

use dakstudio_fetch::{Fetcher, build_url};
use dakstudio_geography_models::Coordinate;
use regex::Regex;

use crate::{GeocodeError, GeocodedAddress};

/// Searches for `query` and returns the top match, if any.
///
/// # Errors
///
/// Returns [`GeocodeError`] if the request fails after retries or the
/// response is not a search envelope.
pub async fn geocode_freeform(
    fetcher: &Fetcher,
    service_id: &str,
    base_url: &str,
    rows: u32,
    query: &str,
) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let url = build_url(
        base_url,
        &[("q", query.to_string()), ("rows", rows.to_string())],
    )?;
    let body = fetcher.fetch_json(&url).await?;
    parse_response(&body, service_id)
}

/// Parses a search response. An empty result list, or a top doc without
/// a usable centroid, is `Ok(None)`.
///
/// # Errors
///
/// Returns [`GeocodeError::Parse`] if the body has no `response.docs`
/// array.
pub fn parse_response(
    body: &serde_json::Value,
    service_id: &str,
) -> Result<Option<GeocodedAddress>, GeocodeError> {
    let docs = body["response"]["docs"]
        .as_array()
        .ok_or_else(|| GeocodeError::Parse {
            message: "Locatieserver response has no docs array".to_string(),
        })?;

    let Some(first) = docs.first() else {
        return Ok(None);
    };

    let Some(coordinate) = first["centroide_ll"].as_str().and_then(parse_wkt_point) else {
        log::debug!("Top Locatieserver match has no usable centroid");
        return Ok(None);
    };

    Ok(Some(GeocodedAddress {
        coordinate,
        matched_address: first["weergavenaam"].as_str().map(String::from),
        provider: service_id.to_string(),
    }))
}

/// Parses `POINT(<lon> <lat>)` into a coordinate.
#[must_use]
pub fn parse_wkt_point(wkt: &str) -> Option<Coordinate> {
    let re = Regex::new(r"POINT\(([-0-9.]+) ([-0-9.]+)\)").unwrap_or_else(|_| unreachable!());
    let caps = re.captures(wkt)?;
    let lon = caps[1].parse::<f64>().ok()?;
    let lat = caps[2].parse::<f64>().ok()?;
    Coordinate::from_lon_lat(&[lon, lat])
}
