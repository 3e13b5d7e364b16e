#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Address to rooftop feasibility report.
//!
//! Chains the resolvers into the two entry points used by the CLI:
//!
//! 1. [`resolve_building`]: address → coordinate → outline → area →
//!    height → facts, assembled into a [`BuildingRecord`] with defaults
//!    filled in for anything the registries did not know.
//! 2. [`resolve_site`]: the building chain and the neighborhood lookups
//!    run concurrently for the same coordinate, then the benefit
//!    estimate is derived from the building record.

pub mod config;

use dakstudio_fetch::{FetchError, Fetcher};
use dakstudio_geocoder::GeocodeError;
use dakstudio_geography_models::{BuildingRecord, Coordinate, Outline, RoofType};
use dakstudio_neighborhood_models::{LocalDensity, NeighborhoodStats};
use dakstudio_potential::PotentialError;
use dakstudio_potential_models::{BenefitEstimate, RooftopConfig};
use serde::Serialize;
use thiserror::Error;

pub use config::PipelineConfig;

/// Identifier given to records assembled from the open registries.
pub const AUTO_RECORD_ID: &str = "bag-auto";

/// Errors that stop the pipeline. Everything else degrades to defaults.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Address input was rejected.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    /// No provider could place the address.
    #[error("Address not found: {address}")]
    AddressNotFound {
        /// The address as given.
        address: String,
    },

    /// The rooftop configuration was rejected.
    #[error(transparent)]
    Potential(#[from] PotentialError),

    /// The HTTP client could not be built.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Reading a config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A config file did not parse.
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A configuration value was invalid.
    #[error("Config error: {message}")]
    Config {
        /// What was wrong.
        message: String,
    },
}

/// Everything known about an address, plus the derived estimate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteReport {
    /// The resolved building.
    pub building: BuildingRecord,
    /// Neighborhood statistics; `None` when the lookup is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<NeighborhoodStats>,
    /// Local dwelling density; `None` when the estimate is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_density: Option<LocalDensity>,
    /// Benefit estimate for the requested configuration.
    pub estimate: BenefitEstimate,
}

/// Geocodes `address`.
///
/// # Errors
///
/// Returns [`PipelineError::Geocode`] for an empty address and
/// [`PipelineError::AddressNotFound`] when no provider matched.
pub async fn locate(fetcher: &Fetcher, address: &str) -> Result<Coordinate, PipelineError> {
    dakstudio_geocoder::resolve_address(fetcher, address)
        .await?
        .ok_or_else(|| PipelineError::AddressNotFound {
            address: address.to_string(),
        })
}

/// Resolves the building for `address`.
///
/// # Errors
///
/// Fails only when the address cannot be placed; see [`locate`].
pub async fn resolve_building(
    fetcher: &Fetcher,
    config: &PipelineConfig,
    address: &str,
) -> Result<BuildingRecord, PipelineError> {
    let at = locate(fetcher, address).await?;
    Ok(resolve_building_at(fetcher, config, address, at).await)
}

/// Resolves the building at an already geocoded point.
///
/// Lookups run one after another; each one that comes back empty is
/// replaced by its configured default and flagged as unmeasured.
pub async fn resolve_building_at(
    fetcher: &Fetcher,
    config: &PipelineConfig,
    address: &str,
    at: Coordinate,
) -> BuildingRecord {
    let outline = dakstudio_building::resolve_footprint(fetcher, at)
        .await
        .filter(|outline| !outline.is_placeholder());
    let height = dakstudio_building::resolve_height(fetcher, at).await;
    let facts = dakstudio_building::resolve_facts(fetcher, at).await;

    let (footprint, footprint_area_m2, footprint_measured) = match outline {
        Some(outline) => {
            let area = dakstudio_building::compute_area(&outline).round();
            (outline, area, true)
        }
        None => {
            log::info!("No outline for {address:?}; using default footprint area");
            (
                Outline::placeholder(at),
                config.default_footprint_area_m2,
                false,
            )
        }
    };

    BuildingRecord {
        id: AUTO_RECORD_ID.to_string(),
        address: address.to_string(),
        coordinate: at,
        footprint,
        footprint_area_m2,
        footprint_measured,
        height_m: height.unwrap_or(config.default_height_m),
        height_measured: height.is_some(),
        building_type: facts.building_type(),
        roof_type: RoofType::Flat,
        construction_year: facts.construction_year,
    }
}

/// Resolves everything for `address` and estimates the rooftop addition.
///
/// # Errors
///
/// Returns [`PipelineError::Potential`] for an invalid rooftop
/// configuration, before any request is made, and the errors of
/// [`locate`].
pub async fn resolve_site(
    fetcher: &Fetcher,
    config: &PipelineConfig,
    address: &str,
    rooftop: &RooftopConfig,
) -> Result<SiteReport, PipelineError> {
    dakstudio_potential::validate_config(rooftop)?;

    let at = locate(fetcher, address).await?;
    let neighborhood_fetcher = fetcher.with_policy(config.neighborhood_policy());

    let (building, neighborhood, local_density) = futures::join!(
        resolve_building_at(fetcher, config, address, at),
        async {
            if config.resolve_neighborhood {
                Some(dakstudio_neighborhood::resolve_neighborhood(&neighborhood_fetcher, at).await)
            } else {
                None
            }
        },
        async {
            if config.estimate_local_density {
                let source = dakstudio_neighborhood::registry::density_source();
                Some(
                    dakstudio_neighborhood::estimate_local_density(
                        &neighborhood_fetcher,
                        &source,
                        at,
                    )
                    .await,
                )
            } else {
                None
            }
        },
    );

    let estimate =
        dakstudio_potential::compute_benefits(Some(building.footprint_area_m2), rooftop);

    Ok(SiteReport {
        building,
        neighborhood,
        local_density,
        estimate,
    })
}
