#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood identity and dwelling density lookup.
//!
//! Resolves a coordinate to the neighborhood it lies in by walking an
//! ordered chain of query strategies across several registries that
//! disagree on layer names, query dialects and property naming. Sources
//! are defined as TOML files embedded at compile time; [`strategy::plan`]
//! expands them into the chain and [`normalize`] maps whatever properties
//! the matching registry returns onto [`NeighborhoodStats`].
//!
//! Nothing here fails: a coordinate no registry knows about resolves to a
//! [`NeighborhoodStats`] carrying only a note and the attempt log.

pub mod fetchers;
pub mod local_density;
pub mod normalize;
pub mod registry;
pub mod strategy;

use dakstudio_fetch::Fetcher;
use dakstudio_geography_models::Coordinate;
use dakstudio_neighborhood_models::{
    AttemptOutcome, NeighborhoodStats, Strategy, StrategyAttempt,
};

pub use local_density::estimate_local_density;

const NOT_FOUND_NOTE: &str = "No neighborhood found in any registry for this location";

/// Resolves neighborhood statistics for `at` using the embedded registry.
pub async fn resolve_neighborhood(fetcher: &Fetcher, at: Coordinate) -> NeighborhoodStats {
    let strategies = strategy::plan(&registry::enabled_sources());
    resolve_with(fetcher, &strategies, at).await
}

/// Walks `strategies` in order and stops at the first one returning a
/// feature with properties.
///
/// Later strategies are never requested once one matches.
pub async fn resolve_with(
    fetcher: &Fetcher,
    strategies: &[Strategy],
    at: Coordinate,
) -> NeighborhoodStats {
    let mut attempts = Vec::with_capacity(strategies.len());

    for strategy in strategies {
        let label = strategy.label();

        match fetchers::try_strategy(fetcher, strategy, at).await {
            Ok(props) => {
                log::info!("Neighborhood matched via {label}");
                attempts.push(StrategyAttempt {
                    strategy: label,
                    outcome: AttemptOutcome::Matched,
                });
                return NeighborhoodStats {
                    source: strategy.family.into(),
                    attempts,
                    ..normalize::normalize_properties(&props)
                };
            }
            Err(outcome) => {
                match &outcome {
                    AttemptOutcome::Transport { message } => {
                        log::warn!("Neighborhood strategy {label} failed: {message}");
                    }
                    other => log::debug!("Neighborhood strategy {label}: {other:?}"),
                }
                attempts.push(StrategyAttempt {
                    strategy: label,
                    outcome,
                });
            }
        }
    }

    log::info!(
        "No neighborhood for ({}, {}) after {} strategies",
        at.latitude(),
        at.longitude(),
        attempts.len()
    );
    NeighborhoodStats::not_found(NOT_FOUND_NOTE, attempts)
}
