//! Compile-time registry of neighborhood statistics sources.
//!
//! Source definitions live under `sources/` and are baked in with
//! `include_str!`. A new registry is one TOML file plus one line in
//! `SOURCE_TOMLS`; [`crate::strategy::plan`] slots it into the chain by
//! priority.

use dakstudio_neighborhood_models::{DensitySource, NeighborhoodSource};

/// Number of registered neighborhood sources. Enforced by a test.
#[cfg(test)]
const EXPECTED_SOURCE_COUNT: usize = 3;

/// `(file stem, contents)` of every neighborhood source.
const SOURCE_TOMLS: &[(&str, &str)] = &[
    (
        "pdok_wijkenbuurten",
        include_str!("../sources/pdok_wijkenbuurten.toml"),
    ),
    (
        "cbs_buurten_2023",
        include_str!("../sources/cbs_buurten_2023.toml"),
    ),
    (
        "cbs_buurten_2022",
        include_str!("../sources/cbs_buurten_2022.toml"),
    ),
];

const DENSITY_TOML: &str = include_str!("../sources/density/bag_verblijfsobject.toml");

/// Every neighborhood source, disabled ones included.
///
/// # Panics
///
/// Panics when an embedded file does not deserialize. The files are
/// fixed at build time and every one is loaded by the tests below.
#[must_use]
pub fn all_sources() -> Vec<NeighborhoodSource> {
    SOURCE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str)
                .unwrap_or_else(|e| panic!("Invalid neighborhood source '{name}': {e}"))
        })
        .collect()
}

/// Returns only enabled sources, sorted by priority (ascending).
#[must_use]
pub fn enabled_sources() -> Vec<NeighborhoodSource> {
    let mut enabled = all_sources();
    enabled.retain(|source| source.enabled);
    enabled.sort_by_key(|source| source.priority);
    enabled
}

/// Returns the address-object registry used for local density estimates.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse.
#[must_use]
pub fn density_source() -> DensitySource {
    toml::de::from_str(DENSITY_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse density source: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dakstudio_neighborhood_models::{NeighborhoodFetcherConfig, SourceFamily};
    use std::collections::HashSet;

    #[test]
    fn every_embedded_source_parses() {
        assert_eq!(
            all_sources().len(),
            EXPECTED_SOURCE_COUNT,
            "sources/ and EXPECTED_SOURCE_COUNT disagree"
        );
    }

    #[test]
    fn ids_do_not_collide() {
        let sources = all_sources();
        let ids: HashSet<&str> = sources.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), sources.len());
    }

    #[test]
    fn sources_are_queryable() {
        for source in &all_sources() {
            assert!(!source.id.is_empty());
            assert!(!source.name.is_empty(), "{} is unnamed", source.id);
            match &source.fetcher {
                NeighborhoodFetcherConfig::Wfs {
                    base_url,
                    type_names,
                    queries,
                    ..
                } => {
                    assert!(!base_url.is_empty(), "Source {} has empty base_url", source.id);
                    assert!(!type_names.is_empty(), "Source {} has no layers", source.id);
                    assert!(!queries.is_empty(), "Source {} has no queries", source.id);
                }
                NeighborhoodFetcherConfig::Arcgis { url, queries, .. } => {
                    assert!(!url.is_empty(), "Source {} has empty url", source.id);
                    assert!(!queries.is_empty(), "Source {} has no queries", source.id);
                }
            }
        }
    }

    #[test]
    fn primary_registry_runs_first() {
        let sources = enabled_sources();
        for window in sources.windows(2) {
            assert!(window[0].priority <= window[1].priority);
        }
        assert_eq!(sources[0].family, SourceFamily::Primary);
        assert!(
            sources[1..]
                .iter()
                .all(|s| s.family == SourceFamily::Alternate)
        );
    }

    #[test]
    fn loads_density_source() {
        let source = density_source();
        assert_eq!(source.type_names.len(), 2);
        assert!(source.count > 0);
        assert_eq!(source.residential_marker, "woon");
    }
}
