#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood statistics source definitions and result types.
//!
//! Defines the TOML schema for the registries queried by the
//! neighborhood resolver, the [`Strategy`] records the fallback chain is
//! made of, and the normalized [`NeighborhoodStats`] it produces.

use dakstudio_geography_models::BoundingBox;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A neighborhood statistics registry, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodSource {
    /// Unique source identifier (e.g., `"pdok_wijkenbuurten"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this source takes part in the fallback chain.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Execution order; lower values run first.
    pub priority: u32,
    /// Which provenance family a match from this source reports.
    pub family: SourceFamily,
    /// How to query the source.
    pub fetcher: NeighborhoodFetcherConfig,
}

const fn default_true() -> bool {
    true
}

/// Provenance family of a source.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SourceFamily {
    /// The national WFS registry.
    Primary,
    /// Independently hosted feature services.
    Alternate,
}

/// How to query a neighborhood source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NeighborhoodFetcherConfig {
    /// OGC WFS `GetFeature` with `GeoJSON` output. Every type name is
    /// tried with every query shape, type names outermost.
    Wfs {
        /// Service endpoint.
        base_url: String,
        /// Candidate layer names, most likely first.
        type_names: Vec<String>,
        /// Query shapes per layer, in order.
        queries: Vec<WfsQuery>,
        /// Bounding-box padding in degrees.
        pad_deg: f64,
        /// Maximum features per request.
        count: u32,
    },
    /// `ArcGIS` `FeatureServer` layer queried with Esri JSON output.
    Arcgis {
        /// Layer URL (without `/query`).
        url: String,
        /// Query shapes, in order.
        queries: Vec<ArcgisQuery>,
        /// Envelope padding in degrees.
        pad_deg: f64,
    },
}

/// WFS query shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WfsQuery {
    /// `bbox=` around the point.
    Bbox,
    /// `cql_filter=INTERSECTS(geom,POINT(lon lat))`.
    IntersectsPoint,
}

/// `ArcGIS` spatial query shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcgisQuery {
    /// `esriGeometryPoint` intersection.
    Point,
    /// `esriGeometryEnvelope` intersection around the point.
    Envelope,
}

/// One step of the fallback chain: a source plus a concrete query shape.
///
/// Plain data; the resolver turns it into a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    /// Source the step belongs to.
    pub source_id: String,
    /// Provenance reported if this step matches.
    pub family: SourceFamily,
    /// Request shape.
    pub query: StrategyQuery,
}

/// The request a [`Strategy`] issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum StrategyQuery {
    /// WFS `bbox` query on one layer.
    WfsBbox {
        /// Service endpoint.
        base_url: String,
        /// Layer name.
        type_name: String,
        /// Padding in degrees.
        pad_deg: f64,
        /// Maximum features.
        count: u32,
    },
    /// WFS point-intersection query on one layer.
    WfsIntersectsPoint {
        /// Service endpoint.
        base_url: String,
        /// Layer name.
        type_name: String,
        /// Maximum features.
        count: u32,
    },
    /// `ArcGIS` point intersection.
    ArcgisPoint {
        /// Layer URL.
        url: String,
    },
    /// `ArcGIS` envelope intersection.
    ArcgisEnvelope {
        /// Layer URL.
        url: String,
        /// Padding in degrees.
        pad_deg: f64,
    },
}

impl Strategy {
    /// Short human-readable label used in logs and diagnostics.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.query {
            StrategyQuery::WfsBbox { type_name, .. } => {
                format!("{}:{type_name}:bbox", self.source_id)
            }
            StrategyQuery::WfsIntersectsPoint { type_name, .. } => {
                format!("{}:{type_name}:intersects", self.source_id)
            }
            StrategyQuery::ArcgisPoint { .. } => format!("{}:point", self.source_id),
            StrategyQuery::ArcgisEnvelope { .. } => format!("{}:envelope", self.source_id),
        }
    }
}

/// Which registry family satisfied a neighborhood lookup.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StatsSource {
    /// Matched by the primary registry.
    PrimaryRegistry,
    /// Matched by an alternate registry.
    SecondaryRegistry,
    /// Nothing matched.
    #[default]
    None,
}

impl From<SourceFamily> for StatsSource {
    fn from(family: SourceFamily) -> Self {
        match family {
            SourceFamily::Primary => Self::PrimaryRegistry,
            SourceFamily::Alternate => Self::SecondaryRegistry,
        }
    }
}

/// Outcome of a single strategy attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// The first feature had usable properties.
    Matched,
    /// The collection had no features.
    Empty,
    /// The first feature had no properties object.
    NoProperties,
    /// The response was not a feature collection.
    Malformed {
        /// What was wrong.
        message: String,
    },
    /// The request failed after retries.
    Transport {
        /// Error text.
        message: String,
    },
}

/// Diagnostic record of one step of the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyAttempt {
    /// [`Strategy::label`] of the step.
    pub strategy: String,
    /// What happened.
    pub outcome: AttemptOutcome,
}

/// Normalized neighborhood context for a point. Every field may be
/// absent; absence is a valid outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodStats {
    /// Neighborhood (or district) name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood_name: Option<String>,
    /// Municipality name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub municipality_name: Option<String>,
    /// Dwellings per square kilometer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dwelling_density_per_km2: Option<u64>,
    /// Registry code of the neighborhood.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood_code: Option<String>,
    /// Provenance.
    pub source: StatsSource,
    /// Diagnostic note, set when nothing matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Every strategy tried, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<StrategyAttempt>,
}

impl NeighborhoodStats {
    /// Terminal "not found" result: a note and no data fields.
    #[must_use]
    pub fn not_found(note: impl Into<String>, attempts: Vec<StrategyAttempt>) -> Self {
        Self {
            note: Some(note.into()),
            attempts,
            ..Self::default()
        }
    }

    /// `true` if some registry matched.
    #[must_use]
    pub fn is_found(&self) -> bool {
        self.source != StatsSource::None
    }
}

/// Address-object registry used for the local dwelling-density estimate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DensitySource {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// WFS endpoint.
    pub base_url: String,
    /// Candidate layer names; the first returning features wins.
    pub type_names: Vec<String>,
    /// North/south envelope padding in degrees.
    pub lat_pad_deg: f64,
    /// East/west envelope padding in degrees at the equator; scaled by
    /// `cos(latitude)`.
    pub lon_pad_deg: f64,
    /// Maximum features per request.
    pub count: u32,
    /// Property names holding the usage purpose(s), first present wins.
    pub usage_properties: Vec<String>,
    /// Case-insensitive substring marking a residential usage.
    pub residential_marker: String,
}

/// Dwelling count and density in a small envelope around a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalDensity {
    /// Residential address objects found.
    pub dwellings: u64,
    /// Envelope area, rounded to four decimals.
    pub area_km2: f64,
    /// Dwellings per square kilometer (0 for an empty envelope).
    pub density_per_km2: u64,
    /// The envelope searched.
    pub envelope: BoundingBox,
    /// How the figure was obtained.
    pub note: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_maps_to_provenance() {
        assert_eq!(
            StatsSource::from(SourceFamily::Primary),
            StatsSource::PrimaryRegistry
        );
        assert_eq!(
            StatsSource::from(SourceFamily::Alternate),
            StatsSource::SecondaryRegistry
        );
    }

    #[test]
    fn provenance_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_string(&StatsSource::SecondaryRegistry).unwrap(),
            "\"secondary-registry\""
        );
        assert_eq!(StatsSource::PrimaryRegistry.to_string(), "primary-registry");
    }

    #[test]
    fn not_found_carries_only_note() {
        let stats = NeighborhoodStats::not_found("nothing", Vec::new());
        assert!(!stats.is_found());
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json, serde_json::json!({ "source": "none", "note": "nothing" }));
    }

    #[test]
    fn strategy_labels() {
        let strategy = Strategy {
            source_id: "pdok".to_string(),
            family: SourceFamily::Primary,
            query: StrategyQuery::WfsIntersectsPoint {
                base_url: "https://example.org/wfs".to_string(),
                type_name: "cbs:buurten".to_string(),
                count: 5,
            },
        };
        assert_eq!(strategy.label(), "pdok:cbs:buurten:intersects");
    }
}
