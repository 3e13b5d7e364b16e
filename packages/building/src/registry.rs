//! Compile-time building registry definitions.
//!
//! The parcel-outline registry answers footprint and facts queries; the
//! 3D registry answers height queries. Both are TOML files under
//! `registries/` embedded via `include_str!`.

use serde::Deserialize;

/// WFS registry of building outlines and their administrative facts.
#[derive(Debug, Clone, Deserialize)]
pub struct ParcelRegistry {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// WFS endpoint.
    pub base_url: String,
    /// WFS protocol version sent with footprint queries.
    pub wfs_version: String,
    /// Building layer.
    pub type_name: String,
    /// Footprint bounding-box padding in degrees.
    pub pad_deg: f64,
    /// Search radius for the facts lookup, in meters.
    pub facts_radius_m: u32,
    /// Construction-year property aliases, first present wins.
    pub year_properties: Vec<String>,
    /// Usage-purpose property aliases, first present wins.
    pub usage_properties: Vec<String>,
}

/// 3D building registry queried by point.
#[derive(Debug, Clone, Deserialize)]
pub struct HeightRegistry {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Tiles endpoint taking `lat`/`lon` parameters.
    pub base_url: String,
    /// Height property aliases, first present wins.
    pub height_properties: Vec<String>,
}

const PARCEL_TOML: &str = include_str!("../registries/bag_pand.toml");
const HEIGHT_TOML: &str = include_str!("../registries/3dbag.toml");

/// The parcel-outline registry.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed.
#[must_use]
pub fn parcel_registry() -> ParcelRegistry {
    toml::de::from_str(PARCEL_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse parcel registry: {e}"))
}

/// The 3D building registry.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed.
#[must_use]
pub fn height_registry() -> HeightRegistry {
    toml::de::from_str(HEIGHT_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse height registry: {e}"))
}
