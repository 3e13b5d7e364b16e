#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate, outline and building record types.
//!
//! All types use WGS84 degrees in `(latitude, longitude)` order. Upstream
//! feature collections deliver positions as `[longitude, latitude]`; the
//! only place that order is swapped is [`Coordinate::from_lon_lat`], and
//! every resolver goes through it.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A WGS84 point in degrees.
///
/// Only constructible through [`Coordinate::new`] (directly, via
/// [`Coordinate::parse`]/[`Coordinate::from_lon_lat`], or when
/// deserializing), so both axes are always finite and in range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

/// Unchecked wire form of [`Coordinate`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = InvalidCoordinateError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

/// Why a coordinate was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidCoordinateError {
    /// The input text did not parse as a number.
    NotANumber {
        /// `"lat"` or `"lng"`.
        field: &'static str,
        /// The raw input.
        value: String,
    },
    /// The value was NaN or infinite.
    NonFinite {
        /// `"lat"` or `"lng"`.
        field: &'static str,
    },
    /// The value was outside the valid range for the axis.
    OutOfRange {
        /// `"lat"` or `"lng"`.
        field: &'static str,
        /// The offending value.
        value: f64,
    },
}

impl std::fmt::Display for InvalidCoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotANumber { field, value } => write!(f, "{field} is not a number: {value:?}"),
            Self::NonFinite { field } => write!(f, "{field} must be finite"),
            Self::OutOfRange { field, value } => write!(f, "{field} out of range: {value}"),
        }
    }
}

impl std::error::Error for InvalidCoordinateError {}

impl Coordinate {
    /// Creates a validated coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinateError`] if either value is non-finite or
    /// out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinateError> {
        check_axis("lat", latitude, 90.0)?;
        check_axis("lng", longitude, 180.0)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in `[-90, 90]`.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in `[-180, 180]`.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Parses a coordinate from the textual `lat`/`lng` pair used by
    /// request parameters.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinateError`] if either value is missing a
    /// numeric form, non-finite or out of range.
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self, InvalidCoordinateError> {
        let lat = parse_axis("lat", latitude)?;
        let lng = parse_axis("lng", longitude)?;
        Self::new(lat, lng)
    }

    /// Builds a coordinate from an upstream `[longitude, latitude, ...]`
    /// position. Extra elements (elevation) are ignored.
    ///
    /// Returns `None` for short or invalid positions.
    #[must_use]
    pub fn from_lon_lat(position: &[f64]) -> Option<Self> {
        match position {
            [lon, lat, ..] => Self::new(*lat, *lon).ok(),
            _ => None,
        }
    }

    /// The `[longitude, latitude]` order expected by upstream services.
    #[must_use]
    pub const fn to_lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }

    /// Square envelope padded by `pad` degrees on every side.
    #[must_use]
    pub fn padded(&self, pad: f64) -> BoundingBox {
        self.envelope(pad, pad)
    }

    /// Envelope padded by `lat_pad` degrees north/south and `lon_pad`
    /// degrees east/west.
    #[must_use]
    pub fn envelope(&self, lat_pad: f64, lon_pad: f64) -> BoundingBox {
        BoundingBox {
            min_lon: self.longitude - lon_pad,
            min_lat: self.latitude - lat_pad,
            max_lon: self.longitude + lon_pad,
            max_lat: self.latitude + lat_pad,
        }
    }
}

fn parse_axis(field: &'static str, raw: &str) -> Result<f64, InvalidCoordinateError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| InvalidCoordinateError::NotANumber {
            field,
            value: raw.to_string(),
        })
}

fn check_axis(field: &'static str, value: f64, limit: f64) -> Result<(), InvalidCoordinateError> {
    if !value.is_finite() {
        return Err(InvalidCoordinateError::NonFinite { field });
    }
    if !(-limit..=limit).contains(&value) {
        return Err(InvalidCoordinateError::OutOfRange { field, value });
    }
    Ok(())
}

/// Axis-aligned envelope in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    /// West edge.
    pub min_lon: f64,
    /// South edge.
    pub min_lat: f64,
    /// East edge.
    pub max_lon: f64,
    /// North edge.
    pub max_lat: f64,
}

impl BoundingBox {
    /// WFS `bbox` parameter value: `minx,miny,maxx,maxy,<crs>`.
    #[must_use]
    pub fn to_wfs_param(&self, crs: &str) -> String {
        format!(
            "{},{},{},{},{crs}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }

    /// East-west extent in degrees.
    #[must_use]
    pub fn width_deg(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    /// North-south extent in degrees.
    #[must_use]
    pub fn height_deg(&self) -> f64 {
        self.max_lat - self.min_lat
    }
}

/// A building outline: an ordered ring of points with the closing point
/// implied (the last point never repeats the first).
///
/// A single point is an accepted placeholder meaning "no outline
/// available".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outline(Vec<Coordinate>);

impl Outline {
    /// Creates an outline, dropping an explicit closing point if present.
    #[must_use]
    pub fn new(mut points: Vec<Coordinate>) -> Self {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Self(points)
    }

    /// Single-point stand-in used when no outline could be resolved.
    #[must_use]
    pub fn placeholder(at: Coordinate) -> Self {
        Self(vec![at])
    }

    /// Builds an outline from an upstream ring of `[lon, lat]` positions,
    /// swapping every position to `(lat, lon)`.
    ///
    /// Returns `None` for an empty ring or one containing an invalid
    /// position.
    #[must_use]
    pub fn from_lon_lat_ring(ring: &[Vec<f64>]) -> Option<Self> {
        if ring.is_empty() {
            return None;
        }
        let points = ring
            .iter()
            .map(|position| Coordinate::from_lon_lat(position))
            .collect::<Option<Vec<_>>>()?;
        Some(Self::new(points))
    }

    /// The ring's points.
    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if there are no points at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` if the outline has fewer than three points and so encloses
    /// no area.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.0.len() < 3
    }
}

/// Coarse building use class.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BuildingType {
    /// Dwellings only.
    Residential,
    /// Dwellings plus other functions.
    Mixed,
    /// No dwellings.
    Commercial,
}

/// Roof shape.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RoofType {
    /// Flat roof; the only shape the estimate currently assumes.
    Flat,
    /// Pitched roof.
    Pitched,
    /// Anything else.
    Complex,
}

/// Registry facts about a building beyond its geometry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingFacts {
    /// Year of construction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub construction_year: Option<i32>,
    /// Registered usage purpose(s), comma separated as delivered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
}

impl BuildingFacts {
    /// Classifies the building from its usage purposes.
    ///
    /// Unknown usage is treated as residential.
    #[must_use]
    pub fn building_type(&self) -> BuildingType {
        let Some(usage) = self.usage.as_deref() else {
            return BuildingType::Residential;
        };

        let purposes: Vec<String> = usage
            .split(',')
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        let residential = purposes.iter().any(|p| p.contains("woon"));
        let other = purposes.iter().any(|p| !p.contains("woon"));

        match (residential, other) {
            (true, true) => BuildingType::Mixed,
            (false, true) => BuildingType::Commercial,
            _ => BuildingType::Residential,
        }
    }
}

/// A resolved building. Built once per resolution and not modified
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingRecord {
    /// Record identifier.
    pub id: String,
    /// The address text that was resolved.
    pub address: String,
    /// Resolved address point.
    pub coordinate: Coordinate,
    /// Building outline, or a single-point placeholder.
    pub footprint: Outline,
    /// Footprint area in whole square meters (default when unmeasured).
    pub footprint_area_m2: f64,
    /// `false` when `footprint_area_m2` is the configured default.
    pub footprint_measured: bool,
    /// Building height in meters (default when unmeasured).
    pub height_m: f64,
    /// `false` when `height_m` is the configured default.
    pub height_measured: bool,
    /// Use class.
    pub building_type: BuildingType,
    /// Roof shape.
    pub roof_type: RoofType,
    /// Year of construction, when the registry has it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub construction_year: Option<i32>,
}
