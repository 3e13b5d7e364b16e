#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rooftop-addition configuration and the estimate derived from it.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Smallest number of added floors.
pub const MIN_FLOORS: u8 = 1;
/// Largest number of added floors.
pub const MAX_FLOORS: u8 = 3;

/// How the addition sits on the existing roof.
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
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Typology {
    /// Set back from the facade line.
    #[default]
    Setback,
    /// Flush with the facade.
    Aligned,
    /// A single premium unit per floor.
    Penthouse,
}

impl Typology {
    /// Average dwelling size for this typology, in square meters.
    #[must_use]
    pub const fn average_unit_size_m2(self) -> f64 {
        match self {
            Self::Penthouse => 120.0,
            Self::Aligned => 65.0,
            Self::Setback => 75.0,
        }
    }
}

/// Architectural style. Carried for presentation; does not affect the
/// estimate.
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
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RoofStyle {
    /// Contemporary.
    #[default]
    Modern,
    /// Traditional.
    Classic,
    /// Industrial.
    Industrial,
}

/// Optional sustainability features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RooftopFeatures {
    /// Solar panels on the new roof.
    pub solar_panels: bool,
    /// Vegetated roof.
    pub green_roof: bool,
    /// Rainwater retention.
    pub water_storage: bool,
}

/// User-chosen rooftop addition. Never modified by the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RooftopConfig {
    /// Placement.
    pub typology: Typology,
    /// Added floors, between [`MIN_FLOORS`] and [`MAX_FLOORS`].
    pub floors: u8,
    /// Sustainability features.
    pub features: RooftopFeatures,
    /// Style.
    pub style: RoofStyle,
}

impl Default for RooftopConfig {
    fn default() -> Self {
        Self {
            typology: Typology::Setback,
            floors: 2,
            features: RooftopFeatures {
                solar_panels: true,
                green_roof: false,
                water_storage: false,
            },
            style: RoofStyle::Modern,
        }
    }
}

/// Added housing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Housing {
    /// Number of dwellings (at least one).
    pub units: u32,
    /// Usable floor area in square meters.
    pub total_area_m2: u64,
    /// Average dwelling size in square meters.
    pub average_unit_size_m2: u32,
}

/// Solar yield.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solar {
    /// Panels fitting on the roof.
    pub panel_count: u32,
    /// Peak capacity in kWp, one decimal.
    pub capacity_kwp: f64,
    /// Yearly production in kWh.
    pub yearly_production_kwh: u64,
}

/// Green roof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Green {
    /// Vegetated area in square meters.
    pub area_m2: u64,
    /// Yearly CO₂ reduction in kilograms.
    pub co2_reduction_kg: u64,
}

/// Water retention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Water {
    /// Storage capacity in cubic meters, one decimal.
    pub capacity_m3: f64,
    /// Roof area draining into storage, in square meters.
    pub retention_area_m2: u64,
}

/// Investment estimate in thousands of euros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentRange {
    /// Lower bound.
    pub low_k: u64,
    /// Upper bound.
    pub high_k: u64,
}

impl std::fmt::Display for InvestmentRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "€{}k - €{}k", self.low_k, self.high_k)
    }
}

/// Everything derived from a footprint and a [`RooftopConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitEstimate {
    /// Added housing.
    pub housing: Housing,
    /// Present when solar panels are selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solar: Option<Solar>,
    /// Present when a green roof is selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green: Option<Green>,
    /// Present when water storage is selected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water: Option<Water>,
    /// Investment range.
    pub investment_range: InvestmentRange,
}
