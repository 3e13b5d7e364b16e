#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]

//! Rooftop-addition benefit estimate.
//!
//! A pure function of the footprint area and a [`RooftopConfig`]; no I/O.
//! Gross floor area (`bvo`) is footprint × floors and usable floor area
//! (`bgo`) is 80 % of that.

use dakstudio_potential_models::{
    BenefitEstimate, Green, Housing, InvestmentRange, MAX_FLOORS, MIN_FLOORS, RooftopConfig,
    Solar, Water,
};
use thiserror::Error;

/// Footprint assumed when none was measured, in square meters.
pub const DEFAULT_FOOTPRINT_AREA_M2: f64 = 400.0;

const USABLE_FLOOR_RATIO: f64 = 0.8;
const INVESTMENT_LOW_K_PER_M2: f64 = 1.8;
const INVESTMENT_HIGH_K_PER_M2: f64 = 2.2;

const PANEL_COVERAGE: f64 = 0.7;
const PANEL_AREA_M2: f64 = 1.7;
const PANEL_KWP: f64 = 0.4;
const YIELD_KWH_PER_KWP: f64 = 950.0;

const GREEN_SHARE_WITH_SOLAR: f64 = 0.3;
const GREEN_SHARE: f64 = 0.4;
const CO2_KG_PER_GREEN_M2: f64 = 2.0;

const WATER_M3_PER_M2_WITH_GREEN: f64 = 0.03;
const WATER_M3_PER_M2: f64 = 0.08;

/// Errors from configuration validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PotentialError {
    /// Floors outside the supported range.
    #[error("Floors must be between 1 and 3, got {floors}")]
    FloorsOutOfRange {
        /// The rejected value.
        floors: u8,
    },
}

/// Checks a configuration before it is handed to [`compute_benefits`].
///
/// # Errors
///
/// Returns [`PotentialError::FloorsOutOfRange`] for an unsupported floor
/// count.
pub const fn validate_config(config: &RooftopConfig) -> Result<(), PotentialError> {
    if config.floors < MIN_FLOORS || config.floors > MAX_FLOORS {
        return Err(PotentialError::FloorsOutOfRange {
            floors: config.floors,
        });
    }
    Ok(())
}

/// Derives the benefit estimate.
///
/// `footprint_area_m2` falls back to [`DEFAULT_FOOTPRINT_AREA_M2`] when
/// unknown or not finite. The floor count is used as given; see
/// [`validate_config`].
#[must_use]
pub fn compute_benefits(footprint_area_m2: Option<f64>, config: &RooftopConfig) -> BenefitEstimate {
    let area = footprint_area_m2
        .filter(|a| a.is_finite())
        .unwrap_or(DEFAULT_FOOTPRINT_AREA_M2)
        .max(0.0);

    let bvo = area * f64::from(config.floors);
    let bgo = bvo * USABLE_FLOOR_RATIO;
    let average = config.typology.average_unit_size_m2();
    let units = ((bgo / average).floor() as u32).max(1);

    log::debug!(
        "Benefits for {area} m2 x {} floors ({}): bvo={bvo} bgo={bgo} units={units}",
        config.floors,
        config.typology
    );

    let features = config.features;

    BenefitEstimate {
        housing: Housing {
            units,
            total_area_m2: bgo.round() as u64,
            average_unit_size_m2: average.round() as u32,
        },
        solar: features.solar_panels.then(|| solar(area)),
        green: features
            .green_roof
            .then(|| green(area, features.solar_panels)),
        water: features
            .water_storage
            .then(|| water(area, features.green_roof)),
        investment_range: InvestmentRange {
            low_k: (bvo * INVESTMENT_LOW_K_PER_M2).round() as u64,
            high_k: (bvo * INVESTMENT_HIGH_K_PER_M2).round() as u64,
        },
    }
}

fn solar(area: f64) -> Solar {
    let panels = (area * PANEL_COVERAGE / PANEL_AREA_M2).floor();
    let kwp = panels * PANEL_KWP;
    Solar {
        panel_count: panels as u32,
        capacity_kwp: round1(kwp),
        yearly_production_kwh: (kwp * YIELD_KWH_PER_KWP).round() as u64,
    }
}

fn green(area: f64, with_solar: bool) -> Green {
    let share = if with_solar {
        GREEN_SHARE_WITH_SOLAR
    } else {
        GREEN_SHARE
    };
    let green_area = area * share;
    Green {
        area_m2: green_area.round() as u64,
        co2_reduction_kg: (green_area * CO2_KG_PER_GREEN_M2).round() as u64,
    }
}

fn water(area: f64, with_green: bool) -> Water {
    let per_m2 = if with_green {
        WATER_M3_PER_M2_WITH_GREEN
    } else {
        WATER_M3_PER_M2
    };
    Water {
        capacity_m3: round1(area * per_m2),
        retention_area_m2: area.round() as u64,
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use dakstudio_potential_models::{RoofStyle, RooftopFeatures, Typology};

    fn config(typology: Typology, floors: u8, features: RooftopFeatures) -> RooftopConfig {
        RooftopConfig {
            typology,
            floors,
            features,
            style: RoofStyle::Modern,
        }
    }

    const SOLAR_ONLY: RooftopFeatures = RooftopFeatures {
        solar_panels: true,
        green_roof: false,
        water_storage: false,
    };

    const NONE: RooftopFeatures = RooftopFeatures {
        solar_panels: false,
        green_roof: false,
        water_storage: false,
    };

    #[test]
    fn two_setback_floors_with_solar() {
        let estimate = compute_benefits(Some(400.0), &config(Typology::Setback, 2, SOLAR_ONLY));

        assert_eq!(
            estimate.housing,
            Housing {
                units: 8,
                total_area_m2: 640,
                average_unit_size_m2: 75,
            }
        );
        assert_eq!(
            estimate.investment_range,
            InvestmentRange {
                low_k: 1440,
                high_k: 1760,
            }
        );
        let solar = estimate.solar.unwrap();
        assert_eq!(solar.panel_count, 164);
        assert!((solar.capacity_kwp - 65.6).abs() < 1e-9);
        assert_eq!(solar.yearly_production_kwh, 62_320);
        assert!(estimate.green.is_none());
        assert!(estimate.water.is_none());
    }

    #[test]
    fn penthouse_single_floor() {
        let estimate = compute_benefits(Some(400.0), &config(Typology::Penthouse, 1, NONE));
        assert_eq!(estimate.housing.units, 2);
        assert_eq!(estimate.housing.average_unit_size_m2, 120);
        assert!(estimate.solar.is_none());
    }

    #[test]
    fn unknown_area_uses_default() {
        let cfg = config(Typology::Aligned, 3, NONE);
        assert_eq!(compute_benefits(None, &cfg), compute_benefits(Some(400.0), &cfg));
        assert_eq!(
            compute_benefits(Some(f64::NAN), &cfg),
            compute_benefits(Some(400.0), &cfg)
        );
        // 400 * 3 * 0.8 / 65
        assert_eq!(compute_benefits(None, &cfg).housing.units, 14);
    }

    #[test]
    fn at_least_one_unit() {
        let estimate = compute_benefits(Some(50.0), &config(Typology::Penthouse, 1, NONE));
        assert_eq!(estimate.housing.units, 1);
        assert_eq!(estimate.housing.total_area_m2, 40);
    }

    #[test]
    fn green_roof_shrinks_next_to_solar() {
        let both = RooftopFeatures {
            solar_panels: true,
            green_roof: true,
            water_storage: false,
        };
        let green = compute_benefits(Some(400.0), &config(Typology::Setback, 1, both))
            .green
            .unwrap();
        assert_eq!(green.area_m2, 120);
        assert_eq!(green.co2_reduction_kg, 240);

        let only_green = RooftopFeatures {
            green_roof: true,
            ..NONE
        };
        let green = compute_benefits(Some(400.0), &config(Typology::Setback, 1, only_green))
            .green
            .unwrap();
        assert_eq!(green.area_m2, 160);
        assert_eq!(green.co2_reduction_kg, 320);
    }

    #[test]
    fn water_storage_depends_on_green_roof() {
        let with_green = RooftopFeatures {
            green_roof: true,
            water_storage: true,
            ..NONE
        };
        let water = compute_benefits(Some(400.0), &config(Typology::Setback, 1, with_green))
            .water
            .unwrap();
        assert!((water.capacity_m3 - 12.0).abs() < 1e-9);
        assert_eq!(water.retention_area_m2, 400);

        let bare = RooftopFeatures {
            water_storage: true,
            ..NONE
        };
        let water = compute_benefits(Some(400.0), &config(Typology::Setback, 1, bare))
            .water
            .unwrap();
        assert!((water.capacity_m3 - 32.0).abs() < 1e-9);
    }

    #[test]
    fn style_does_not_change_estimate() {
        let modern = config(Typology::Aligned, 2, SOLAR_ONLY);
        let industrial = RooftopConfig {
            style: RoofStyle::Industrial,
            ..modern
        };
        assert_eq!(
            compute_benefits(Some(250.0), &modern),
            compute_benefits(Some(250.0), &industrial)
        );
    }

    #[test]
    fn validates_floor_range() {
        assert!(validate_config(&config(Typology::Setback, 1, NONE)).is_ok());
        assert!(validate_config(&config(Typology::Setback, 3, NONE)).is_ok());
        assert_eq!(
            validate_config(&config(Typology::Setback, 0, NONE)),
            Err(PotentialError::FloorsOutOfRange { floors: 0 })
        );
        assert_eq!(
            validate_config(&config(Typology::Setback, 4, NONE)),
            Err(PotentialError::FloorsOutOfRange { floors: 4 })
        );
    }
}
