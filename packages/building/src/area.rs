//! Footprint area on the spherical Web Mercator plane.
//!
//! Points are projected with `x = lon·π/180·R` and
//! `y = ln(tan(π/4 + lat·π/360))·R` (R = 6 378 137 m) and the shoelace
//! area of the projected ring is taken. There is no scale correction, so
//! areas away from the equator come out inflated by roughly `sec²(lat)`;
//! downstream figures are calibrated against this number.

use std::f64::consts::{FRAC_PI_4, PI};

use dakstudio_geography_models::{Coordinate, Outline};
use geo::{Area, LineString, Polygon};

/// Sphere radius used by the projection, in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Projects a coordinate to Web Mercator meters.
#[must_use]
pub fn project(at: Coordinate) -> (f64, f64) {
    let x = at.longitude() * PI / 180.0 * EARTH_RADIUS_M;
    let y = (FRAC_PI_4 + at.latitude() * PI / 360.0).tan().ln() * EARTH_RADIUS_M;
    (x, y)
}

/// Area of the outline in projected square meters. Outlines with fewer
/// than three points enclose nothing and give 0.
#[must_use]
pub fn compute_area(outline: &Outline) -> f64 {
    if outline.is_placeholder() {
        return 0.0;
    }

    let ring: LineString<f64> = outline
        .points()
        .iter()
        .map(|point| project(*point))
        .collect::<Vec<_>>()
        .into();

    Polygon::new(ring, vec![]).unsigned_area()
}
