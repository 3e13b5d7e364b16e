//! Normalizes registry property maps into [`NeighborhoodStats`].
//!
//! The registries queried by the fallback chain disagree on property
//! names (`BU_NAAM` vs `Buurtnaam`, `AANTAL_WONINGEN` vs `WONINGEN`, ...).
//! Each logical field has an ordered alias list; the first alias present
//! (non-null) in the map wins, even when its value turns out to be
//! unusable. Keys are matched exactly.

use dakstudio_neighborhood_models::NeighborhoodStats;
use serde_json::{Map, Value};

/// A logical output field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Neighborhood or district name.
    Name,
    /// Municipality name.
    Municipality,
    /// Neighborhood registry code.
    Code,
    /// Number of dwellings.
    Dwellings,
}

/// Alias lists per field, in lookup order.
pub const FIELD_ALIASES: &[(Field, &[&str])] = &[
    (
        Field::Name,
        &["WK_NAAM", "wk_naam", "BU_NAAM", "Buurtnaam", "BUURTNAAM", "BUURT_NAAM"],
    ),
    (
        Field::Municipality,
        &["GM_NAAM", "gm_naam", "Gemeentenaam", "GM_NAAM2023"],
    ),
    (Field::Code, &["BU_CODE", "BUURTCODE", "BU_CODE_2023", "bu_code"]),
    (
        Field::Dwellings,
        &["AANTAL_WONINGEN", "WONINGEN", "aantal_woningen"],
    ),
];

/// Unit of an area property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaUnit {
    /// Square meters.
    SquareMeters,
    /// Square kilometers.
    SquareKilometers,
}

/// Total-area aliases, in lookup order.
pub const AREA_ALIASES: &[(&str, AreaUnit)] = &[
    ("OPP_TOT", AreaUnit::SquareMeters),
    ("OPP_TOTAAL", AreaUnit::SquareMeters),
    ("OPP_TOT_M2", AreaUnit::SquareMeters),
    ("OPP_TOT_KM2", AreaUnit::SquareKilometers),
];

const SQUARE_METERS_PER_KM2: f64 = 1_000_000.0;

/// Aliases for `field`.
#[must_use]
pub fn aliases(field: Field) -> &'static [&'static str] {
    FIELD_ALIASES
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, names)| *names)
        .unwrap_or_default()
}

/// First present textual value for `field`.
///
/// Null and empty strings count as absent. Numbers are rendered as text
/// (some registries deliver codes as integers).
#[must_use]
pub fn text_field(props: &Map<String, Value>, field: Field) -> Option<String> {
    aliases(field).iter().find_map(|key| match props.get(*key)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(number_text(n)),
        _ => None,
    })
}

/// Integral numbers render without a fractional part (`518.0` → `"518"`).
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn number_text(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

/// Numeric value of the first present alias for `field`.
///
/// Numeric strings are accepted. A present value that does not parse
/// makes the field absent; later aliases are not consulted.
#[must_use]
pub fn number_field(props: &Map<String, Value>, field: Field) -> Option<f64> {
    aliases(field)
        .iter()
        .find_map(|key| present(props, key))
        .and_then(as_number)
}

/// Total area in square kilometers, from the first present area alias.
#[must_use]
pub fn area_km2(props: &Map<String, Value>) -> Option<f64> {
    let (value, unit) = AREA_ALIASES
        .iter()
        .find_map(|(key, unit)| present(props, key).map(|value| (value, *unit)))?;
    let value = as_number(value)?;
    Some(match unit {
        AreaUnit::SquareMeters => value / SQUARE_METERS_PER_KM2,
        AreaUnit::SquareKilometers => value,
    })
}

fn present<'a>(props: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    props.get(key).filter(|value| !value.is_null())
}

fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

/// `round(dwellings / area_km2)`, absent unless both inputs are usable.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn dwelling_density(dwellings: Option<f64>, area_km2: Option<f64>) -> Option<u64> {
    match (dwellings, area_km2) {
        (Some(dwellings), Some(area)) if dwellings >= 0.0 && area > 0.0 => {
            Some((dwellings / area).round() as u64)
        }
        _ => None,
    }
}

/// Normalizes one property map. Provenance and diagnostics are left at
/// their defaults for the caller to fill in.
#[must_use]
pub fn normalize_properties(props: &Map<String, Value>) -> NeighborhoodStats {
    NeighborhoodStats {
        neighborhood_name: text_field(props, Field::Name),
        municipality_name: text_field(props, Field::Municipality),
        neighborhood_code: text_field(props, Field::Code),
        dwelling_density_per_km2: dwelling_density(
            number_field(props, Field::Dwellings),
            area_km2(props),
        ),
        ..NeighborhoodStats::default()
    }
}
