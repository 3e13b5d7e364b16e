#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Rooftop feasibility estimates from the command line.
//!
//! ```text
//! dakstudio estimate "Koninginnegracht 2, Den Haag" --floors 2 --solar
//! dakstudio building "Lange Voorhout 34, Den Haag"
//! dakstudio geocode "Lange Voorhout 34, Den Haag"
//! dakstudio neighborhood --lat 52.0799 --lng 4.3113
//! dakstudio density --lat 52.0799 --lng 4.3113
//! dakstudio benefits --area 250 --typology penthouse --floors 1
//! ```
//!
//! Every command prints JSON on stdout. Logging goes to stderr and is
//! controlled with `RUST_LOG`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dakstudio_geography_models::Coordinate;
use dakstudio_pipeline::PipelineConfig;
use dakstudio_potential_models::{RoofStyle, RooftopConfig, RooftopFeatures, Typology};
use serde::Serialize;

#[derive(Parser)]
#[command(
    name = "dakstudio",
    about = "Estimate rooftop-addition potential for Dutch street addresses"
)]
struct Cli {
    /// Pipeline config file (TOML). Environment overrides still apply.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print compact JSON instead of pretty-printed.
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an address and estimate the rooftop addition
    Estimate {
        /// Street address, e.g. "Koninginnegracht 2, Den Haag"
        address: String,
        #[command(flatten)]
        rooftop: RooftopArgs,
    },
    /// Resolve the building record for an address
    Building {
        /// Street address
        address: String,
    },
    /// Resolve an address to a coordinate
    Geocode {
        /// Street address
        address: String,
    },
    /// Look up neighborhood statistics for a point
    Neighborhood {
        #[command(flatten)]
        point: PointArgs,
    },
    /// Estimate local dwelling density around a point
    Density {
        #[command(flatten)]
        point: PointArgs,
    },
    /// Compute the benefit estimate without any lookups
    Benefits {
        /// Footprint area in square meters (default footprint when omitted)
        #[arg(long)]
        area: Option<f64>,
        #[command(flatten)]
        rooftop: RooftopArgs,
    },
}

#[derive(Args)]
struct PointArgs {
    /// Latitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lat: String,
    /// Longitude in degrees
    #[arg(long, allow_hyphen_values = true)]
    lng: String,
}

impl PointArgs {
    fn coordinate(&self) -> Result<Coordinate, Box<dyn std::error::Error>> {
        Ok(Coordinate::parse(&self.lat, &self.lng)?)
    }
}

#[derive(Args)]
struct RooftopArgs {
    /// Placement: setback, aligned or penthouse
    #[arg(long, default_value = "setback", value_parser = parse_typology)]
    typology: Typology,
    /// Added floors (1-3)
    #[arg(long, default_value = "2")]
    floors: u8,
    /// Style: modern, classic or industrial
    #[arg(long, default_value = "modern", value_parser = parse_style)]
    style: RoofStyle,
    /// Add solar panels
    #[arg(long)]
    solar: bool,
    /// Add a green roof
    #[arg(long)]
    green_roof: bool,
    /// Add water storage
    #[arg(long)]
    water_storage: bool,
}

impl RooftopArgs {
    const fn to_config(&self) -> RooftopConfig {
        RooftopConfig {
            typology: self.typology,
            floors: self.floors,
            features: RooftopFeatures {
                solar_panels: self.solar,
                green_roof: self.green_roof,
                water_storage: self.water_storage,
            },
            style: self.style,
        }
    }
}

fn parse_typology(value: &str) -> Result<Typology, String> {
    value
        .parse()
        .map_err(|_| format!("unknown typology {value:?} (expected setback, aligned or penthouse)"))
}

fn parse_style(value: &str) -> Result<RoofStyle, String> {
    value
        .parse()
        .map_err(|_| format!("unknown style {value:?} (expected modern, classic or industrial)"))
}

fn print_json<T: Serialize>(value: &T, compact: bool) -> Result<(), Box<dyn std::error::Error>> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{json}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let config = PipelineConfig::load(cli.config.as_deref())?;
    log::debug!("Pipeline config: {config:?}");

    match cli.command {
        Commands::Estimate { address, rooftop } => {
            let fetcher = config.fetcher()?;
            let report =
                dakstudio_pipeline::resolve_site(&fetcher, &config, &address, &rooftop.to_config())
                    .await?;
            log::info!(
                "{address}: {} units, investment {}",
                report.estimate.housing.units,
                report.estimate.investment_range
            );
            print_json(&report, cli.compact)?;
        }
        Commands::Building { address } => {
            let fetcher = config.fetcher()?;
            let record = dakstudio_pipeline::resolve_building(&fetcher, &config, &address).await?;
            print_json(&record, cli.compact)?;
        }
        Commands::Geocode { address } => {
            let fetcher = config.fetcher()?;
            let found = dakstudio_geocoder::geocode(&fetcher, &address).await?;
            print_json(&found, cli.compact)?;
        }
        Commands::Neighborhood { point } => {
            let at = point.coordinate()?;
            let fetcher = config.fetcher()?.with_policy(config.neighborhood_policy());
            let stats = dakstudio_neighborhood::resolve_neighborhood(&fetcher, at).await;
            print_json(&stats, cli.compact)?;
        }
        Commands::Density { point } => {
            let at = point.coordinate()?;
            let fetcher = config.fetcher()?.with_policy(config.neighborhood_policy());
            let source = dakstudio_neighborhood::registry::density_source();
            let density = dakstudio_neighborhood::estimate_local_density(&fetcher, &source, at).await;
            print_json(&density, cli.compact)?;
        }
        Commands::Benefits { area, rooftop } => {
            let rooftop = rooftop.to_config();
            dakstudio_potential::validate_config(&rooftop)?;
            let area = area.or(Some(config.default_footprint_area_m2));
            let estimate = dakstudio_potential::compute_benefits(area, &rooftop);
            print_json(&estimate, cli.compact)?;
        }
    }

    Ok(())
}
