#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the telemap core.
//!
//! Loads a TOML config (optional) and a `GeoJSON` boundary file, then runs a
//! single measurement, projection, or geofence operation and prints the
//! result as JSON. Points are written `lat,lng`.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use telemap_config::Config;
use telemap_geo_models::{DistanceUnit, GeoPoint, Viewport};
use telemap_geodesic::{centroid, format_area, format_distance};
use telemap_geofence_models::RegionWhitelist;
use telemap_projection::CoordinateProjector;
use telemap_session::{MeasurementSession, PolygonMetrics, PolygonSession};

#[derive(Parser)]
#[command(name = "telemap", about = "Geospatial measurement and geofence checks")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// `GeoJSON` boundary file (overrides the config)
    #[arg(long, global = true)]
    boundaries: Option<PathBuf>,

    /// Map surface width in pixels
    #[arg(long, global = true, default_value_t = 800.0)]
    width: f64,

    /// Map surface height in pixels
    #[arg(long, global = true, default_value_t = 600.0)]
    height: f64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the regions in the boundary file
    Regions,
    /// Validate a point against the country and assigned regions
    Check {
        #[arg(allow_hyphen_values = true)]
        point: GeoPoint,
        /// Assigned region (repeatable; replaces the configured whitelist)
        #[arg(long = "region")]
        regions: Vec<String>,
    },
    /// Great-circle length of a path
    Measure {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        points: Vec<GeoPoint>,
        /// `km` or `miles` (defaults to the configured unit)
        #[arg(long)]
        unit: Option<DistanceUnit>,
    },
    /// Area and perimeter of a polygon, without geofence checks
    Area {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        points: Vec<GeoPoint>,
    },
    /// Convert between pixel and geographic positions
    Project {
        #[command(subcommand)]
        direction: Direction,
    },
    /// Validate and save a polygon, printing it as `GeoJSON`
    Polygon {
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        points: Vec<GeoPoint>,
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        color: Option<String>,
        /// Assigned region (repeatable; replaces the configured whitelist)
        #[arg(long = "region")]
        regions: Vec<String>,
    },
}

#[derive(Subcommand)]
enum Direction {
    /// Pixel position to `lat,lng`
    ToGeo { x: f64, y: f64 },
    /// `lat,lng` to pixel position
    ToPixel {
        #[arg(allow_hyphen_values = true)]
        point: GeoPoint,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AreaReport {
    vertex_count: usize,
    #[serde(flatten)]
    metrics: PolygonMetrics,
    formatted_area: String,
    formatted_perimeter: String,
    centroid: Option<GeoPoint>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let viewport = Viewport::new(cli.width, cli.height);
    let projector = config.projector()?;

    match cli.command {
        Commands::Regions => {
            let index = config.load_index(cli.boundaries.as_deref())?;
            for name in index.names_index() {
                println!("{name}");
            }
        }
        Commands::Check { point, regions } => {
            let index = config.load_index(cli.boundaries.as_deref())?;
            let validator = config.validator(index)?;
            let whitelist = whitelist(&config, regions);
            let result = validator.validate_against_whitelist(point, &whitelist);
            if !result.is_valid {
                log::warn!("Rejected {point}: {:?}", result.reason);
            }
            print_json(&result)?;
        }
        Commands::Measure { points, unit } => {
            let mut session = MeasurementSession::new(unit.unwrap_or(config.default_unit));
            for point in points {
                session.add_point(point, projector.to_pixel(point, viewport));
            }
            print_json(&session.summary())?;
        }
        Commands::Area { points } => {
            let metrics = PolygonMetrics::of(&points);
            print_json(&AreaReport {
                vertex_count: points.len(),
                metrics,
                formatted_area: format_area(metrics.area_km2),
                formatted_perimeter: format_distance(metrics.perimeter_km, DistanceUnit::Km),
                centroid: centroid(&points),
            })?;
        }
        Commands::Project { direction } => project(&projector, viewport, &direction)?,
        Commands::Polygon {
            points,
            name,
            color,
            regions,
        } => {
            let index = config.load_index(cli.boundaries.as_deref())?;
            let validator = config.validator(index)?;
            let whitelist = whitelist(&config, regions);

            let mut session = PolygonSession::new();
            for point in points {
                session.add_vertex(point, projector.to_pixel(point, viewport));
            }
            match session.complete(&validator, &whitelist, &name, color.as_deref()) {
                Ok(id) => {
                    log::info!("Saved {id}");
                    print_json(&session.to_feature_collection())?;
                }
                Err(e) => {
                    print_json(&e.result())?;
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}

fn whitelist(config: &Config, regions: Vec<String>) -> RegionWhitelist {
    if regions.is_empty() {
        config.region_whitelist()
    } else {
        RegionWhitelist::new(regions)
    }
}

fn project(
    projector: &CoordinateProjector,
    viewport: Viewport,
    direction: &Direction,
) -> Result<(), serde_json::Error> {
    match *direction {
        Direction::ToGeo { x, y } => {
            let point = projector.to_geo(x, y, viewport);
            if !projector.contains(point) {
                log::warn!("{point} is outside the map bounds");
            }
            print_json(&point)
        }
        Direction::ToPixel { point } => print_json(&projector.to_pixel(point, viewport)),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negative_coordinates() {
        let cli = Cli::try_parse_from(["telemap", "measure", "-10.5,20", "12,-30.25"]).unwrap();
        let Commands::Measure { points, unit } = cli.command else {
            panic!("expected measure");
        };
        assert_eq!(points, [GeoPoint::new(-10.5, 20.0), GeoPoint::new(12.0, -30.25)]);
        assert!(unit.is_none());
    }

    #[test]
    fn parses_unit_and_global_viewport() {
        let cli = Cli::try_parse_from([
            "telemap", "measure", "--unit", "miles", "--width", "1024", "20,78", "21,78",
        ])
        .unwrap();
        assert!((cli.width - 1024.0).abs() < f64::EPSILON);
        assert!(matches!(
            cli.command,
            Commands::Measure {
                unit: Some(DistanceUnit::Miles),
                ..
            }
        ));
    }

    #[test]
    fn rejects_malformed_point() {
        assert!(Cli::try_parse_from(["telemap", "check", "north"]).is_err());
        assert!(Cli::try_parse_from(["telemap", "check", "95,10"]).is_err());
    }

    #[test]
    fn repeated_region_flags_build_whitelist() {
        let cli = Cli::try_parse_from([
            "telemap", "check", "--region", "Karnataka", "--region", "Kerala", "12.9,77.6",
        ])
        .unwrap();
        let Commands::Check { regions, .. } = cli.command else {
            panic!("expected check");
        };
        let whitelist = whitelist(&Config::default(), regions);
        assert!(whitelist.allows("kerala"));
        assert!(!whitelist.allows("Goa"));
    }
}
