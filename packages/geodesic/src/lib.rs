#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Distance, area and perimeter over the Earth's surface.
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`distance`] | Haversine great-circle distance for an explicit sphere radius |
//! | [`path_length`] | Length of an open path |
//! | [`polygon_area`] | Area of a ring in km², planar-projected Shoelace |
//! | [`polygon_perimeter`] | Length of a closed ring |
//!
//! Distances take the unit as a sphere radius, so the same angular term is
//! shared by every unit and conversions are exact ratios.
//!
//! Area uses a local equirectangular projection
//! (`x = lng * 111320 * cos(lat)`, `y = lat * 110540`, in meters). It is
//! not geodesically exact; displayed figures are calibrated against it, so
//! switching to an ellipsoidal formula changes user-visible numbers.

use telemap_geo_models::{DistanceUnit, EARTH_RADIUS_KM, GeoPoint};

/// Meters per degree of longitude at the equator.
pub const METERS_PER_DEGREE_LNG: f64 = 111_320.0;

/// Meters per degree of latitude.
pub const METERS_PER_DEGREE_LAT: f64 = 110_540.0;

const SQUARE_METERS_PER_SQUARE_KM: f64 = 1_000_000.0;

/// Great-circle distance between `a` and `b` on a sphere of `radius`.
///
/// The result is in whatever unit `radius` is expressed in.
#[must_use]
pub fn distance(a: GeoPoint, b: GeoPoint, radius: f64) -> f64 {
    debug_assert!(
        a.lat.is_finite() && a.lng.is_finite() && b.lat.is_finite() && b.lng.is_finite(),
        "non-finite coordinate passed to distance: {a:?} -> {b:?}"
    );

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (lat1.cos() * lat2.cos()).mul_add(
        (d_lng / 2.0).sin().powi(2),
        (d_lat / 2.0).sin().powi(2),
    );
    let c = 2.0 * h.sqrt().min(1.0).asin();

    radius * c
}

/// [`distance`] with the radius taken from `unit`.
#[must_use]
pub fn distance_in(a: GeoPoint, b: GeoPoint, unit: DistanceUnit) -> f64 {
    distance(a, b, unit.radius())
}

/// Distance of each consecutive leg of an open path.
#[must_use]
pub fn segment_lengths(points: &[GeoPoint], unit: DistanceUnit) -> Vec<f64> {
    points
        .windows(2)
        .map(|w| distance_in(w[0], w[1], unit))
        .collect()
}

/// Total length of an open path. Zero for fewer than two points.
#[must_use]
pub fn path_length(points: &[GeoPoint], unit: DistanceUnit) -> f64 {
    points
        .windows(2)
        .map(|w| distance_in(w[0], w[1], unit))
        .sum()
}

/// Area enclosed by the implicitly-closed ring `vertices`, in km².
///
/// Zero for fewer than three vertices. Winding order does not matter.
#[must_use]
pub fn polygon_area(vertices: &[GeoPoint]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }

    let projected: Vec<(f64, f64)> = vertices.iter().map(|p| project_meters(*p)).collect();

    let twice_area: f64 = projected
        .iter()
        .zip(projected.iter().cycle().skip(1))
        .map(|((x1, y1), (x2, y2))| x1.mul_add(*y2, -(x2 * y1)))
        .sum();

    twice_area.abs() / 2.0 / SQUARE_METERS_PER_SQUARE_KM
}

/// Length of the implicitly-closed ring `vertices` (last joins first).
///
/// Zero for fewer than two vertices. Two vertices give the out-and-back
/// length.
#[must_use]
pub fn polygon_perimeter(vertices: &[GeoPoint], unit: DistanceUnit) -> f64 {
    if vertices.len() < 2 {
        return 0.0;
    }

    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(a, b)| distance_in(*a, *b, unit))
        .sum()
}

/// Arithmetic mean of the vertices, used for label placement.
///
/// Returns `None` for an empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn centroid(vertices: &[GeoPoint]) -> Option<GeoPoint> {
    if vertices.is_empty() {
        return None;
    }
    let n = vertices.len() as f64;
    let (lat, lng) = vertices
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    Some(GeoPoint::new(lat / n, lng / n))
}

/// Central angle, in degrees, of a great-circle arc `km` long.
///
/// Inverse of [`distance`] on the km sphere: a point this many degrees of
/// latitude away is exactly `km` away.
#[must_use]
pub fn km_to_arc_degrees(km: f64) -> f64 {
    (km / EARTH_RADIUS_KM).to_degrees()
}

/// Formats a distance for display.
///
/// Values under one unit are shown in meters (km) or feet (miles).
#[must_use]
pub fn format_distance(value: f64, unit: DistanceUnit) -> String {
    if value < 1.0 {
        match unit {
            DistanceUnit::Km => format!("{:.0} m", value * 1000.0),
            DistanceUnit::Miles => format!("{:.0} ft", value * 5280.0),
        }
    } else {
        format!("{value:.2} {}", unit.suffix())
    }
}

/// Formats an area for display: hectares under 1 km², otherwise km².
#[must_use]
pub fn format_area(km2: f64) -> String {
    if km2 < 1.0 {
        format!("{:.2} ha", km2 * 100.0)
    } else {
        format!("{km2:.2} km²")
    }
}

fn project_meters(p: GeoPoint) -> (f64, f64) {
    let x = p.lng * METERS_PER_DEGREE_LNG * p.lat.to_radians().cos();
    let y = p.lat * METERS_PER_DEGREE_LAT;
    (x, y)
}
