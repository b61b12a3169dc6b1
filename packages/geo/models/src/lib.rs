#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Coordinate and vertex types shared across the telemap core.
//!
//! Geographic points are plain `Copy` values in degrees. Pixel points are
//! ephemeral and only meaningful for the viewport they were computed
//! against. Vertices pair the two with a stable identity so that drag
//! events can be matched back to the vertex they started on.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Mean Earth radius in statute miles.
pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Error returned when a latitude/longitude pair cannot form a [`GeoPoint`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidCoordinate {
    /// Latitude is NaN/infinite or outside `[-90, 90]`.
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),

    /// Longitude is NaN/infinite or outside `[-180, 180]`.
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),

    /// Input text was not a `lat,lng` pair.
    #[error("expected \"lat,lng\", got {0:?}")]
    Format(String),
}

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl GeoPoint {
    /// Creates a point without range checks.
    ///
    /// Projection from pixel space is total, so points produced by it may lie
    /// outside the valid lat/lng ranges. Use [`Self::try_new`] for input that
    /// comes from outside the core.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Creates a point, rejecting non-finite or out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinate`] if `lat` is outside `[-90, 90]` or `lng`
    /// is outside `[-180, 180]`.
    pub fn try_new(lat: f64, lng: f64) -> Result<Self, InvalidCoordinate> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(InvalidCoordinate::Latitude(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(InvalidCoordinate::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Whether both components are finite and within the valid ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        Self::try_new(self.lat, self.lng).is_ok()
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

impl FromStr for GeoPoint {
    type Err = InvalidCoordinate;

    /// Parses `"lat,lng"` (whitespace around either number is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| InvalidCoordinate::Format(s.to_string()))?;
        let lat: f64 = lat
            .trim()
            .parse()
            .map_err(|_| InvalidCoordinate::Format(s.to_string()))?;
        let lng: f64 = lng
            .trim()
            .parse()
            .map_err(|_| InvalidCoordinate::Format(s.to_string()))?;
        Self::try_new(lat, lng)
    }
}

/// A position in raster/pixel space, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    /// Horizontal offset from the left edge.
    pub x: f64,
    /// Vertical offset from the top edge.
    pub y: f64,
}

impl Point2D {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Size of the map surface that pointer events are measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Latitude/longitude box that pixel space is stretched over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl GeoBounds {
    /// National bounding box of India, the default map extent.
    pub const INDIA: Self = Self {
        lat_min: 6.4,
        lat_max: 37.6,
        lng_min: 68.1,
        lng_max: 97.25,
    };

    /// Latitude span in degrees.
    #[must_use]
    pub fn lat_span(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Longitude span in degrees.
    #[must_use]
    pub fn lng_span(&self) -> f64 {
        self.lng_max - self.lng_min
    }

    /// Whether the box has finite corners and a positive span on both axes.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        [self.lat_min, self.lat_max, self.lng_min, self.lng_max]
            .iter()
            .all(|v| v.is_finite())
            && self.lat_span() > 0.0
            && self.lng_span() > 0.0
    }

    /// Whether `point` lies inside the box (edges included).
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.lat_min..=self.lat_max).contains(&point.lat)
            && (self.lng_min..=self.lng_max).contains(&point.lng)
    }
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self::INDIA
    }
}

/// Unit that distances are reported in.
///
/// The unit only selects the sphere radius fed to the Haversine formula, so
/// kilometer and mile values for the same path always differ by exactly
/// `EARTH_RADIUS_KM / EARTH_RADIUS_MILES`.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
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
pub enum DistanceUnit {
    #[default]
    Km,
    Miles,
}

impl DistanceUnit {
    /// Sphere radius used for great-circle distances in this unit.
    #[must_use]
    pub const fn radius(self) -> f64 {
        match self {
            Self::Km => EARTH_RADIUS_KM,
            Self::Miles => EARTH_RADIUS_MILES,
        }
    }

    /// Short label appended to formatted values.
    #[must_use]
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Km => "km",
            Self::Miles => "mi",
        }
    }
}

static NEXT_VERTEX_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique, monotonically increasing vertex identity.
///
/// Ids are handed out in allocation order, so ordering vertices by id
/// reproduces the order they were placed in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VertexId(u64);

impl VertexId {
    /// Allocates the next id.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_VERTEX_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A user-placed point carrying both its geographic and screen position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vertex {
    id: VertexId,
    point: GeoPoint,
    pixel: Point2D,
}

impl Vertex {
    /// Creates a vertex with a freshly allocated id.
    #[must_use]
    pub fn new(point: GeoPoint, pixel: Point2D) -> Self {
        Self {
            id: VertexId::next(),
            point,
            pixel,
        }
    }

    #[must_use]
    pub const fn id(&self) -> VertexId {
        self.id
    }

    #[must_use]
    pub const fn point(&self) -> GeoPoint {
        self.point
    }

    #[must_use]
    pub const fn pixel(&self) -> Point2D {
        self.pixel
    }

    /// Moves the vertex, keeping its id.
    pub const fn relocate(&mut self, point: GeoPoint, pixel: Point2D) {
        self.point = point;
        self.pixel = pixel;
    }

    /// Replaces the cached screen position after a viewport change.
    pub const fn set_pixel(&mut self, pixel: Point2D) {
        self.pixel = pixel;
    }
}
