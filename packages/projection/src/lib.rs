#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Equirectangular mapping between pixel space and geographic coordinates.
//!
//! The map surface is treated as a linear stretch of a fixed lat/lng box:
//! the top edge is `lat_max`, the left edge is `lng_min`. Both directions
//! are total functions. Points outside the viewport or the box are mapped
//! like any other; deciding whether they are admissible is the geofence
//! validator's job.

use telemap_geo_models::{GeoBounds, GeoPoint, Point2D, Viewport};
use thiserror::Error;

/// Errors raised when configuring a projector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    /// The bounding box is inverted, empty, or has non-finite corners.
    #[error("invalid bounds: {0:?}")]
    InvalidBounds(GeoBounds),
}

/// Converts between pixel and geographic coordinates for one bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateProjector {
    bounds: GeoBounds,
}

impl CoordinateProjector {
    /// Creates a projector over `bounds`.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::InvalidBounds`] if the box has a zero or
    /// negative span on either axis.
    pub fn new(bounds: GeoBounds) -> Result<Self, ProjectionError> {
        if !bounds.is_well_formed() {
            return Err(ProjectionError::InvalidBounds(bounds));
        }
        Ok(Self { bounds })
    }

    #[must_use]
    pub const fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    /// Pixel position to latitude/longitude.
    #[must_use]
    pub fn to_geo(&self, x: f64, y: f64, viewport: Viewport) -> GeoPoint {
        let b = &self.bounds;
        let lat = (y / viewport.height).mul_add(-b.lat_span(), b.lat_max);
        let lng = (x / viewport.width).mul_add(b.lng_span(), b.lng_min);
        GeoPoint::new(lat, lng)
    }

    /// Latitude/longitude to pixel position. Inverse of [`Self::to_geo`].
    #[must_use]
    pub fn to_pixel(&self, point: GeoPoint, viewport: Viewport) -> Point2D {
        let b = &self.bounds;
        let x = (point.lng - b.lng_min) / b.lng_span() * viewport.width;
        let y = (b.lat_max - point.lat) / b.lat_span() * viewport.height;
        Point2D::new(x, y)
    }

    /// Whether `point` lies within the projected box.
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        self.bounds.contains(point)
    }
}

impl Default for CoordinateProjector {
    fn default() -> Self {
        Self {
            bounds: GeoBounds::INDIA,
        }
    }
}
