#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Distance and polygon measurement sessions.
//!
//! A session owns an ordered set of vertices and keeps its derived metrics
//! (cumulative distance, area, perimeter) in step with them: every mutating
//! call recomputes from the full vertex list before returning, so a caller
//! can never observe stale values.
//!
//! Pointer input flows through [`PlacementContext`]: pixel position to
//! lat/lng, geofence check, then append. Rejections come back as values,
//! carrying an audit record the caller may keep.

pub mod export;
pub mod measurement;
pub mod path;
pub mod polygon;

pub use measurement::{MeasurementSession, MeasurementState, MeasurementSummary};
pub use path::VertexPath;
pub use polygon::{
    DEFAULT_COLORS, DraftState, PolygonId, PolygonMetrics, PolygonSession, SavedPolygon,
};

use telemap_geo_models::{GeoPoint, Point2D, VertexId, Viewport};
use telemap_geofence::{GeofenceValidator, violation_for};
use telemap_geofence_models::{
    GeofenceViolation, RegionWhitelist, ValidationResult, ViolationReason,
};
use telemap_projection::CoordinateProjector;
use thiserror::Error;

/// Errors from session operations that address a vertex or polygon.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// No saved polygon has this id.
    #[error("polygon {0} not found")]
    PolygonNotFound(PolygonId),

    /// No vertex with this id exists where it was looked up.
    #[error("vertex {0} not found")]
    VertexNotFound(VertexId),

    /// The new position failed the geofence check; nothing was changed.
    #[error("position rejected by geofence")]
    Rejected(Box<ValidationResult>),
}

/// Why a draft polygon could not be completed. The draft is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompletionError {
    /// Fewer than three vertices have been placed.
    #[error("a polygon needs at least 3 vertices, draft has {count}")]
    TooFewVertices {
        /// Vertices currently in the draft.
        count: usize,
    },

    /// A vertex is outside the allowed area.
    #[error("vertex {index} failed the geofence check")]
    Rejected {
        /// Position of the first offending vertex in the draft.
        index: usize,
        /// The failing check.
        result: Box<ValidationResult>,
    },
}

impl CompletionError {
    /// The failure as a validation result (`is_valid` is always false).
    #[must_use]
    pub fn result(&self) -> ValidationResult {
        match self {
            Self::TooFewVertices { count } => ValidationResult::rejected(
                ViolationReason::TooFewVertices,
                format!("A polygon needs at least 3 vertices (currently {count})."),
                "Add more vertices before completing the polygon.",
            ),
            Self::Rejected { result, .. } => (**result).clone(),
        }
    }
}

/// Everything needed to turn a pointer event into a validated vertex.
#[derive(Debug, Clone, Copy)]
pub struct PlacementContext<'a> {
    pub projector: &'a CoordinateProjector,
    pub validator: &'a GeofenceValidator,
    pub whitelist: &'a RegionWhitelist,
}

impl<'a> PlacementContext<'a> {
    #[must_use]
    pub const fn new(
        projector: &'a CoordinateProjector,
        validator: &'a GeofenceValidator,
        whitelist: &'a RegionWhitelist,
    ) -> Self {
        Self {
            projector,
            validator,
            whitelist,
        }
    }

    /// Projects a pointer position and validates it.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] if the projected point fails the geofence.
    pub fn resolve(
        &self,
        x: f64,
        y: f64,
        viewport: Viewport,
    ) -> Result<(GeoPoint, Point2D, ValidationResult), Rejection> {
        let point = self.projector.to_geo(x, y, viewport);
        let result = self.validator.validate_against_whitelist(point, self.whitelist);
        if !result.is_valid {
            return Err(Rejection::new(point, result));
        }
        Ok((point, Point2D::new(x, y), result))
    }
}

/// A vertex that was accepted and appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub vertex_id: VertexId,
    pub point: GeoPoint,
    /// The passing check; may carry an advisory message.
    pub result: ValidationResult,
}

/// A pointer event whose position failed the geofence.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub point: GeoPoint,
    pub result: ValidationResult,
    /// Audit record for the attempt, stamped at rejection time.
    pub violation: Option<GeofenceViolation>,
}

impl Rejection {
    fn new(point: GeoPoint, result: ValidationResult) -> Self {
        let violation = violation_for(point, &result);
        Self {
            point,
            result,
            violation,
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use telemap_boundary::{BoundaryIndex, Region};
    use telemap_geo_models::GeoPoint;
    use telemap_geofence::{GeofenceSettings, GeofenceValidator};

    fn rect(name: &str, lat: (f64, f64), lng: (f64, f64)) -> Region {
        Region::new(
            name,
            [vec![
                GeoPoint::new(lat.0, lng.0),
                GeoPoint::new(lat.0, lng.1),
                GeoPoint::new(lat.1, lng.1),
                GeoPoint::new(lat.1, lng.0),
            ]],
        )
        .unwrap()
    }

    /// Country spanning lat 10..30, lng 70..90, split into two states at 80E.
    pub fn validator() -> GeofenceValidator {
        let index = BoundaryIndex::new([
            rect("India", (10.0, 30.0), (70.0, 90.0)),
            rect("Westland", (10.0, 30.0), (70.0, 80.0)),
            rect("Eastland", (10.0, 30.0), (80.0, 90.0)),
        ])
        .unwrap();
        GeofenceValidator::new(Arc::new(index), GeofenceSettings::default()).unwrap()
    }
}
