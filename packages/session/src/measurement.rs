//! Distance tool: an open path with a running total.

use serde::Serialize;
use telemap_geo_models::{DistanceUnit, GeoPoint, Point2D, Vertex, VertexId, Viewport};
use telemap_geodesic::{format_distance, path_length, segment_lengths};
use telemap_projection::CoordinateProjector;

use crate::{Placement, PlacementContext, Rejection, SessionError, VertexPath};

/// Where a measurement session is in its lifecycle. There is no terminal
/// state; a cleared session starts over at `Empty`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasurementState {
    Empty,
    /// One vertex placed, no distance yet.
    Started,
    /// Two or more vertices; the cumulative distance is meaningful.
    Measuring,
}

/// Snapshot of a session for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementSummary {
    pub unit: DistanceUnit,
    pub vertex_count: usize,
    pub segments: Vec<f64>,
    pub cumulative_distance: f64,
    pub formatted: String,
}

/// A sequence of measurement vertices and the path length through them.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSession {
    path: VertexPath,
    unit: DistanceUnit,
    cumulative_distance: f64,
}

impl MeasurementSession {
    #[must_use]
    pub const fn new(unit: DistanceUnit) -> Self {
        Self {
            path: VertexPath::new(),
            unit,
            cumulative_distance: 0.0,
        }
    }

    /// Appends an already-validated point.
    pub fn add_point(&mut self, point: GeoPoint, pixel: Point2D) -> VertexId {
        let id = self.path.push(point, pixel);
        self.recompute();
        id
    }

    /// Projects, validates, and appends a pointer position.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] if the position fails the geofence; the
    /// session is unchanged.
    pub fn place(
        &mut self,
        ctx: &PlacementContext<'_>,
        x: f64,
        y: f64,
        viewport: Viewport,
    ) -> Result<Placement, Rejection> {
        let (point, pixel, result) = ctx.resolve(x, y, viewport)?;
        let vertex_id = self.add_point(point, pixel);
        Ok(Placement {
            vertex_id,
            point,
            result,
        })
    }

    /// Removes the most recently placed vertex.
    pub fn undo_last(&mut self) -> Option<Vertex> {
        let removed = self.path.pop();
        self.recompute();
        removed
    }

    /// Moves an existing vertex, keeping its id and position in the path.
    ///
    /// Returns the new cumulative distance.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::VertexNotFound`] if `id` is not in this
    /// session.
    pub fn move_point(
        &mut self,
        id: VertexId,
        point: GeoPoint,
        pixel: Point2D,
    ) -> Result<f64, SessionError> {
        if !self.path.relocate(id, point, pixel) {
            return Err(SessionError::VertexNotFound(id));
        }
        self.recompute();
        Ok(self.cumulative_distance)
    }

    pub fn clear(&mut self) {
        self.path.clear();
        self.recompute();
    }

    /// Switches the display unit. Stored vertices are not touched.
    pub fn set_unit(&mut self, unit: DistanceUnit) {
        self.unit = unit;
        self.recompute();
    }

    /// Recomputes cached pixel positions after a viewport change.
    pub fn reproject(&mut self, projector: &CoordinateProjector, viewport: Viewport) {
        self.path.reproject(projector, viewport);
    }

    #[must_use]
    pub const fn unit(&self) -> DistanceUnit {
        self.unit
    }

    /// Path length through the current vertices, in the current unit.
    #[must_use]
    pub const fn cumulative_distance(&self) -> f64 {
        self.cumulative_distance
    }

    /// Length of each leg, in the current unit.
    #[must_use]
    pub fn segments(&self) -> Vec<f64> {
        segment_lengths(&self.path.points(), self.unit)
    }

    #[must_use]
    pub const fn vertices(&self) -> &VertexPath {
        &self.path
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.path.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    #[must_use]
    pub fn state(&self) -> MeasurementState {
        match self.path.len() {
            0 => MeasurementState::Empty,
            1 => MeasurementState::Started,
            _ => MeasurementState::Measuring,
        }
    }

    #[must_use]
    pub fn summary(&self) -> MeasurementSummary {
        MeasurementSummary {
            unit: self.unit,
            vertex_count: self.path.len(),
            segments: self.segments(),
            cumulative_distance: self.cumulative_distance,
            formatted: format_distance(self.cumulative_distance, self.unit),
        }
    }

    fn recompute(&mut self) {
        self.cumulative_distance = path_length(&self.path.points(), self.unit);
    }
}

impl Default for MeasurementSession {
    fn default() -> Self {
        Self::new(DistanceUnit::Km)
    }
}
