//! Area tool: a draft polygon plus the polygons already saved.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use telemap_geo_models::{DistanceUnit, GeoPoint, Point2D, Vertex, VertexId, Viewport};
use telemap_geodesic::{polygon_area, polygon_perimeter};
use telemap_geofence::GeofenceValidator;
use telemap_geofence_models::RegionWhitelist;
use telemap_projection::CoordinateProjector;

use crate::{
    CompletionError, Placement, PlacementContext, Rejection, SessionError, VertexPath,
};

/// Palette cycled through for polygons saved without an explicit colour.
pub const DEFAULT_COLORS: [&str; 8] = [
    "#3b82f6", "#ef4444", "#10b981", "#f59e0b", "#8b5cf6", "#ec4899", "#14b8a6", "#f97316",
];

/// Identity of a saved polygon, unique within its session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PolygonId(u64);

impl PolygonId {
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for PolygonId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "polygon-{}", self.0)
    }
}

/// Area and perimeter of a closed ring.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonMetrics {
    pub area_km2: f64,
    pub perimeter_km: f64,
}

impl PolygonMetrics {
    /// Metrics of the ring through `points`; zero below three points.
    #[must_use]
    pub fn of(points: &[GeoPoint]) -> Self {
        Self {
            area_km2: polygon_area(points),
            perimeter_km: polygon_perimeter(points, DistanceUnit::Km),
        }
    }
}

/// A completed polygon. Always has at least three vertices.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPolygon {
    id: PolygonId,
    name: String,
    vertices: VertexPath,
    color: String,
    metrics: PolygonMetrics,
    created_at: DateTime<Utc>,
}

impl SavedPolygon {
    #[must_use]
    pub const fn id(&self) -> PolygonId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn vertices(&self) -> &VertexPath {
        &self.vertices
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[must_use]
    pub const fn metrics(&self) -> PolygonMetrics {
        self.metrics
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Saved polygons are complete by construction.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        true
    }

    fn recompute(&mut self) {
        self.metrics = PolygonMetrics::of(&self.vertices.points());
    }
}

/// Progress of the draft polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum DraftState {
    Empty,
    /// One or two vertices; not yet a polygon.
    Drafting { vertices: usize },
    /// Three or more vertices; `complete` may be attempted.
    Closable { vertices: usize },
}

/// Draft polygon under construction plus every polygon saved so far.
#[derive(Debug, Clone, Default)]
pub struct PolygonSession {
    draft: VertexPath,
    draft_metrics: PolygonMetrics,
    saved: BTreeMap<PolygonId, SavedPolygon>,
    next_id: u64,
}

impl PolygonSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an already-validated vertex to the draft.
    pub fn add_vertex(&mut self, point: GeoPoint, pixel: Point2D) -> VertexId {
        let id = self.draft.push(point, pixel);
        self.recompute_draft();
        id
    }

    /// Projects, validates, and appends a pointer position to the draft.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] if the position fails the geofence; the draft
    /// is unchanged.
    pub fn place_vertex(
        &mut self,
        ctx: &PlacementContext<'_>,
        x: f64,
        y: f64,
        viewport: Viewport,
    ) -> Result<Placement, Rejection> {
        let (point, pixel, result) = ctx.resolve(x, y, viewport)?;
        let vertex_id = self.add_vertex(point, pixel);
        Ok(Placement {
            vertex_id,
            point,
            result,
        })
    }

    pub fn undo_last_vertex(&mut self) -> Option<Vertex> {
        let removed = self.draft.pop();
        self.recompute_draft();
        removed
    }

    pub fn clear_draft(&mut self) {
        self.draft.clear();
        self.recompute_draft();
    }

    /// Moves a draft vertex. Returns the new draft metrics.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::VertexNotFound`] if `vertex_id` is not in the
    /// draft.
    pub fn drag_draft_vertex(
        &mut self,
        vertex_id: VertexId,
        point: GeoPoint,
        pixel: Point2D,
    ) -> Result<PolygonMetrics, SessionError> {
        if !self.draft.relocate(vertex_id, point, pixel) {
            return Err(SessionError::VertexNotFound(vertex_id));
        }
        self.recompute_draft();
        Ok(self.draft_metrics)
    }

    /// Validates the draft and saves it as a polygon.
    ///
    /// A blank `name` becomes `Polygon <n>`; `None` for `color` picks from
    /// [`DEFAULT_COLORS`]. On success the draft is reset.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionError::TooFewVertices`] below three vertices, or
    /// [`CompletionError::Rejected`] for the first vertex that fails the
    /// geofence. The draft is untouched in both cases.
    pub fn complete(
        &mut self,
        validator: &GeofenceValidator,
        whitelist: &RegionWhitelist,
        name: &str,
        color: Option<&str>,
    ) -> Result<PolygonId, CompletionError> {
        let count = self.draft.len();
        if count < 3 {
            return Err(CompletionError::TooFewVertices { count });
        }

        let batch = validator.validate_many(&self.draft.points(), whitelist);
        if let Some(failure) = batch.first_failure {
            return Err(CompletionError::Rejected {
                index: failure.index,
                result: Box::new(failure.result),
            });
        }

        self.next_id += 1;
        let id = PolygonId(self.next_id);
        let name = match name.trim() {
            "" => format!("Polygon {}", self.next_id),
            trimmed => trimmed.to_string(),
        };
        let color = color.map_or_else(|| self.next_color().to_string(), ToString::to_string);

        let polygon = SavedPolygon {
            id,
            name,
            vertices: std::mem::take(&mut self.draft),
            color,
            metrics: self.draft_metrics,
            created_at: Utc::now(),
        };
        self.saved.insert(id, polygon);
        self.recompute_draft();

        Ok(id)
    }

    /// Moves a vertex of a saved polygon and recomputes that polygon only.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PolygonNotFound`] or
    /// [`SessionError::VertexNotFound`]; nothing changes in either case.
    pub fn drag_vertex(
        &mut self,
        polygon_id: PolygonId,
        vertex_id: VertexId,
        point: GeoPoint,
        pixel: Point2D,
    ) -> Result<PolygonMetrics, SessionError> {
        let polygon = self
            .saved
            .get_mut(&polygon_id)
            .ok_or(SessionError::PolygonNotFound(polygon_id))?;
        if !polygon.vertices.relocate(vertex_id, point, pixel) {
            return Err(SessionError::VertexNotFound(vertex_id));
        }
        polygon.recompute();
        Ok(polygon.metrics)
    }

    /// Like [`Self::drag_vertex`], but the new position must pass the
    /// geofence first.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Rejected`] if `point` fails validation, in
    /// addition to the lookup errors of [`Self::drag_vertex`].
    pub fn drag_vertex_checked(
        &mut self,
        validator: &GeofenceValidator,
        whitelist: &RegionWhitelist,
        polygon_id: PolygonId,
        vertex_id: VertexId,
        point: GeoPoint,
        pixel: Point2D,
    ) -> Result<PolygonMetrics, SessionError> {
        let polygon = self
            .saved
            .get(&polygon_id)
            .ok_or(SessionError::PolygonNotFound(polygon_id))?;
        if polygon.vertices.get(vertex_id).is_none() {
            return Err(SessionError::VertexNotFound(vertex_id));
        }

        let result = validator.validate_against_whitelist(point, whitelist);
        if !result.is_valid {
            return Err(SessionError::Rejected(Box::new(result)));
        }
        self.drag_vertex(polygon_id, vertex_id, point, pixel)
    }

    /// Removes a saved polygon and hands it back.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PolygonNotFound`] for an unknown id.
    pub fn delete(&mut self, polygon_id: PolygonId) -> Result<SavedPolygon, SessionError> {
        self.saved
            .remove(&polygon_id)
            .ok_or(SessionError::PolygonNotFound(polygon_id))
    }

    /// Renames a saved polygon. A blank name is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::PolygonNotFound`] for an unknown id.
    pub fn rename(&mut self, polygon_id: PolygonId, name: &str) -> Result<(), SessionError> {
        let polygon = self
            .saved
            .get_mut(&polygon_id)
            .ok_or(SessionError::PolygonNotFound(polygon_id))?;
        let name = name.trim();
        if !name.is_empty() {
            polygon.name = name.to_string();
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`SessionError::PolygonNotFound`] for an unknown id.
    pub fn recolor(&mut self, polygon_id: PolygonId, color: &str) -> Result<(), SessionError> {
        let polygon = self
            .saved
            .get_mut(&polygon_id)
            .ok_or(SessionError::PolygonNotFound(polygon_id))?;
        polygon.color = color.to_string();
        Ok(())
    }

    /// Recomputes cached pixel positions of the draft and every saved
    /// polygon after a viewport change.
    pub fn reproject(&mut self, projector: &CoordinateProjector, viewport: Viewport) {
        self.draft.reproject(projector, viewport);
        for polygon in self.saved.values_mut() {
            polygon.vertices.reproject(projector, viewport);
        }
    }

    #[must_use]
    pub const fn draft(&self) -> &VertexPath {
        &self.draft
    }

    /// Area and perimeter of the draft as if it were closed now.
    #[must_use]
    pub const fn draft_metrics(&self) -> PolygonMetrics {
        self.draft_metrics
    }

    #[must_use]
    pub fn draft_state(&self) -> DraftState {
        match self.draft.len() {
            0 => DraftState::Empty,
            vertices @ (1 | 2) => DraftState::Drafting { vertices },
            vertices => DraftState::Closable { vertices },
        }
    }

    /// Saved polygons in creation order.
    pub fn saved(&self) -> impl Iterator<Item = &SavedPolygon> {
        self.saved.values()
    }

    #[must_use]
    pub fn get(&self, polygon_id: PolygonId) -> Option<&SavedPolygon> {
        self.saved.get(&polygon_id)
    }

    #[must_use]
    pub fn saved_count(&self) -> usize {
        self.saved.len()
    }

    #[must_use]
    pub fn total_area_km2(&self) -> f64 {
        self.saved.values().map(|p| p.metrics.area_km2).sum()
    }

    /// Colour for the next polygon saved without an explicit choice.
    #[must_use]
    pub fn next_color(&self) -> &'static str {
        DEFAULT_COLORS[self.saved.len() % DEFAULT_COLORS.len()]
    }

    fn recompute_draft(&mut self) {
        self.draft_metrics = PolygonMetrics::of(&self.draft.points());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemap_geofence_models::ViolationReason;

    use crate::fixtures;

    fn p(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng)
    }

    fn draft(session: &mut PolygonSession, points: &[GeoPoint]) -> Vec<VertexId> {
        points
            .iter()
            .map(|point| session.add_vertex(*point, Point2D::default()))
            .collect()
    }

    fn saved_triangle(session: &mut PolygonSession) -> PolygonId {
        draft(session, &[p(20.0, 75.0), p(20.0, 76.0), p(21.0, 75.0)]);
        session
            .complete(
                &fixtures::validator(),
                &RegionWhitelist::unrestricted(),
                "Site A",
                None,
            )
            .unwrap()
    }

    #[test]
    fn draft_state_follows_vertex_count() {
        let mut session = PolygonSession::new();
        assert_eq!(session.draft_state(), DraftState::Empty);
        session.add_vertex(p(20.0, 75.0), Point2D::default());
        assert_eq!(session.draft_state(), DraftState::Drafting { vertices: 1 });
        session.add_vertex(p(20.0, 76.0), Point2D::default());
        assert_eq!(session.draft_state(), DraftState::Drafting { vertices: 2 });
        session.add_vertex(p(21.0, 75.0), Point2D::default());
        assert_eq!(session.draft_state(), DraftState::Closable { vertices: 3 });
    }

    #[test]
    fn draft_metrics_track_vertices() {
        let mut session = PolygonSession::new();
        draft(&mut session, &[p(20.0, 75.0), p(20.0, 76.0)]);
        assert!(session.draft_metrics().area_km2.abs() < f64::EPSILON);

        session.add_vertex(p(21.0, 75.0), Point2D::default());
        assert!(session.draft_metrics().area_km2 > 5000.0);
        assert!(session.draft_metrics().perimeter_km > 300.0);

        session.undo_last_vertex();
        assert!(session.draft_metrics().area_km2.abs() < f64::EPSILON);
    }

    #[test]
    fn complete_requires_three_vertices() {
        let mut session = PolygonSession::new();
        draft(&mut session, &[p(20.0, 75.0), p(20.0, 76.0)]);
        let err = session
            .complete(
                &fixtures::validator(),
                &RegionWhitelist::unrestricted(),
                "",
                None,
            )
            .unwrap_err();
        assert_eq!(err, CompletionError::TooFewVertices { count: 2 });
        assert!(!err.result().is_valid);
        assert_eq!(err.result().reason, Some(ViolationReason::TooFewVertices));
        assert_eq!(session.draft().len(), 2);
    }

    #[test]
    fn complete_with_outside_vertex_leaves_draft_intact() {
        let mut session = PolygonSession::new();
        let ids = draft(&mut session, &[p(20.0, 75.0), p(35.0, 76.0), p(21.0, 75.0)]);
        let metrics = session.draft_metrics();

        let err = session
            .complete(
                &fixtures::validator(),
                &RegionWhitelist::unrestricted(),
                "Site",
                None,
            )
            .unwrap_err();

        assert!(matches!(err, CompletionError::Rejected { index: 1, .. }));
        assert!(!err.result().is_valid);
        assert_eq!(session.draft().len(), 3);
        assert_eq!(session.draft().iter().map(Vertex::id).collect::<Vec<_>>(), ids);
        assert_eq!(session.draft_metrics(), metrics);
        assert_eq!(session.saved_count(), 0);
    }

    #[test]
    fn complete_rejects_vertex_outside_whitelist() {
        let mut session = PolygonSession::new();
        draft(&mut session, &[p(20.0, 75.0), p(20.0, 85.0), p(21.0, 75.0)]);
        let err = session
            .complete(
                &fixtures::validator(),
                &RegionWhitelist::new(["Westland"]),
                "",
                None,
            )
            .unwrap_err();
        assert_eq!(
            err.result().reason,
            Some(ViolationReason::OutsideAssignedRegions)
        );
    }

    #[test]
    fn complete_saves_and_resets_draft() {
        let mut session = PolygonSession::new();
        let id = saved_triangle(&mut session);

        assert_eq!(session.draft_state(), DraftState::Empty);
        assert!(session.draft_metrics().area_km2.abs() < f64::EPSILON);

        let polygon = session.get(id).unwrap();
        assert_eq!(polygon.name(), "Site A");
        assert_eq!(polygon.color(), DEFAULT_COLORS[0]);
        assert_eq!(polygon.vertices().len(), 3);
        assert!(polygon.is_complete());
        assert!(polygon.metrics().area_km2 > 5000.0);
    }

    #[test]
    fn blank_name_gets_numbered_default() {
        let mut session = PolygonSession::new();
        saved_triangle(&mut session);
        draft(&mut session, &[p(22.0, 75.0), p(22.0, 76.0), p(23.0, 75.0)]);
        let id = session
            .complete(
                &fixtures::validator(),
                &RegionWhitelist::unrestricted(),
                "   ",
                Some("#000000"),
            )
            .unwrap();
        let polygon = session.get(id).unwrap();
        assert_eq!(polygon.name(), "Polygon 2");
        assert_eq!(polygon.color(), "#000000");
    }

    #[test]
    fn drag_recomputes_only_that_polygon() {
        let mut session = PolygonSession::new();
        let first = saved_triangle(&mut session);
        let second = saved_triangle(&mut session);
        let untouched = session.get(second).unwrap().metrics();

        let vertex = session.get(first).unwrap().vertices().last().unwrap().id();
        let metrics = session
            .drag_vertex(first, vertex, p(22.0, 75.0), Point2D::default())
            .unwrap();

        assert!(metrics.area_km2 > untouched.area_km2);
        assert_eq!(session.get(first).unwrap().metrics(), metrics);
        assert_eq!(session.get(second).unwrap().metrics(), untouched);
    }

    #[test]
    fn repeated_drag_is_idempotent() {
        let mut session = PolygonSession::new();
        let id = saved_triangle(&mut session);
        let vertex = session.get(id).unwrap().vertices().last().unwrap().id();

        let once = session
            .drag_vertex(id, vertex, p(22.0, 75.5), Point2D::default())
            .unwrap();
        let twice = session
            .drag_vertex(id, vertex, p(22.0, 75.5), Point2D::default())
            .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn drag_with_unknown_ids_fails() {
        let mut session = PolygonSession::new();
        let id = saved_triangle(&mut session);
        let stranger = VertexId::next();
        assert_eq!(
            session.drag_vertex(id, stranger, p(22.0, 75.0), Point2D::default()),
            Err(SessionError::VertexNotFound(stranger))
        );

        let gone = session.delete(id).unwrap();
        let vertex = gone.vertices().last().unwrap().id();
        assert_eq!(
            session.drag_vertex(id, vertex, p(22.0, 75.0), Point2D::default()),
            Err(SessionError::PolygonNotFound(id))
        );
    }

    #[test]
    fn checked_drag_outside_country_leaves_polygon_untouched() {
        let mut session = PolygonSession::new();
        let id = saved_triangle(&mut session);
        let before = session.get(id).unwrap().clone();
        let vertex = before.vertices().last().unwrap().id();

        let err = session
            .drag_vertex_checked(
                &fixtures::validator(),
                &RegionWhitelist::unrestricted(),
                id,
                vertex,
                p(35.0, 75.0),
                Point2D::default(),
            )
            .unwrap_err();

        assert!(matches!(err, SessionError::Rejected(result) if !result.is_valid));
        assert_eq!(session.get(id), Some(&before));
    }

    #[test]
    fn checked_drag_inside_country_moves_vertex() {
        let mut session = PolygonSession::new();
        let id = saved_triangle(&mut session);
        let vertex = session.get(id).unwrap().vertices().last().unwrap().id();

        session
            .drag_vertex_checked(
                &fixtures::validator(),
                &RegionWhitelist::unrestricted(),
                id,
                vertex,
                p(22.0, 75.0),
                Point2D::default(),
            )
            .unwrap();
        assert_eq!(
            session.get(id).unwrap().vertices().get(vertex).unwrap().point(),
            p(22.0, 75.0)
        );
    }

    #[test]
    fn delete_removes_from_collection() {
        let mut session = PolygonSession::new();
        let id = saved_triangle(&mut session);
        assert_eq!(session.delete(id).unwrap().id(), id);
        assert_eq!(session.saved_count(), 0);
        assert_eq!(session.delete(id), Err(SessionError::PolygonNotFound(id)));
    }

    #[test]
    fn rename_and_recolor() {
        let mut session = PolygonSession::new();
        let id = saved_triangle(&mut session);
        session.rename(id, "  Depot  ").unwrap();
        session.rename(id, "").unwrap();
        session.recolor(id, "#123456").unwrap();
        let polygon = session.get(id).unwrap();
        assert_eq!(polygon.name(), "Depot");
        assert_eq!(polygon.color(), "#123456");
    }

    #[test]
    fn saved_iterates_in_creation_order_and_sums_area() {
        let mut session = PolygonSession::new();
        let first = saved_triangle(&mut session);
        let second = saved_triangle(&mut session);
        let ids: Vec<_> = session.saved().map(SavedPolygon::id).collect();
        assert_eq!(ids, [first, second]);

        let expected = session.get(first).unwrap().metrics().area_km2 * 2.0;
        assert!((session.total_area_km2() - expected).abs() < 1e-9);
        assert_eq!(session.get(second).unwrap().color(), DEFAULT_COLORS[1]);
    }

    #[test]
    fn drag_draft_vertex_recomputes_draft() {
        let mut session = PolygonSession::new();
        let ids = draft(&mut session, &[p(20.0, 75.0), p(20.0, 76.0), p(21.0, 75.0)]);
        let before = session.draft_metrics();
        let after = session
            .drag_draft_vertex(ids[2], p(22.0, 75.0), Point2D::default())
            .unwrap();
        assert!(after.area_km2 > before.area_km2);
    }

    #[test]
    fn place_vertex_rejection_leaves_draft_unchanged() {
        let validator = fixtures::validator();
        let projector = CoordinateProjector::default();
        let whitelist = RegionWhitelist::unrestricted();
        let ctx = PlacementContext::new(&projector, &validator, &whitelist);
        let viewport = Viewport::new(800.0, 600.0);

        let mut session = PolygonSession::new();
        session.place_vertex(&ctx, 400.0, 300.0, viewport).unwrap();
        assert!(session.place_vertex(&ctx, 0.0, 0.0, viewport).is_err());
        assert_eq!(session.draft().len(), 1);
    }
}
