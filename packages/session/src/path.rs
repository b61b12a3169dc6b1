//! Ordered, id-addressable vertex storage.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use telemap_geo_models::{GeoPoint, Point2D, Vertex, VertexId, Viewport};
use telemap_projection::CoordinateProjector;

/// Vertices in placement order, addressable by [`VertexId`].
///
/// Vertex ids are allocated monotonically, so keying by id keeps placement
/// order while giving logarithmic lookup for drag events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexPath {
    vertices: BTreeMap<VertexId, Vertex>,
}

impl VertexPath {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: BTreeMap::new(),
        }
    }

    /// Appends a new vertex and returns its id.
    pub fn push(&mut self, point: GeoPoint, pixel: Point2D) -> VertexId {
        let vertex = Vertex::new(point, pixel);
        let id = vertex.id();
        self.vertices.insert(id, vertex);
        id
    }

    /// Removes and returns the most recently placed vertex.
    pub fn pop(&mut self) -> Option<Vertex> {
        self.vertices.pop_last().map(|(_, v)| v)
    }

    pub fn remove(&mut self, id: VertexId) -> Option<Vertex> {
        self.vertices.remove(&id)
    }

    #[must_use]
    pub fn get(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// Moves a vertex in place. Returns `false` if `id` is unknown.
    pub fn relocate(&mut self, id: VertexId, point: GeoPoint, pixel: Point2D) -> bool {
        self.vertices.get_mut(&id).is_some_and(|v| {
            v.relocate(point, pixel);
            true
        })
    }

    /// Recomputes every cached pixel position for a new viewport.
    pub fn reproject(&mut self, projector: &CoordinateProjector, viewport: Viewport) {
        for vertex in self.vertices.values_mut() {
            vertex.set_pixel(projector.to_pixel(vertex.point(), viewport));
        }
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Vertex> {
        self.vertices.values().next_back()
    }

    /// Geographic positions in placement order.
    #[must_use]
    pub fn points(&self) -> Vec<GeoPoint> {
        self.vertices.values().map(Vertex::point).collect()
    }
}

impl Serialize for VertexPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.vertices.values())
    }
}
