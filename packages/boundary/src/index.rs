//! R-tree backed point-in-region index.

use std::collections::{BTreeMap, BTreeSet};

use geo::{BoundingRect, LineString};
use rstar::{AABB, RTree, RTreeObject};
use telemap_geo_models::GeoPoint;
use telemap_geodesic::km_to_arc_degrees;

use crate::{BoundaryError, Region, ring};

/// Relative slack on the R-tree search box. Candidates are re-checked
/// exactly, so a wider box only costs extra ring tests.
const SEARCH_MARGIN: f64 = 1.01;

/// A single ring stored in the R-tree with the region it belongs to.
struct RingEntry {
    /// Position of the owning region in the sorted name list.
    region: usize,
    envelope: AABB<[f64; 2]>,
    line: LineString<f64>,
}

impl RTreeObject for RingEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Immutable set of named regions with containment queries.
///
/// Constructed once from loaded region geometry and shared read-only by all
/// validators. Region names are kept sorted so listings and multi-region
/// answers are deterministic.
pub struct BoundaryIndex {
    names: Vec<String>,
    regions: Vec<Region>,
    rings: RTree<RingEntry>,
}

impl BoundaryIndex {
    /// Builds the index. Regions sharing a name are merged into one.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::Empty`] if `regions` is empty.
    pub fn new(regions: impl IntoIterator<Item = Region>) -> Result<Self, BoundaryError> {
        let mut merged: BTreeMap<String, Region> = BTreeMap::new();
        for region in regions {
            match merged.get_mut(region.name()) {
                Some(existing) => existing.absorb(region),
                None => {
                    merged.insert(region.name().to_string(), region);
                }
            }
        }

        if merged.is_empty() {
            return Err(BoundaryError::Empty);
        }

        let (names, regions): (Vec<String>, Vec<Region>) = merged.into_iter().unzip();

        let entries: Vec<RingEntry> = regions
            .iter()
            .enumerate()
            .flat_map(|(idx, region)| {
                region.rings().iter().map(move |r| {
                    let line = ring::closed_line(r);
                    RingEntry {
                        region: idx,
                        envelope: compute_envelope(&line),
                        line,
                    }
                })
            })
            .collect();

        Ok(Self {
            names,
            regions,
            rings: RTree::bulk_load(entries),
        })
    }

    /// Whether `point` lies in the named region.
    ///
    /// A point on a ring edge counts as inside. With `tolerance_km > 0`,
    /// points within that great-circle distance of any ring edge also count.
    /// Unknown region names contain nothing.
    #[must_use]
    pub fn contains_point(&self, name: &str, point: GeoPoint, tolerance_km: f64) -> bool {
        let Some(idx) = self.position(name) else {
            return false;
        };

        self.candidates(point, tolerance_km)
            .filter(|entry| entry.region == idx)
            .any(|entry| ring_accepts(entry, point, tolerance_km))
    }

    /// Sorted names of every region containing `point`.
    #[must_use]
    pub fn region_names_containing(&self, point: GeoPoint, tolerance_km: f64) -> Vec<&str> {
        let hits: BTreeSet<usize> = self
            .candidates(point, tolerance_km)
            .filter(|entry| ring_accepts(entry, point, tolerance_km))
            .map(|entry| entry.region)
            .collect();

        hits.into_iter().map(|idx| self.names[idx].as_str()).collect()
    }

    /// All region names, sorted.
    #[must_use]
    pub fn names_index(&self) -> &[String] {
        &self.names
    }

    /// Great-circle distance in km from `point` to the nearest edge of the
    /// named region, whether the point is inside or outside it.
    ///
    /// Returns `None` for unknown names.
    #[must_use]
    pub fn distance_to_boundary_km(&self, name: &str, point: GeoPoint) -> Option<f64> {
        let idx = self.position(name)?;
        self.rings
            .iter()
            .filter(|entry| entry.region == idx)
            .filter_map(|entry| ring::distance_to_edge_km(&entry.line, point))
            .min_by(f64::total_cmp)
    }

    #[must_use]
    pub fn region(&self, name: &str) -> Option<&Region> {
        self.position(name).map(|idx| &self.regions[idx])
    }

    /// Number of distinct regions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Total number of indexed rings across all regions.
    #[must_use]
    pub fn ring_count(&self) -> usize {
        self.rings.size()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.names
            .binary_search_by(|n| n.as_str().cmp(name))
            .ok()
    }

    fn candidates(
        &self,
        point: GeoPoint,
        tolerance_km: f64,
    ) -> impl Iterator<Item = &RingEntry> + '_ {
        let d_lat = km_to_arc_degrees(tolerance_km.max(0.0)) * SEARCH_MARGIN;
        // Meridians converge poleward, so size the longitude half-width by
        // the highest latitude the box reaches.
        let max_lat = (point.lat.abs() + d_lat).min(90.0);
        let cos_lat = max_lat.to_radians().cos();
        let d_lng = if cos_lat > 1e-6 {
            (d_lat / cos_lat).min(180.0)
        } else {
            180.0
        };
        let query_env = AABB::from_corners(
            [point.lng - d_lng, point.lat - d_lat],
            [point.lng + d_lng, point.lat + d_lat],
        );
        self.rings.locate_in_envelope_intersecting(&query_env)
    }
}

impl std::fmt::Debug for BoundaryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundaryIndex")
            .field("names", &self.names)
            .field("rings", &self.rings.size())
            .finish_non_exhaustive()
    }
}

fn ring_accepts(entry: &RingEntry, point: GeoPoint, tolerance_km: f64) -> bool {
    ring::contains(&entry.line, point)
        || (tolerance_km > 0.0
            && ring::distance_to_edge_km(&entry.line, point).is_some_and(|d| d <= tolerance_km))
}

/// Compute the bounding box envelope for a ring.
fn compute_envelope(line: &LineString<f64>) -> AABB<[f64; 2]> {
    line.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}
