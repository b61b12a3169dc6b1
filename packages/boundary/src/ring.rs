//! Per-ring geometry: inclusive even-odd containment and edge distance.
//!
//! Rings are stored as closed [`LineString`]s with `x = lng`, `y = lat`.

use geo::{Closest, ClosestPoint, Coord, LineString, Point};
use telemap_geo_models::{EARTH_RADIUS_KM, GeoPoint};

/// Collinearity slack for the on-edge test, in squared degrees.
const EDGE_EPSILON: f64 = 1e-12;

/// Builds a closed line string from an open ring.
pub fn closed_line(ring: &[GeoPoint]) -> LineString<f64> {
    let mut coords: Vec<Coord<f64>> = ring.iter().map(|p| to_coord(*p)).collect();
    if let Some(first) = coords.first().copied() {
        coords.push(first);
    }
    LineString::new(coords)
}

pub const fn to_coord(point: GeoPoint) -> Coord<f64> {
    Coord {
        x: point.lng,
        y: point.lat,
    }
}

/// Even-odd ray casting against a closed ring.
///
/// Points on an edge or vertex count as inside.
pub fn contains(line: &LineString<f64>, point: GeoPoint) -> bool {
    let p = to_coord(point);
    let mut inside = false;

    for edge in line.0.windows(2) {
        let (a, b) = (edge[0], edge[1]);

        if on_segment(a, b, p) {
            return true;
        }

        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x).mul_add((p.y - a.y) / (b.y - a.y), a.x);
            if p.x < x_cross {
                inside = !inside;
            }
        }
    }

    inside
}

/// Great-circle distance in km from `point` to the nearest edge of the ring.
///
/// The nearest point is found in degree space, which is adequate for the
/// border-tolerance bands this is used for (a few km).
pub fn distance_to_edge_km(line: &LineString<f64>, point: GeoPoint) -> Option<f64> {
    let query = Point::new(point.lng, point.lat);
    let nearest = match line.closest_point(&query) {
        Closest::Intersection(p) | Closest::SinglePoint(p) => p,
        Closest::Indeterminate => return None,
    };
    Some(telemap_geodesic::distance(
        point,
        GeoPoint::new(nearest.y(), nearest.x()),
        EARTH_RADIUS_KM,
    ))
}

fn on_segment(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> bool {
    let cross = (b.x - a.x).mul_add(p.y - a.y, -((b.y - a.y) * (p.x - a.x)));
    if cross.abs() > EDGE_EPSILON {
        return false;
    }
    p.x >= a.x.min(b.x) - EDGE_EPSILON
        && p.x <= a.x.max(b.x) + EDGE_EPSILON
        && p.y >= a.y.min(b.y) - EDGE_EPSILON
        && p.y <= a.y.max(b.y) + EDGE_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> LineString<f64> {
        closed_line(&[
            GeoPoint::new(10.0, 70.0),
            GeoPoint::new(10.0, 80.0),
            GeoPoint::new(20.0, 80.0),
            GeoPoint::new(20.0, 70.0),
        ])
    }

    #[test]
    fn interior_point_is_inside() {
        assert!(contains(&square(), GeoPoint::new(15.0, 75.0)));
    }

    #[test]
    fn exterior_point_is_outside() {
        assert!(!contains(&square(), GeoPoint::new(25.0, 75.0)));
        assert!(!contains(&square(), GeoPoint::new(15.0, 85.0)));
    }

    #[test]
    fn vertex_and_edge_points_are_inside() {
        assert!(contains(&square(), GeoPoint::new(10.0, 70.0)));
        assert!(contains(&square(), GeoPoint::new(20.0, 75.0)));
        assert!(contains(&square(), GeoPoint::new(15.0, 80.0)));
    }

    #[test]
    fn concave_notch_is_outside() {
        let notched = closed_line(&[
            GeoPoint::new(10.0, 70.0),
            GeoPoint::new(10.0, 80.0),
            GeoPoint::new(20.0, 80.0),
            GeoPoint::new(15.0, 75.0),
            GeoPoint::new(20.0, 70.0),
        ]);
        assert!(!contains(&notched, GeoPoint::new(19.0, 75.0)));
        assert!(contains(&notched, GeoPoint::new(12.0, 75.0)));
    }

    #[test]
    fn edge_distance_for_point_outside() {
        // One degree of latitude north of the top edge.
        let d = distance_to_edge_km(&square(), GeoPoint::new(21.0, 75.0)).unwrap();
        assert!((d - 111.19).abs() < 0.5, "distance was {d}");
    }

    #[test]
    fn edge_distance_is_zero_on_edge() {
        let d = distance_to_edge_km(&square(), GeoPoint::new(20.0, 75.0)).unwrap();
        assert!(d < 1e-6);
    }
}
