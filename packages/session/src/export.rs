//! GeoJSON export of saved polygons.

use geo::{Coord, LineString, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue, feature::Id};

use crate::{PolygonSession, SavedPolygon};

impl SavedPolygon {
    /// The polygon as a closed `geo` polygon (x = lng, y = lat).
    #[must_use]
    pub fn to_geo(&self) -> Polygon<f64> {
        let exterior: LineString<f64> = self
            .vertices()
            .iter()
            .map(|v| Coord {
                x: v.point().lng,
                y: v.point().lat,
            })
            .collect();
        Polygon::new(exterior, vec![])
    }

    /// The polygon as a GeoJSON feature with its name, colour, metrics and
    /// creation time as properties.
    #[must_use]
    pub fn to_feature(&self) -> Feature {
        let metrics = self.metrics();
        let mut properties = JsonObject::new();
        properties.insert("name".to_string(), JsonValue::from(self.name()));
        properties.insert("color".to_string(), JsonValue::from(self.color()));
        properties.insert("areaKm2".to_string(), JsonValue::from(metrics.area_km2));
        properties.insert(
            "perimeterKm".to_string(),
            JsonValue::from(metrics.perimeter_km),
        );
        properties.insert(
            "createdAt".to_string(),
            JsonValue::from(self.created_at().to_rfc3339()),
        );

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::from(&self.to_geo()))),
            id: Some(Id::String(self.id().to_string())),
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

impl PolygonSession {
    /// Saved polygons, in creation order, as a GeoJSON feature collection.
    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.saved().map(SavedPolygon::to_feature).collect(),
            foreign_members: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use telemap_geo_models::{GeoPoint, Point2D};
    use telemap_geofence_models::RegionWhitelist;

    use crate::{PolygonSession, fixtures};

    fn session_with_triangle() -> PolygonSession {
        let mut session = PolygonSession::new();
        for (lat, lng) in [(20.0, 75.0), (20.0, 76.0), (21.0, 75.0)] {
            session.add_vertex(GeoPoint::new(lat, lng), Point2D::default());
        }
        session
            .complete(
                &fixtures::validator(),
                &RegionWhitelist::unrestricted(),
                "Tower site",
                Some("#ff0000"),
            )
            .unwrap();
        session
    }

    #[test]
    fn empty_session_exports_empty_collection() {
        let collection = PolygonSession::new().to_feature_collection();
        assert!(collection.features.is_empty());
    }

    #[test]
    fn exported_ring_is_closed_lng_lat() {
        let session = session_with_triangle();
        let polygon = session.saved().next().unwrap().to_geo();
        let coords: Vec<_> = polygon.exterior().coords().copied().collect();
        assert_eq!(coords.len(), 4);
        assert_eq!(coords.first(), coords.last());
        assert!((coords[0].x - 75.0).abs() < f64::EPSILON);
        assert!((coords[0].y - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn feature_carries_properties() {
        let session = session_with_triangle();
        let collection = session.to_feature_collection();
        assert_eq!(collection.features.len(), 1);

        let feature = &collection.features[0];
        assert_eq!(
            feature.property("name").and_then(|v| v.as_str()),
            Some("Tower site")
        );
        assert_eq!(
            feature.property("color").and_then(|v| v.as_str()),
            Some("#ff0000")
        );
        let area = feature
            .property("areaKm2")
            .and_then(serde_json::Value::as_f64)
            .unwrap();
        assert!(area > 5000.0);
        assert!(feature.contains_property("createdAt"));

        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["features"][0]["geometry"]["type"], "Polygon");
        assert_eq!(json["features"][0]["id"], "polygon-1");
    }
}
