//! One-shot loading of region geometry from `GeoJSON`.
//!
//! Accepts a `FeatureCollection` (or a lone `Feature`) whose features carry
//! `Polygon` or `MultiPolygon` geometries. The exterior ring of every polygon
//! becomes a region ring; interior rings (holes) are not kept. Features
//! without a usable name or polygonal geometry are skipped with a warning
//! rather than failing the whole load.

use std::path::Path;

use geo::{Geometry, LineString};
use geojson::{Feature, GeoJson};
use telemap_geo_models::GeoPoint;

use crate::region::normalize_ring;
use crate::{BoundaryError, Region};

/// Feature property keys tried, in order, for the region name.
///
/// Covers plain `name`, Natural Earth style `NAME`/`NAME_1`, and the
/// `st_nm` key used by common Indian state boundary datasets.
pub const DEFAULT_NAME_KEYS: &[&str] = &["name", "NAME", "st_nm", "NAME_1"];

/// Reads and parses a `GeoJSON` boundary file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid `GeoJSON`
/// feature collection.
pub fn load_regions_from_path(
    path: impl AsRef<Path>,
    name_keys: &[&str],
) -> Result<Vec<Region>, BoundaryError> {
    let path = path.as_ref();
    log::debug!("Reading boundaries from {}", path.display());
    let source = std::fs::read_to_string(path)?;
    load_regions_from_geojson(&source, name_keys)
}

/// Parses regions out of a `GeoJSON` document.
///
/// # Errors
///
/// Returns [`BoundaryError::GeoJson`] for malformed input and
/// [`BoundaryError::NotFeatureCollection`] for a bare geometry.
pub fn load_regions_from_geojson(
    source: &str,
    name_keys: &[&str],
) -> Result<Vec<Region>, BoundaryError> {
    let features = match source.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => return Err(BoundaryError::NotFeatureCollection),
    };

    let total = features.len();
    let regions: Vec<Region> = features
        .into_iter()
        .enumerate()
        .filter_map(|(i, feature)| region_from_feature(i, feature, name_keys))
        .collect();

    let rings: usize = regions.iter().map(|r| r.rings().len()).sum();
    log::info!(
        "Loaded {} regions ({rings} rings) from {total} features",
        regions.len()
    );

    Ok(regions)
}

fn region_from_feature(index: usize, feature: Feature, name_keys: &[&str]) -> Option<Region> {
    let Some(name) = feature_name(&feature, name_keys) else {
        log::warn!("Skipping feature {index}: no name property in {name_keys:?}");
        return None;
    };

    let Some(geometry) = feature.geometry else {
        log::warn!("Skipping feature {index} ({name}): no geometry");
        return None;
    };

    let geometry: Geometry<f64> = match geometry.try_into() {
        Ok(g) => g,
        Err(e) => {
            log::warn!("Skipping feature {index} ({name}): {e}");
            return None;
        }
    };

    let exteriors: Vec<&LineString<f64>> = match &geometry {
        Geometry::Polygon(p) => vec![p.exterior()],
        Geometry::MultiPolygon(mp) => mp.iter().map(geo::Polygon::exterior).collect(),
        _ => {
            log::warn!("Skipping feature {index} ({name}): geometry is not polygonal");
            return None;
        }
    };

    let mut rings = Vec::with_capacity(exteriors.len());
    for exterior in exteriors {
        let ring = normalize_ring(exterior_points(exterior));
        if ring.len() < 3 {
            log::warn!(
                "Dropping ring of feature {index} ({name}): only {} distinct points",
                ring.len()
            );
            continue;
        }
        rings.push(ring);
    }

    if rings.is_empty() {
        log::warn!("Skipping feature {index} ({name}): no usable rings");
        return None;
    }

    Region::new(name, rings).ok()
}

fn feature_name(feature: &Feature, name_keys: &[&str]) -> Option<String> {
    name_keys.iter().find_map(|key| {
        feature
            .property(key)
            .and_then(geojson::JsonValue::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
    })
}

fn exterior_points(exterior: &LineString<f64>) -> Vec<GeoPoint> {
    exterior.coords().map(|c| GeoPoint::new(c.y, c.x)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square(lng: f64, lat: f64) -> serde_json::Value {
        json!([[
            [lng, lat],
            [lng + 1.0, lat],
            [lng + 1.0, lat + 1.0],
            [lng, lat + 1.0],
            [lng, lat]
        ]])
    }

    fn collection() -> String {
        json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "st_nm": "Goa" },
                    "geometry": { "type": "Polygon", "coordinates": square(73.7, 15.0) }
                },
                {
                    "type": "Feature",
                    "properties": { "name": "Lakshadweep" },
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": [square(72.0, 10.0), square(73.0, 11.0)]
                    }
                },
                {
                    "type": "Feature",
                    "properties": { "id": 7 },
                    "geometry": { "type": "Polygon", "coordinates": square(80.0, 20.0) }
                },
                {
                    "type": "Feature",
                    "properties": { "name": "Capital" },
                    "geometry": { "type": "Point", "coordinates": [77.2, 28.6] }
                }
            ]
        })
        .to_string()
    }

    #[test]
    fn loads_polygon_and_multipolygon_features() {
        let regions = load_regions_from_geojson(&collection(), DEFAULT_NAME_KEYS).unwrap();
        let names: Vec<&str> = regions.iter().map(Region::name).collect();
        assert_eq!(names, ["Goa", "Lakshadweep"]);
        assert_eq!(regions[0].rings().len(), 1);
        assert_eq!(regions[0].rings()[0].len(), 4);
        assert_eq!(regions[1].rings().len(), 2);
    }

    #[test]
    fn swaps_geojson_axis_order() {
        let regions = load_regions_from_geojson(&collection(), DEFAULT_NAME_KEYS).unwrap();
        let first = regions[0].rings()[0][0];
        assert!((first.lat - 15.0).abs() < f64::EPSILON);
        assert!((first.lng - 73.7).abs() < f64::EPSILON);
    }

    #[test]
    fn honours_custom_name_keys() {
        let regions = load_regions_from_geojson(&collection(), &["st_nm"]).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].name(), "Goa");
    }

    #[test]
    fn rejects_bare_geometry() {
        let source = json!({ "type": "Point", "coordinates": [77.2, 28.6] }).to_string();
        assert!(matches!(
            load_regions_from_geojson(&source, DEFAULT_NAME_KEYS),
            Err(BoundaryError::NotFeatureCollection)
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            load_regions_from_geojson("{ not json", DEFAULT_NAME_KEYS),
            Err(BoundaryError::GeoJson(_))
        ));
    }
}
