//! Named regions made of one or more closed rings.

use telemap_geo_models::GeoPoint;

use crate::BoundaryError;

/// A named area such as a country or a state.
///
/// Each ring is an implicitly-closed boundary. A region with several rings
/// covers their union (islands, exclaves, multi-part states).
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    name: String,
    rings: Vec<Vec<GeoPoint>>,
}

impl Region {
    /// Creates a region, normalizing each ring.
    ///
    /// A trailing position equal to the first one is dropped, as are
    /// consecutive duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`BoundaryError::EmptyName`] for a blank name and
    /// [`BoundaryError::DegenerateRing`] if any ring has fewer than three
    /// distinct positions.
    pub fn new(
        name: impl Into<String>,
        rings: impl IntoIterator<Item = Vec<GeoPoint>>,
    ) -> Result<Self, BoundaryError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(BoundaryError::EmptyName);
        }

        let rings = rings
            .into_iter()
            .map(|ring| {
                let ring = normalize_ring(ring);
                if ring.len() < 3 {
                    return Err(BoundaryError::DegenerateRing {
                        region: name.clone(),
                        points: ring.len(),
                    });
                }
                Ok(ring)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { name, rings })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rings of this region, without the closing duplicate.
    #[must_use]
    pub fn rings(&self) -> &[Vec<GeoPoint>] {
        &self.rings
    }

    /// Merges another region's rings into this one.
    pub(crate) fn absorb(&mut self, other: Self) {
        self.rings.extend(other.rings);
    }
}

/// Drops consecutive duplicates and the closing position.
pub(crate) fn normalize_ring(mut ring: Vec<GeoPoint>) -> Vec<GeoPoint> {
    ring.dedup();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_closing_position() {
        let region = Region::new(
            "Goa",
            [vec![
                GeoPoint::new(15.0, 73.7),
                GeoPoint::new(15.0, 74.3),
                GeoPoint::new(15.8, 74.3),
                GeoPoint::new(15.0, 73.7),
            ]],
        )
        .unwrap();
        assert_eq!(region.rings()[0].len(), 3);
    }

    #[test]
    fn rejects_degenerate_ring() {
        let err = Region::new(
            "Line",
            [vec![
                GeoPoint::new(15.0, 73.7),
                GeoPoint::new(15.0, 74.3),
                GeoPoint::new(15.0, 73.7),
            ]],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BoundaryError::DegenerateRing { points: 2, .. }
        ));
    }

    #[test]
    fn rejects_blank_name() {
        assert!(matches!(
            Region::new("  ", Vec::<Vec<GeoPoint>>::new()),
            Err(BoundaryError::EmptyName)
        ));
    }

    #[test]
    fn trims_name() {
        let region = Region::new(
            " Kerala ",
            [vec![
                GeoPoint::new(8.0, 76.0),
                GeoPoint::new(8.0, 77.0),
                GeoPoint::new(9.0, 77.0),
            ]],
        )
        .unwrap();
        assert_eq!(region.name(), "Kerala");
    }
}
