//! Point, whitelist, and batch validation.

use std::sync::Arc;

use telemap_boundary::BoundaryIndex;
use telemap_geo_models::GeoPoint;
use telemap_geofence_models::{
    BatchFailure, BatchValidation, RegionWhitelist, ValidationResult, ViolationReason,
};

use crate::{GeofenceError, GeofenceSettings};

/// Checks points against the country boundary and assigned regions.
///
/// Never panics and never errors once constructed: every check yields a
/// [`ValidationResult`].
#[derive(Debug, Clone)]
pub struct GeofenceValidator {
    index: Arc<BoundaryIndex>,
    settings: GeofenceSettings,
}

impl GeofenceValidator {
    /// Creates a validator over a shared boundary index.
    ///
    /// # Errors
    ///
    /// Returns [`GeofenceError::UnknownCountryRegion`] if the configured
    /// country is missing from `index`, or
    /// [`GeofenceError::InvalidDistance`] for a negative tolerance or band.
    pub fn new(
        index: Arc<BoundaryIndex>,
        settings: GeofenceSettings,
    ) -> Result<Self, GeofenceError> {
        settings.check()?;
        if index.region(&settings.country_region).is_none() {
            return Err(GeofenceError::UnknownCountryRegion(
                settings.country_region,
            ));
        }
        Ok(Self { index, settings })
    }

    #[must_use]
    pub fn index(&self) -> &BoundaryIndex {
        &self.index
    }

    #[must_use]
    pub const fn settings(&self) -> &GeofenceSettings {
        &self.settings
    }

    /// Checks `point` against the country boundary.
    ///
    /// Points outside the border but within the tolerance, and points inside
    /// but within the advisory band, pass with an advisory message.
    #[must_use]
    pub fn validate_point(&self, point: GeoPoint) -> ValidationResult {
        let country = self.settings.country_region.as_str();

        if !point.is_valid() {
            return ValidationResult::rejected(
                ViolationReason::OutsideCountry,
                format!("Location ({point}) is not a valid coordinate."),
                format!("Select a point within {country}."),
            );
        }

        let strictly_inside = self.index.contains_point(country, point, 0.0);
        let inside_tolerance = strictly_inside
            || self
                .index
                .contains_point(country, point, self.settings.border_tolerance_km);

        if !inside_tolerance {
            return ValidationResult::rejected(
                ViolationReason::OutsideCountry,
                format!("Location ({point}) is outside the {country} boundary."),
                format!("Select a point within {country}."),
            );
        }

        let region = self.sub_regions(point).first().map(|s| (*s).to_string());

        let result = if strictly_inside {
            match self.border_distance(point) {
                Some(d) if d <= self.settings.advisory_band_km => ValidationResult::advisory(
                    format!("Location is {d:.1} km from the {country} border."),
                ),
                _ => ValidationResult::accepted(),
            }
        } else {
            ValidationResult::advisory(format!(
                "Location is on the {country} border (within the {:.1} km tolerance).",
                self.settings.border_tolerance_km
            ))
        };

        result.with_region(region)
    }

    /// Checks `point` against the country boundary and, for a restricted
    /// whitelist, against the user's assigned regions.
    ///
    /// An unrestricted (empty) whitelist applies the country check only. The
    /// country region is itself a region, so whitelisting it admits every
    /// point that passes the country check.
    #[must_use]
    pub fn validate_against_whitelist(
        &self,
        point: GeoPoint,
        whitelist: &RegionWhitelist,
    ) -> ValidationResult {
        let base = self.validate_point(point);
        if !base.is_valid {
            return base;
        }
        if whitelist.is_unrestricted() {
            return base;
        }

        let country = self.settings.country_region.as_str();
        let containing = self
            .index
            .region_names_containing(point, self.settings.border_tolerance_km);
        if let Some(allowed) = containing.iter().find(|r| whitelist.allows(r)) {
            // A whole-country assignment keeps the state found by the base check.
            if *allowed == country {
                return base;
            }
            return base.with_region(Some(*allowed));
        }

        let regions: Vec<&str> = containing.into_iter().filter(|r| *r != country).collect();

        let assigned = whitelist.names().join(", ");
        let message = regions.first().map_or_else(
            || format!("Location is not within any of your assigned regions ({assigned})."),
            |found| format!("Location is in {found}, outside your assigned regions ({assigned})."),
        );

        ValidationResult::rejected(
            ViolationReason::OutsideAssignedRegions,
            message,
            format!("Select a point within {assigned}."),
        )
        .with_region(regions.first().copied())
    }

    /// Validates points in order, stopping at the first rejection.
    ///
    /// Used before accepting a completed shape so one bad vertex blocks the
    /// whole shape.
    #[must_use]
    pub fn validate_many(
        &self,
        points: &[GeoPoint],
        whitelist: &RegionWhitelist,
    ) -> BatchValidation {
        points
            .iter()
            .enumerate()
            .find_map(|(index, point)| {
                let result = self.validate_against_whitelist(*point, whitelist);
                (!result.is_valid).then_some(BatchFailure {
                    index,
                    point: *point,
                    result,
                })
            })
            .map_or_else(BatchValidation::passed, BatchValidation::failed)
    }

    /// Regions other than the country that contain `point`, sorted.
    fn sub_regions(&self, point: GeoPoint) -> Vec<&str> {
        let country = self.settings.country_region.as_str();
        self.index
            .region_names_containing(point, self.settings.border_tolerance_km)
            .into_iter()
            .filter(|name| *name != country)
            .collect()
    }

    fn border_distance(&self, point: GeoPoint) -> Option<f64> {
        if self.settings.advisory_band_km <= 0.0 {
            return None;
        }
        self.index
            .distance_to_boundary_km(&self.settings.country_region, point)
    }
}
