//! Append-only record of rejected placement attempts.

use chrono::Utc;
use telemap_geo_models::GeoPoint;
use telemap_geofence_models::{GeofenceViolation, ValidationResult};

/// Violations in the order they were recorded. Entries are never edited;
/// the log is only appended to or cleared as a whole.
#[derive(Debug, Clone, Default)]
pub struct ViolationLog {
    entries: Vec<GeofenceViolation>,
}

impl ViolationLog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn record(&mut self, violation: GeofenceViolation) {
        self.entries.push(violation);
    }

    /// Records a violation for `point` if `result` is a rejection.
    ///
    /// Returns the recorded entry.
    pub fn record_result(
        &mut self,
        point: GeoPoint,
        result: &ValidationResult,
    ) -> Option<&GeofenceViolation> {
        let violation = violation_for(point, result)?;
        self.entries.push(violation);
        self.entries.last()
    }

    #[must_use]
    pub fn entries(&self) -> &[GeofenceViolation] {
        &self.entries
    }

    #[must_use]
    pub fn latest(&self) -> Option<&GeofenceViolation> {
        self.entries.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Builds a violation stamped with the current time, or `None` if `result`
/// is a pass.
#[must_use]
pub fn violation_for(point: GeoPoint, result: &ValidationResult) -> Option<GeofenceViolation> {
    if result.is_valid {
        return None;
    }
    let reason = result.reason?;
    Some(GeofenceViolation::new(point, reason, Utc::now()))
}
