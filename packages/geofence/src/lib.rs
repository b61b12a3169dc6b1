#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geofence validation against a country boundary and a user's assigned
//! regions.
//!
//! The validator composes a shared [`BoundaryIndex`] with a small set of
//! policy knobs ([`GeofenceSettings`]). Every check returns a structured
//! [`ValidationResult`]; callers decide whether a rejection is worth
//! recording in a [`ViolationLog`].

pub mod validator;
pub mod violations;

pub use telemap_boundary::BoundaryIndex;
pub use telemap_geofence_models::{
    BatchFailure, BatchValidation, GeofenceViolation, RegionWhitelist, ValidationResult,
    ViolationReason,
};
pub use validator::GeofenceValidator;
pub use violations::{ViolationLog, violation_for};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while setting up a validator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeofenceError {
    /// The configured country region is not present in the boundary index.
    #[error("country region {0:?} is not in the boundary index")]
    UnknownCountryRegion(String),

    /// A tolerance or band was negative or not finite.
    #[error("{name} must be a finite, non-negative distance (got {value})")]
    InvalidDistance {
        /// Setting name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
}

/// Policy knobs for the geofence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GeofenceSettings {
    /// Name of the region that bounds every admissible point.
    pub country_region: String,
    /// Points up to this far outside a boundary are still accepted, to
    /// absorb simplification error in the boundary data.
    pub border_tolerance_km: f64,
    /// Accepted points closer than this to the country border carry an
    /// advisory message.
    pub advisory_band_km: f64,
}

impl GeofenceSettings {
    /// Default country region name.
    pub const DEFAULT_COUNTRY: &'static str = "India";

    fn check(&self) -> Result<(), GeofenceError> {
        for (name, value) in [
            ("border_tolerance_km", self.border_tolerance_km),
            ("advisory_band_km", self.advisory_band_km),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(GeofenceError::InvalidDistance { name, value });
            }
        }
        Ok(())
    }
}

impl Default for GeofenceSettings {
    fn default() -> Self {
        Self {
            country_region: Self::DEFAULT_COUNTRY.to_string(),
            border_tolerance_km: 1.0,
            advisory_band_km: 5.0,
        }
    }
}
