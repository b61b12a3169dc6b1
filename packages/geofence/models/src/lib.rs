#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geofence validation result and audit types.
//!
//! Validation never fails with an error: every check produces a
//! [`ValidationResult`] that UI and notification layers render directly.
//! Rejected attempts can be recorded as immutable [`GeofenceViolation`]s.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use telemap_geo_models::GeoPoint;

/// Why a point or shape was rejected.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ViolationReason {
    /// Outside the country boundary, including the border tolerance.
    OutsideCountry,
    /// Inside the country but not in any of the user's assigned regions.
    OutsideAssignedRegions,
    /// A shape was submitted with fewer than three vertices.
    TooFewVertices,
}

/// Outcome of a single geofence check.
///
/// `is_valid = true` with a `message` is an advisory (for example a point
/// close to the border): the action goes ahead and the user is informed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
    /// Set whenever `is_valid` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ViolationReason>,
    /// Sub-region (state) the point was found in, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl ValidationResult {
    /// A plain pass with nothing to report.
    #[must_use]
    pub const fn accepted() -> Self {
        Self {
            is_valid: true,
            message: None,
            suggested_action: None,
            reason: None,
            region: None,
        }
    }

    /// A pass that carries an informational message.
    #[must_use]
    pub fn advisory(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::accepted()
        }
    }

    /// A rejection.
    #[must_use]
    pub fn rejected(
        reason: ViolationReason,
        message: impl Into<String>,
        suggested_action: impl Into<String>,
    ) -> Self {
        Self {
            is_valid: false,
            message: Some(message.into()),
            suggested_action: Some(suggested_action.into()),
            reason: Some(reason),
            region: None,
        }
    }

    /// Attaches the region the point was found in.
    #[must_use]
    pub fn with_region(mut self, region: Option<impl Into<String>>) -> Self {
        self.region = region.map(Into::into);
        self
    }

    /// Whether this is a pass that still has something to tell the user.
    #[must_use]
    pub const fn is_advisory(&self) -> bool {
        self.is_valid && self.message.is_some()
    }
}

/// The first point that failed a batch check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    /// Position of the offending point in the submitted sequence.
    pub index: usize,
    pub point: GeoPoint,
    pub result: ValidationResult,
}

/// Aggregate outcome of validating several points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchValidation {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_failure: Option<BatchFailure>,
}

impl BatchValidation {
    #[must_use]
    pub const fn passed() -> Self {
        Self {
            is_valid: true,
            first_failure: None,
        }
    }

    #[must_use]
    pub const fn failed(failure: BatchFailure) -> Self {
        Self {
            is_valid: false,
            first_failure: Some(failure),
        }
    }
}

/// Immutable audit record of a rejected placement attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceViolation {
    point: GeoPoint,
    timestamp: DateTime<Utc>,
    reason: ViolationReason,
}

impl GeofenceViolation {
    #[must_use]
    pub const fn new(point: GeoPoint, reason: ViolationReason, timestamp: DateTime<Utc>) -> Self {
        Self {
            point,
            timestamp,
            reason,
        }
    }

    #[must_use]
    pub const fn point(&self) -> GeoPoint {
        self.point
    }

    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub const fn reason(&self) -> ViolationReason {
        self.reason
    }
}

/// Region names a user may work in, supplied by the authorization layer.
///
/// An empty whitelist means unrestricted access (administrators), not
/// "nothing allowed".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionWhitelist(Vec<String>);

impl RegionWhitelist {
    /// Builds a whitelist, dropping blank entries.
    #[must_use]
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self(
            names
                .into_iter()
                .map(Into::into)
                .map(|n: String| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect(),
        )
    }

    /// A whitelist that places no restriction.
    #[must_use]
    pub const fn unrestricted() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `region` is on the list (case-insensitive).
    ///
    /// Always `true` for an unrestricted whitelist.
    #[must_use]
    pub fn allows(&self, region: &str) -> bool {
        self.is_unrestricted()
            || self
                .0
                .iter()
                .any(|name| name.eq_ignore_ascii_case(region.trim()))
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }
}
