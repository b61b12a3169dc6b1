#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory boundary index for geofencing.
//!
//! Region polygons (a country outline, its states) are loaded once at
//! startup, bulk-loaded into an R-tree keyed by ring envelopes, and then
//! queried read-only for point-in-region tests. The index is immutable after
//! construction and is shared behind an `Arc` by every validator.

pub mod index;
pub mod loader;
pub mod region;
mod ring;

pub use index::BoundaryIndex;
pub use loader::{DEFAULT_NAME_KEYS, load_regions_from_geojson, load_regions_from_path};
pub use region::Region;

use thiserror::Error;

/// Errors that can occur while loading or indexing boundaries.
#[derive(Debug, Error)]
pub enum BoundaryError {
    /// Reading the boundary file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The boundary source is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The `GeoJSON` document is neither a `FeatureCollection` nor a `Feature`.
    #[error("expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    /// A ring has fewer than three distinct positions.
    #[error("region {region:?} has a ring with only {points} distinct points")]
    DegenerateRing {
        /// Name of the region the ring belongs to.
        region: String,
        /// Number of distinct positions found.
        points: usize,
    },

    /// A region was given with an empty name.
    #[error("region name must not be empty")]
    EmptyName,

    /// No usable regions were supplied.
    #[error("no regions to index")]
    Empty,
}
