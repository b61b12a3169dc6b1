#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! TOML configuration and wiring for the telemap core.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working setup centred on India. A minimal file looks like:
//!
//! ```toml
//! boundary_path = "data/india_states.geojson"
//! default_unit = "km"
//! whitelist = ["Karnataka", "Kerala"]
//!
//! [geofence]
//! country_region = "India"
//! border_tolerance_km = 1.0
//! advisory_band_km = 5.0
//! ```

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::{Deserialize, Serialize};
use telemap_boundary::{BoundaryError, BoundaryIndex, DEFAULT_NAME_KEYS, load_regions_from_path};
use telemap_geo_models::{DistanceUnit, GeoBounds};
use telemap_geofence::{GeofenceError, GeofenceSettings, GeofenceValidator};
use telemap_geofence_models::RegionWhitelist;
use telemap_projection::{CoordinateProjector, ProjectionError};
use thiserror::Error;

/// Errors raised while loading configuration or building from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`Config`].
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// No boundary file was configured or given.
    #[error("no boundary file configured")]
    MissingBoundaryPath,

    /// The boundary file could not be loaded.
    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    /// The map bounds are unusable.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// The geofence settings do not fit the boundary data.
    #[error(transparent)]
    Geofence(#[from] GeofenceError),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// `GeoJSON` file holding the country and state boundaries.
    pub boundary_path: Option<PathBuf>,
    /// Feature property keys tried, in order, for a region's name.
    pub name_keys: Vec<String>,
    /// Map extent that pixel space is stretched over.
    pub bounds: GeoBounds,
    pub geofence: GeofenceSettings,
    pub default_unit: DistanceUnit,
    /// Regions the user may work in; empty means the whole country.
    pub whitelist: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            boundary_path: None,
            name_keys: DEFAULT_NAME_KEYS.iter().map(ToString::to_string).collect(),
            bounds: GeoBounds::INDIA,
            geofence: GeofenceSettings::default(),
            default_unit: DistanceUnit::Km,
            whitelist: Vec::new(),
        }
    }
}

impl Config {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the text is not valid TOML or a
    /// field has the wrong type.
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Reads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Toml`] if it does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        log::info!("Loading config from {}", path.display());
        let config = Self::from_toml_str(&std::fs::read_to_string(path)?)?;
        log::debug!("Config: {config:?}");
        Ok(config)
    }

    /// Projector over the configured bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Projection`] for inverted or non-finite bounds.
    pub fn projector(&self) -> Result<CoordinateProjector, ConfigError> {
        Ok(CoordinateProjector::new(self.bounds)?)
    }

    #[must_use]
    pub fn region_whitelist(&self) -> RegionWhitelist {
        RegionWhitelist::new(self.whitelist.iter().cloned())
    }

    /// Loads the boundary file and builds the spatial index.
    ///
    /// `path` overrides [`Self::boundary_path`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingBoundaryPath`] if neither is set, or
    /// [`ConfigError::Boundary`] if loading or indexing fails.
    pub fn load_index(&self, path: Option<&Path>) -> Result<Arc<BoundaryIndex>, ConfigError> {
        let path = path
            .or(self.boundary_path.as_deref())
            .ok_or(ConfigError::MissingBoundaryPath)?;
        let name_keys: Vec<&str> = self.name_keys.iter().map(String::as_str).collect();

        let regions = load_regions_from_path(path, &name_keys)?;
        let index = BoundaryIndex::new(regions)?;
        log::info!(
            "Indexed {} regions ({} rings) from {}",
            index.len(),
            index.ring_count(),
            path.display()
        );
        Ok(Arc::new(index))
    }

    /// Validator over `index` with the configured geofence settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Geofence`] if the country region is missing
    /// from `index` or a distance setting is invalid.
    pub fn validator(&self, index: Arc<BoundaryIndex>) -> Result<GeofenceValidator, ConfigError> {
        Ok(GeofenceValidator::new(index, self.geofence.clone())?)
    }
}
