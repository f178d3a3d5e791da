//! Run configuration
//!
//! Both structs deserialize from JSON; every field has a default so a
//! config file only needs to name what differs.

use crate::error::ConfigError;
use crate::model::Envelope;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default perpendicular probe offset, in working-reference units
pub const DEFAULT_PROBE_OFFSET: f64 = 1e-7;

/// Default name of the elevation property on contour features
pub const DEFAULT_ELEVATION_PROPERTY: &str = "elev";

/// Constants of the decomposition engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    /// Coarse starting region of every elevation
    pub envelope: Envelope,

    /// Distance the probe point is pushed off the contour
    pub probe_offset: f64,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            envelope: Envelope::default(),
            probe_offset: DEFAULT_PROBE_OFFSET,
        }
    }
}

impl DecompositionConfig {
    pub fn new(envelope: Envelope, probe_offset: f64) -> Self {
        Self {
            envelope,
            probe_offset,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.envelope.is_valid() {
            return Err(ConfigError::InvalidValue {
                field: "envelope",
                reason: format!(
                    "expected finite min < max, got ({}, {}, {}, {})",
                    self.envelope.min_x,
                    self.envelope.min_y,
                    self.envelope.max_x,
                    self.envelope.max_y
                ),
            });
        }
        if !self.probe_offset.is_finite() || self.probe_offset <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "probe_offset",
                reason: format!("must be a positive number, got {}", self.probe_offset),
            });
        }
        Ok(())
    }
}

/// Inputs, outputs and engine constants of one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// GeoJSON FeatureCollection of contour lines
    pub contours: PathBuf,

    /// GeoJSON polygon or multipolygon used to trim the kept areas
    pub coastline: PathBuf,

    /// Where the kept deep-water areas are written
    pub areas_output: PathBuf,

    /// Where the coastline-trimmed areas are written
    pub subtracted_output: PathBuf,

    /// Integer property carrying each contour's elevation
    pub elevation_property: String,

    pub decomposition: DecompositionConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            contours: PathBuf::from("deep_water_contours.geojson"),
            coastline: PathBuf::from("water_polygon.geojson"),
            areas_output: PathBuf::from("deep_water_areas.geojson"),
            subtracted_output: PathBuf::from("deep_water_areas_subtracted.geojson"),
            elevation_property: DEFAULT_ELEVATION_PROPERTY.to_string(),
            decomposition: DecompositionConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load and validate a JSON config file
    ///
    /// Relative paths inside the file are resolved against the file's
    /// directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: RunConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.elevation_property.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "elevation_property",
                reason: "must not be empty".to_string(),
            });
        }
        self.decomposition.validate()
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [
            &mut self.contours,
            &mut self.coastline,
            &mut self.areas_output,
            &mut self.subtracted_output,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}
