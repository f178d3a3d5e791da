//! Records held by a geometry store
//!
//! Contours are immutable inputs. Areas are the mutable unit of work of the
//! decomposition engine. Subtracted areas are the derived output of the
//! coastline step.

use crate::keep::Keep;
use geo::{coord, LineString, MultiPolygon, Polygon, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a contour row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContourId(pub u64);

/// Identifier of an area row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AreaId(pub u64);

impl fmt::Display for ContourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AreaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bathymetric contour line tagged with its elevation
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub id: ContourId,
    pub elevation: i32,
    pub curve: LineString<f64>,
}

/// A polygon fragment belonging to one elevation band
#[derive(Debug, Clone, PartialEq)]
pub struct Area {
    pub id: AreaId,
    pub elevation: i32,
    pub polygon: Polygon<f64>,
    pub keep: Keep,
}

/// An area trimmed against the coastline mask
///
/// The geometry may be empty or have several parts.
#[derive(Debug, Clone, PartialEq)]
pub struct SubtractedArea {
    pub elevation: i32,
    pub source: AreaId,
    pub geometry: MultiPolygon<f64>,
}

/// Survey envelope used as the coarse starting region of every elevation
///
/// Coordinates are in the working reference (lon/lat degrees for the
/// default).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Envelope {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// True when the bounds are finite and span a non-zero area
    pub fn is_valid(&self) -> bool {
        [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x < self.max_x
            && self.min_y < self.max_y
    }

    /// Closed rectangular polygon covering the envelope
    pub fn to_polygon(&self) -> Polygon<f64> {
        Rect::new(
            coord! { x: self.min_x, y: self.min_y },
            coord! { x: self.max_x, y: self.max_y },
        )
        .to_polygon()
    }
}

impl Default for Envelope {
    /// The Cyclades survey window in EPSG:4326
    fn default() -> Self {
        Self::new(23.96, 36.02, 26.29, 38.15)
    }
}
