//! # geo-deep-water
//!
//! Turns bathymetric contour lines into non-overlapping deep-water polygons,
//! one set per elevation band, and trims them against a coastline mask.
//!
//! Coordinates are planar; the default survey envelope is in lon/lat
//! degrees (EPSG:4326) but any Cartesian system works.
//!
//! ## How it works
//!
//! 1. Every elevation starts from one coarse area covering the survey
//!    envelope
//! 2. Each contour at that elevation cuts every area it crosses; each
//!    fragment is then probed with a point pushed a tiny distance off the
//!    contour's midpoint segment and marked deep if it contains that point
//! 3. A cleanup pass drops every area not marked deep
//! 4. The surviving areas are intersected with the coastline mask
//!
//! The engine keeps no geometry of its own. It drives a [`GeometryStore`],
//! which is its working memory; [`MemoryStore`] is the in-process
//! implementation built on `geo` and `i_overlay`.
//!
//! ## Examples
//!
//! ### Decomposing in memory
//!
//! ```rust,ignore
//! use geo::line_string;
//! use geo_deep_water::{Decomposer, DecompositionConfig, Envelope, GeometryStore, MemoryStore};
//!
//! let mut store = MemoryStore::new();
//! // Counter-clockwise ring: the probe lands inside it
//! store.add_contour(10, line_string![
//!     (x: 3.0, y: 3.0), (x: 7.0, y: 3.0), (x: 7.0, y: 7.0), (x: 3.0, y: 7.0), (x: 3.0, y: 3.0),
//! ]);
//!
//! let config = DecompositionConfig::new(Envelope::new(0.0, 0.0, 10.0, 10.0), 1e-4);
//! let report = Decomposer::new(&mut store, config).run()?;
//!
//! println!("{} deep, {} shallow", report.deep, report.shallow);
//! assert_eq!(store.kept_areas()?.len(), 1);
//! ```
//!
//! ### Trimming to the coastline
//!
//! ```rust,ignore
//! use geo_deep_water::{subtract_coastline, GeometryStore};
//!
//! let mask = geo_deep_water::io::read_mask("water_polygon.geojson".as_ref())?;
//! let written = subtract_coastline(&mut store, &mask)?;
//!
//! for row in store.subtracted()? {
//!     println!("elev {}: {} parts", row.elevation, row.geometry.0.len());
//! }
//! ```
//!
//! ### A full run from files
//!
//! ```rust,ignore
//! use geo_deep_water::{run, RunConfig};
//!
//! let config = RunConfig::load("run.json".as_ref())?;
//! let summary = run(&config)?;
//! println!("kept {} areas", summary.kept);
//! ```
//!
//! ## Probe direction
//!
//! The probe point sits to the **left** of the contour's midpoint segment,
//! as seen walking the contour in vertex order. Contour producers decide
//! which side is deep by choosing the winding: counter-clockwise rings mark
//! their inside as deep, clockwise rings their outside.

mod config;
mod engine;
mod error;
pub mod geometry;
pub mod io;
mod keep;
mod logging;
mod memory;
mod model;
mod pipeline;
mod store;
mod subtract;

pub use config::{DecompositionConfig, RunConfig, DEFAULT_ELEVATION_PROPERTY, DEFAULT_PROBE_OFFSET};
pub use engine::{DecompositionReport, Decomposer};
pub use error::{ConfigError, IoError, RunError, StoreError};
pub use geometry::{ProbeCaveat, Slice};
pub use keep::Keep;
pub use logging::init_logging;
pub use memory::MemoryStore;
pub use model::{Area, AreaId, Contour, ContourId, Envelope, SubtractedArea};
pub use pipeline::{run, RunSummary};
pub use store::{GeometryStore, SplitOutcome};
pub use subtract::{subtract_areas, subtract_coastline};
