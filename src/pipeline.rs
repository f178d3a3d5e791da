//! One full run: read inputs, decompose, trim, write outputs

use crate::config::RunConfig;
use crate::engine::{DecompositionReport, Decomposer};
use crate::error::RunError;
use crate::io;
use crate::memory::MemoryStore;
use crate::store::GeometryStore;
use crate::subtract::subtract_coastline;
use tracing::info;

/// What a run produced
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub decomposition: DecompositionReport,
    /// Deep-water areas written
    pub kept: usize,
    /// Coastline-trimmed areas written
    pub subtracted: usize,
}

/// Execute a run described by `config`
///
/// Inputs are read before anything is written, so a bad input leaves
/// existing outputs untouched.
pub fn run(config: &RunConfig) -> Result<RunSummary, RunError> {
    config.validate()?;

    let contours = io::read_contours(&config.contours, &config.elevation_property)?;
    let mask = io::read_mask(&config.coastline)?;
    info!(
        contours = contours.len(),
        mask_polygons = mask.0.len(),
        "inputs loaded"
    );

    let mut store = MemoryStore::with_contours(contours);
    let decomposition = Decomposer::new(&mut store, config.decomposition).run()?;

    let kept = store.kept_areas()?;
    io::write_areas(&config.areas_output, &kept)?;

    let subtracted = subtract_coastline(&mut store, &mask)?;
    io::write_subtracted(&config.subtracted_output, &store.subtracted()?)?;

    info!(
        kept = kept.len(),
        subtracted,
        areas = %config.areas_output.display(),
        subtracted_output = %config.subtracted_output.display(),
        "run complete"
    );

    Ok(RunSummary {
        decomposition,
        kept: kept.len(),
        subtracted,
    })
}
