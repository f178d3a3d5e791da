//! Area decomposition engine
//!
//! Turns contours into deep-water areas, one elevation band at a time:
//!
//! 1. Every elevation gets one coarse area covering the survey envelope
//! 2. Each contour at that elevation (ascending identifier) splits every
//!    current area it intersects; the parent is deleted and each fragment
//!    is classified deep or shallow with the probe test
//! 3. Once all elevations are done, the cleanup pass deletes every area not
//!    classified deep, including coarse areas no contour ever touched
//!
//! Within one elevation every step is committed to the store before the
//! next query, so later contours see the fragments of earlier ones.

use crate::config::DecompositionConfig;
use crate::error::StoreError;
use crate::model::{AreaId, ContourId};
use crate::store::{GeometryStore, SplitOutcome};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Counters collected while decomposing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecompositionReport {
    pub elevations: usize,
    pub contours: usize,
    /// Splits where the contour crossed the area's interior
    pub splits: usize,
    /// Splits that returned the area unchanged
    pub unchanged: usize,
    /// Splits of degenerate areas that produced nothing
    pub empty: usize,
    pub deep: usize,
    pub shallow: usize,
    /// Area/contour pairs abandoned after a geometry failure
    pub skipped: usize,
    /// Areas deleted by the cleanup pass
    pub removed: usize,
    pub total_ms: f64,
}

impl DecompositionReport {
    fn absorb(&mut self, other: &DecompositionReport) {
        self.elevations += other.elevations;
        self.contours += other.contours;
        self.splits += other.splits;
        self.unchanged += other.unchanged;
        self.empty += other.empty;
        self.deep += other.deep;
        self.shallow += other.shallow;
        self.skipped += other.skipped;
        self.removed += other.removed;
    }
}

/// Drives a [`GeometryStore`] through the decomposition of all elevations
pub struct Decomposer<'a, S: GeometryStore> {
    store: &'a mut S,
    config: DecompositionConfig,
}

impl<'a, S: GeometryStore> Decomposer<'a, S> {
    pub fn new(store: &'a mut S, config: DecompositionConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &DecompositionConfig {
        &self.config
    }

    /// Decompose every elevation and run the cleanup pass
    ///
    /// Existing areas are cleared first. Geometry failures skip the
    /// offending area/contour pair; any other store error aborts the run.
    pub fn run(&mut self) -> Result<DecompositionReport, StoreError> {
        let start = Instant::now();
        let mut report = DecompositionReport::default();

        self.store.clear_all_areas()?;

        let elevations = self.store.list_distinct_elevations()?;
        info!(count = elevations.len(), "decomposing elevations");

        for &elevation in &elevations {
            self.store
                .create_initial_area(elevation, &self.config.envelope)?;
        }

        for (i, &elevation) in elevations.iter().enumerate() {
            info!(elevation, "elevation {}/{}", i + 1, elevations.len());
            let band = self.decompose_elevation(elevation)?;
            report.absorb(&band);
        }

        report.removed = self.cleanup()?;
        report.total_ms = start.elapsed().as_secs_f64() * 1000.0;

        info!(
            elevations = report.elevations,
            contours = report.contours,
            splits = report.splits,
            deep = report.deep,
            shallow = report.shallow,
            skipped = report.skipped,
            removed = report.removed,
            total_ms = report.total_ms,
            "decomposition complete"
        );
        Ok(report)
    }

    /// Apply every contour of one elevation to its current areas
    ///
    /// The elevation's coarse area must already exist.
    pub fn decompose_elevation(
        &mut self,
        elevation: i32,
    ) -> Result<DecompositionReport, StoreError> {
        let start = Instant::now();
        let mut report = DecompositionReport {
            elevations: 1,
            ..Default::default()
        };

        for contour in self.store.list_contour_ids(elevation)? {
            self.apply_contour(elevation, contour, &mut report)?;
            report.contours += 1;
        }

        report.total_ms = start.elapsed().as_secs_f64() * 1000.0;
        debug!(
            elevation,
            contours = report.contours,
            deep = report.deep,
            shallow = report.shallow,
            total_ms = report.total_ms,
            "elevation done"
        );
        Ok(report)
    }

    /// Recompute one elevation from scratch
    ///
    /// Deletes the elevation's areas, recreates its coarse area and replays
    /// its contours. Run [`cleanup`](Self::cleanup) afterwards.
    pub fn rerun_elevation(
        &mut self,
        elevation: i32,
    ) -> Result<DecompositionReport, StoreError> {
        let dropped = self.store.delete_areas_at(elevation)?;
        debug!(elevation, dropped, "reset elevation");
        self.store
            .create_initial_area(elevation, &self.config.envelope)?;
        self.decompose_elevation(elevation)
    }

    /// Delete every area that was never classified deep
    pub fn cleanup(&mut self) -> Result<usize, StoreError> {
        let removed = self.store.delete_areas_not_kept()?;
        debug!(removed, "cleanup pass");
        Ok(removed)
    }

    fn apply_contour(
        &mut self,
        elevation: i32,
        contour: ContourId,
        report: &mut DecompositionReport,
    ) -> Result<(), StoreError> {
        let caveats = self.store.probe_caveats(
            contour,
            self.config.probe_offset,
            &self.config.envelope,
        );
        if let Some(caveats) = recoverable(caveats)? {
            if !caveats.is_empty() {
                warn!(
                    elevation,
                    contour = %contour,
                    ?caveats,
                    "probe heuristic may misclassify"
                );
            }
        }

        for area in self.store.list_intersecting_area_ids(elevation, contour)? {
            self.apply_pair(elevation, contour, area, report)?;
        }
        Ok(())
    }

    fn apply_pair(
        &mut self,
        elevation: i32,
        contour: ContourId,
        area: AreaId,
        report: &mut DecompositionReport,
    ) -> Result<(), StoreError> {
        let outcome = match self.store.split_area(area, contour, elevation) {
            Ok(outcome) => outcome,
            Err(err) if err.is_recoverable() => {
                warn!(
                    elevation,
                    contour = %contour,
                    area = %area,
                    error = %err,
                    "split failed, skipping"
                );
                report.skipped += 1;
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        self.store.delete_area(area)?;

        match &outcome {
            SplitOutcome::Split(_) => report.splits += 1,
            SplitOutcome::Unchanged(_) => report.unchanged += 1,
            SplitOutcome::Empty => report.empty += 1,
        }

        for &fragment in outcome.fragments() {
            let probe = self
                .store
                .classify_deep(fragment, contour, self.config.probe_offset);
            match probe {
                Ok(deep) => {
                    self.store.set_keep(fragment, deep)?;
                    if deep {
                        report.deep += 1;
                    } else {
                        report.shallow += 1;
                    }
                }
                Err(err) if err.is_recoverable() => {
                    warn!(
                        elevation,
                        contour = %contour,
                        area = %fragment,
                        error = %err,
                        "probe failed, leaving unclassified"
                    );
                    report.skipped += 1;
                }
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }
}

/// Turn a recoverable geometry failure into `None`
fn recoverable<T>(result: Result<T, StoreError>) -> Result<Option<T>, StoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_recoverable() => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keep::Keep;
    use crate::memory::MemoryStore;
    use crate::model::Envelope;
    use geo::{line_string, Area as _, Contains, Point};

    fn config() -> DecompositionConfig {
        DecompositionConfig::new(Envelope::new(0.0, 0.0, 10.0, 10.0), 1e-3)
    }

    fn square_ring(min: f64, max: f64) -> geo::LineString<f64> {
        // Counter-clockwise, so the probe lands inside the ring
        line_string![
            (x: min, y: min),
            (x: max, y: min),
            (x: max, y: max),
            (x: min, y: max),
            (x: min, y: min),
        ]
    }

    #[test]
    fn test_closed_contour_keeps_inner_fragment() {
        let mut store = MemoryStore::new();
        store.add_contour(10, square_ring(3.0, 7.0));

        let report = Decomposer::new(&mut store, config()).run().unwrap();

        assert_eq!(report.elevations, 1);
        assert_eq!(report.splits, 1);
        assert_eq!(report.deep, 1);
        assert_eq!(report.shallow, 1);
        assert_eq!(report.removed, 1);

        let kept = store.kept_areas().unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].elevation, 10);
        assert_eq!(kept[0].keep, Keep::Deep);
        assert!((kept[0].polygon.unsigned_area() - 16.0).abs() < 1e-6);
        assert!(kept[0].polygon.contains(&Point::new(5.0, 5.0)));
    }

    #[test]
    fn test_untouched_elevation_contributes_nothing() {
        let mut store = MemoryStore::new();
        store.add_contour(10, square_ring(3.0, 7.0));
        // Lies outside the envelope, so elevation 5's coarse area is never split
        store.add_contour(5, square_ring(20.0, 30.0));

        let report = Decomposer::new(&mut store, config()).run().unwrap();

        assert_eq!(report.elevations, 2);
        assert_eq!(report.removed, 2);
        assert!(store.areas_at(5).is_empty());
        assert_eq!(store.areas_at(10).len(), 1);
    }

    #[test]
    fn test_two_disjoint_contours_give_three_fragments() {
        let mut store = MemoryStore::new();
        store.add_contour(7, line_string![(x: 3.0, y: -1.0), (x: 3.0, y: 11.0)]);
        store.add_contour(7, line_string![(x: 6.0, y: -1.0), (x: 6.0, y: 11.0)]);

        let mut decomposer = Decomposer::new(&mut store, config());
        decomposer.store.clear_all_areas().unwrap();
        decomposer
            .store
            .create_initial_area(7, &decomposer.config.envelope)
            .unwrap();
        let report = decomposer.decompose_elevation(7).unwrap();

        assert_eq!(report.splits, 2);
        assert_eq!(report.deep + report.shallow, 4);

        let areas = store.areas_at(7);
        assert_eq!(areas.len(), 3);
        assert!(areas.iter().all(|area| area.keep != Keep::Unknown));
        let total: f64 = areas.iter().map(|area| area.polygon.unsigned_area()).sum();
        assert!((total - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_contour_is_skipped() {
        let mut store = MemoryStore::new();
        store.add_contour(3, line_string![(x: 5.0, y: 5.0), (x: 5.0, y: 5.0)]);
        store.add_contour(3, line_string![(x: 5.0, y: -1.0), (x: 5.0, y: 11.0)]);

        let report = Decomposer::new(&mut store, config()).run().unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.splits, 1);
        assert_eq!(store.kept_areas().unwrap().len(), 1);
    }

    #[test]
    fn test_rerun_elevation_is_reproducible() {
        let mut store = MemoryStore::new();
        store.add_contour(10, square_ring(3.0, 7.0));
        store.add_contour(20, line_string![(x: 5.0, y: -1.0), (x: 5.0, y: 11.0)]);

        let mut decomposer = Decomposer::new(&mut store, config());
        decomposer.run().unwrap();
        let first: Vec<f64> = decomposer
            .store
            .kept_areas()
            .unwrap()
            .iter()
            .map(|area| area.polygon.unsigned_area())
            .collect();

        decomposer.rerun_elevation(20).unwrap();
        decomposer.cleanup().unwrap();

        let mut second: Vec<(i32, f64)> = store
            .kept_areas()
            .unwrap()
            .iter()
            .map(|area| (area.elevation, area.polygon.unsigned_area()))
            .collect();
        second.sort_by_key(|(elevation, _)| *elevation);
        assert_eq!(second.len(), 2);
        assert!((second[0].1 - first[0]).abs() < 1e-9);
        assert!((second[1].1 - first[1]).abs() < 1e-9);
    }

    #[test]
    fn test_run_clears_previous_areas() {
        let mut store = MemoryStore::new();
        store.add_contour(10, square_ring(3.0, 7.0));

        Decomposer::new(&mut store, config()).run().unwrap();
        Decomposer::new(&mut store, config()).run().unwrap();

        assert_eq!(store.kept_areas().unwrap().len(), 1);
    }

    #[test]
    fn test_recoverable_helper() {
        assert_eq!(recoverable::<u8>(Ok(1)).unwrap(), Some(1));
        assert_eq!(
            recoverable::<u8>(Err(StoreError::geometry("split", "x"))).unwrap(),
            None
        );
        assert!(recoverable::<u8>(Err(StoreError::Connectivity("down".into()))).is_err());
    }
}
