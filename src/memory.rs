//! In-memory geometry store
//!
//! Keeps contours, areas and derived rows in ordered maps and answers every
//! [`GeometryStore`] query with the planar primitives in
//! [`geometry`](crate::geometry). Identifiers are handed out from a serial
//! counter, so ascending identifier order is insertion order.

use crate::error::StoreError;
use crate::geometry::{self, ProbeCaveat, Slice};
use crate::keep::Keep;
use crate::model::{Area, AreaId, Contour, ContourId, Envelope, SubtractedArea};
use crate::store::{GeometryStore, SplitOutcome};
use geo::{LineString, Polygon};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    contours: BTreeMap<ContourId, Contour>,
    areas: BTreeMap<AreaId, Area>,
    subtracted: Vec<SubtractedArea>,
    next_contour: u64,
    next_area: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store around contours that already carry identifiers
    pub fn with_contours(contours: impl IntoIterator<Item = Contour>) -> Self {
        let mut store = Self::new();
        for contour in contours {
            store.next_contour = store.next_contour.max(contour.id.0);
            store.contours.insert(contour.id, contour);
        }
        store
    }

    /// Add a contour, assigning the next identifier
    pub fn add_contour(&mut self, elevation: i32, curve: LineString<f64>) -> ContourId {
        self.next_contour += 1;
        let id = ContourId(self.next_contour);
        self.contours.insert(
            id,
            Contour {
                id,
                elevation,
                curve,
            },
        );
        id
    }

    pub fn contour(&self, id: ContourId) -> Option<&Contour> {
        self.contours.get(&id)
    }

    /// Current areas at one elevation, ascending identifier
    pub fn areas_at(&self, elevation: i32) -> Vec<&Area> {
        self.areas
            .values()
            .filter(|area| area.elevation == elevation)
            .collect()
    }

    pub fn area_count(&self) -> usize {
        self.areas.len()
    }

    fn insert_area(&mut self, elevation: i32, polygon: Polygon<f64>) -> AreaId {
        self.next_area += 1;
        let id = AreaId(self.next_area);
        self.areas.insert(
            id,
            Area {
                id,
                elevation,
                polygon,
                keep: Keep::Unknown,
            },
        );
        id
    }

    fn curve(&self, id: ContourId) -> Result<&LineString<f64>, StoreError> {
        self.contours
            .get(&id)
            .map(|contour| &contour.curve)
            .ok_or(StoreError::UnknownContour(id))
    }

    fn polygon(&self, id: AreaId) -> Result<&Polygon<f64>, StoreError> {
        self.areas
            .get(&id)
            .map(|area| &area.polygon)
            .ok_or(StoreError::UnknownArea(id))
    }
}

impl GeometryStore for MemoryStore {
    fn list_distinct_elevations(&self) -> Result<Vec<i32>, StoreError> {
        let elevations: BTreeSet<i32> = self.contours.values().map(|c| c.elevation).collect();
        Ok(elevations.into_iter().collect())
    }

    fn list_contour_ids(&self, elevation: i32) -> Result<Vec<ContourId>, StoreError> {
        Ok(self
            .contours
            .values()
            .filter(|contour| contour.elevation == elevation)
            .map(|contour| contour.id)
            .collect())
    }

    fn list_intersecting_area_ids(
        &self,
        elevation: i32,
        contour: ContourId,
    ) -> Result<Vec<AreaId>, StoreError> {
        let curve = self.curve(contour)?;
        Ok(self
            .areas
            .values()
            .filter(|area| area.elevation == elevation)
            .filter(|area| geometry::intersects(&area.polygon, curve))
            .map(|area| area.id)
            .collect())
    }

    fn create_initial_area(
        &mut self,
        elevation: i32,
        envelope: &Envelope,
    ) -> Result<AreaId, StoreError> {
        let id = self.insert_area(elevation, envelope.to_polygon());
        debug!(elevation, area = %id, "created initial area");
        Ok(id)
    }

    fn split_area(
        &mut self,
        area: AreaId,
        contour: ContourId,
        elevation: i32,
    ) -> Result<SplitOutcome, StoreError> {
        let slice = geometry::split_polygon(self.polygon(area)?, self.curve(contour)?)?;

        let outcome = match slice {
            Slice::Split(fragments) => SplitOutcome::Split(
                fragments
                    .into_iter()
                    .map(|polygon| self.insert_area(elevation, polygon))
                    .collect(),
            ),
            Slice::Unchanged(polygon) => {
                SplitOutcome::Unchanged(self.insert_area(elevation, polygon))
            }
            Slice::Empty => SplitOutcome::Empty,
        };
        trace!(area = %area, contour = %contour, ?outcome, "split area");
        Ok(outcome)
    }

    fn delete_area(&mut self, area: AreaId) -> Result<(), StoreError> {
        self.areas
            .remove(&area)
            .map(|_| ())
            .ok_or(StoreError::UnknownArea(area))
    }

    fn classify_deep(
        &self,
        area: AreaId,
        contour: ContourId,
        probe_offset: f64,
    ) -> Result<bool, StoreError> {
        let polygon = self.polygon(area)?;
        let point = geometry::probe_point(self.curve(contour)?, probe_offset)?;
        Ok(geometry::contains(polygon, &point))
    }

    fn set_keep(&mut self, area: AreaId, deep: bool) -> Result<(), StoreError> {
        let row = self
            .areas
            .get_mut(&area)
            .ok_or(StoreError::UnknownArea(area))?;
        row.keep = Keep::from_probe(deep);
        Ok(())
    }

    fn delete_areas_not_kept(&mut self) -> Result<usize, StoreError> {
        let before = self.areas.len();
        self.areas.retain(|_, area| area.keep.is_kept());
        Ok(before - self.areas.len())
    }

    fn clear_all_areas(&mut self) -> Result<(), StoreError> {
        self.areas.clear();
        Ok(())
    }

    fn delete_areas_at(&mut self, elevation: i32) -> Result<usize, StoreError> {
        let before = self.areas.len();
        self.areas.retain(|_, area| area.elevation != elevation);
        Ok(before - self.areas.len())
    }

    fn area(&self, area: AreaId) -> Result<Area, StoreError> {
        self.areas
            .get(&area)
            .cloned()
            .ok_or(StoreError::UnknownArea(area))
    }

    fn kept_areas(&self) -> Result<Vec<Area>, StoreError> {
        Ok(self
            .areas
            .values()
            .filter(|area| area.keep.is_kept())
            .cloned()
            .collect())
    }

    fn clear_subtracted(&mut self) -> Result<(), StoreError> {
        self.subtracted.clear();
        Ok(())
    }

    fn insert_subtracted(&mut self, row: SubtractedArea) -> Result<(), StoreError> {
        self.subtracted.push(row);
        Ok(())
    }

    fn subtracted(&self) -> Result<Vec<SubtractedArea>, StoreError> {
        Ok(self.subtracted.clone())
    }

    fn probe_caveats(
        &self,
        contour: ContourId,
        probe_offset: f64,
        envelope: &Envelope,
    ) -> Result<Vec<ProbeCaveat>, StoreError> {
        Ok(geometry::probe_caveats(
            self.curve(contour)?,
            probe_offset,
            envelope,
        ))
    }
}
