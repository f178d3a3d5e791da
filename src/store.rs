//! Capability interface of the spatial store
//!
//! The decomposition engine never holds geometry itself: the store is its
//! working memory, and every mutation is visible to the next query. A
//! PostGIS-backed store and the in-memory [`MemoryStore`](crate::MemoryStore)
//! both fit behind this trait.

use crate::error::StoreError;
use crate::geometry::ProbeCaveat;
use crate::model::{Area, AreaId, ContourId, Envelope, SubtractedArea};

/// What splitting one area by one contour produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitOutcome {
    /// The contour crossed the interior; one new area per fragment
    Split(Vec<AreaId>),
    /// The contour did not cross the interior; one new area with the
    /// parent's geometry
    Unchanged(AreaId),
    /// The parent was degenerate; no area was created
    Empty,
}

impl SplitOutcome {
    /// Identifiers of the areas created by the split
    pub fn fragments(&self) -> &[AreaId] {
        match self {
            SplitOutcome::Split(ids) => ids,
            SplitOutcome::Unchanged(id) => std::slice::from_ref(id),
            SplitOutcome::Empty => &[],
        }
    }
}

pub trait GeometryStore {
    /// Distinct contour elevations, ascending
    fn list_distinct_elevations(&self) -> Result<Vec<i32>, StoreError>;

    /// Contours at one elevation, ascending identifier
    fn list_contour_ids(&self, elevation: i32) -> Result<Vec<ContourId>, StoreError>;

    /// Current areas at `elevation` sharing at least one point with the
    /// contour
    fn list_intersecting_area_ids(
        &self,
        elevation: i32,
        contour: ContourId,
    ) -> Result<Vec<AreaId>, StoreError>;

    /// Insert the coarse starting area of an elevation
    fn create_initial_area(
        &mut self,
        elevation: i32,
        envelope: &Envelope,
    ) -> Result<AreaId, StoreError>;

    /// Cut an area along a contour, inserting one new area per fragment
    ///
    /// The parent row is left in place; callers delete it.
    fn split_area(
        &mut self,
        area: AreaId,
        contour: ContourId,
        elevation: i32,
    ) -> Result<SplitOutcome, StoreError>;

    fn delete_area(&mut self, area: AreaId) -> Result<(), StoreError>;

    /// Whether the area lies on the deep side of the contour
    fn classify_deep(
        &self,
        area: AreaId,
        contour: ContourId,
        probe_offset: f64,
    ) -> Result<bool, StoreError>;

    fn set_keep(&mut self, area: AreaId, deep: bool) -> Result<(), StoreError>;

    /// Remove every area not classified deep; returns how many went
    fn delete_areas_not_kept(&mut self) -> Result<usize, StoreError>;

    fn clear_all_areas(&mut self) -> Result<(), StoreError>;

    /// Remove all areas of one elevation; returns how many went
    fn delete_areas_at(&mut self, elevation: i32) -> Result<usize, StoreError>;

    fn area(&self, area: AreaId) -> Result<Area, StoreError>;

    /// Areas classified deep, ascending identifier
    fn kept_areas(&self) -> Result<Vec<Area>, StoreError>;

    fn clear_subtracted(&mut self) -> Result<(), StoreError>;

    fn insert_subtracted(&mut self, row: SubtractedArea) -> Result<(), StoreError>;

    fn subtracted(&self) -> Result<Vec<SubtractedArea>, StoreError>;

    /// Conditions under which the probe may misclassify this contour's fragments
    ///
    /// Stores that cannot tell report none.
    fn probe_caveats(
        &self,
        _contour: ContourId,
        _probe_offset: f64,
        _envelope: &Envelope,
    ) -> Result<Vec<ProbeCaveat>, StoreError> {
        Ok(Vec::new())
    }
}
