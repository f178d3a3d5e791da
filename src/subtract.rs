//! Coastline subtraction
//!
//! Trims every surviving deep-water area against the coastline mask. Each
//! area is independent, so the intersections run in parallel.

use crate::error::StoreError;
use crate::geometry;
use crate::model::{Area, SubtractedArea};
use crate::store::GeometryStore;
use geo::MultiPolygon;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Intersect each area with the mask
///
/// Output order follows input order. Areas disjoint from the mask yield an
/// empty geometry rather than being dropped; areas whose intersection fails
/// in the geometry backend are skipped with a warning.
pub fn subtract_areas(areas: &[Area], mask: &MultiPolygon<f64>) -> Vec<SubtractedArea> {
    areas
        .par_iter()
        .filter_map(|area| match geometry::intersect_with_mask(&area.polygon, mask) {
            Ok(geometry) => Some(SubtractedArea {
                elevation: area.elevation,
                source: area.id,
                geometry,
            }),
            Err(err) => {
                warn!(
                    elevation = area.elevation,
                    area = %area.id,
                    error = %err,
                    "intersection failed, skipping"
                );
                None
            }
        })
        .collect()
}

/// Replace the store's derived rows with the trimmed surviving areas
///
/// Returns the number of rows written.
pub fn subtract_coastline<S: GeometryStore>(
    store: &mut S,
    mask: &MultiPolygon<f64>,
) -> Result<usize, StoreError> {
    let start = Instant::now();

    store.clear_subtracted()?;
    let areas = store.kept_areas()?;
    info!(count = areas.len(), "subtracting coastline");

    let rows = subtract_areas(&areas, mask);
    let written = rows.len();
    for row in rows {
        debug!(
            elevation = row.elevation,
            area = %row.source,
            parts = row.geometry.0.len(),
            "subtracted area"
        );
        store.insert_subtracted(row)?;
    }

    info!(
        written,
        total_ms = start.elapsed().as_secs_f64() * 1000.0,
        "coastline subtraction complete"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keep::Keep;
    use crate::model::AreaId;
    use geo::{polygon, Area as _};

    fn area(id: u64, elevation: i32, polygon: geo::Polygon<f64>) -> Area {
        Area {
            id: AreaId(id),
            elevation,
            polygon,
            keep: Keep::Deep,
        }
    }

    fn mask() -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0),
            (x: 6.0, y: 0.0),
            (x: 6.0, y: 10.0),
            (x: 0.0, y: 10.0),
            (x: 0.0, y: 0.0),
        ]])
    }

    #[test]
    fn test_subtract_areas_preserves_order_and_elevation() {
        let areas = vec![
            area(
                4,
                10,
                polygon![(x: 4.0, y: 0.0), (x: 8.0, y: 0.0), (x: 8.0, y: 4.0), (x: 4.0, y: 4.0)],
            ),
            area(
                9,
                20,
                polygon![(x: 20.0, y: 0.0), (x: 24.0, y: 0.0), (x: 24.0, y: 4.0), (x: 20.0, y: 4.0)],
            ),
        ];

        let rows = subtract_areas(&areas, &mask());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].source, AreaId(4));
        assert_eq!(rows[0].elevation, 10);
        assert!((rows[0].geometry.unsigned_area() - 8.0).abs() < 1e-9);

        assert_eq!(rows[1].source, AreaId(9));
        assert!(rows[1].geometry.0.is_empty(), "Disjoint area yields an empty geometry");
    }
}
