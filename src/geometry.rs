//! Planar geometry primitives
//!
//! These are the operations a spatial database would provide to the
//! decomposition engine: slicing a polygon by a line, picking vertices,
//! offsetting a segment, interpolating along it, and boolean intersection.
//! Slicing is delegated to `i_overlay`; everything else uses `geo`.

use crate::error::StoreError;
use crate::model::Envelope;
use geo::orient::{Direction, Orient};
use geo::{
    Area, BooleanOps, Contains, Coord, EuclideanDistance, EuclideanLength, Intersects, Line,
    LineInterpolatePoint, LineString, MultiPolygon, Point, Polygon,
};
use i_overlay::core::fill_rule::FillRule;
use i_overlay::float::slice::FloatSlice;
use std::panic::{self, AssertUnwindSafe};

/// Result of slicing one polygon by one line
#[derive(Debug, Clone, PartialEq)]
pub enum Slice {
    /// The line crossed the interior; two or more disjoint fragments
    Split(Vec<Polygon<f64>>),
    /// The line did not cross the interior; the input polygon, unchanged
    Unchanged(Polygon<f64>),
    /// The input polygon was degenerate and produced nothing
    Empty,
}

/// Conditions under which the probe heuristic may misclassify
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeCaveat {
    /// The probe segment is shorter than twice the offset distance
    ShortSegment,
    /// Another part of the contour passes closer than half the offset
    NearContour,
    /// The probe point lies outside the survey envelope, so no fragment
    /// can contain it
    OutsideEnvelope,
}

/// Whether a polygon and a curve share at least one point
pub fn intersects(polygon: &Polygon<f64>, curve: &LineString<f64>) -> bool {
    polygon.intersects(curve)
}

/// Whether a point lies strictly inside a polygon
///
/// Points on the boundary are not contained.
pub fn contains(polygon: &Polygon<f64>, point: &Point<f64>) -> bool {
    polygon.contains(point)
}

/// Number of vertices in a curve, closing vertex included
pub fn vertex_count(curve: &LineString<f64>) -> usize {
    curve.0.len()
}

/// Vertex at a 0-based index
pub fn vertex_at(curve: &LineString<f64>, index: usize) -> Option<Coord<f64>> {
    curve.0.get(index).copied()
}

/// Cut a polygon along a curve into disjoint fragments
///
/// A curve that only touches the boundary, or lies outside the polygon,
/// yields [`Slice::Unchanged`] with the input geometry.
///
/// `i_overlay` snaps every fragment vertex to a fixed-point grid scaled to
/// the bounding box of the call, so fragments cut in separate calls may
/// disagree on a shared edge by about 1e-9 of that box. The tiling is exact
/// only up to that tolerance; on the default survey envelope the area sum
/// of a fully split band drifts by less than 1e-7 square degrees.
pub fn split_polygon(
    polygon: &Polygon<f64>,
    curve: &LineString<f64>,
) -> Result<Slice, StoreError> {
    if curve.0.len() < 2 || curve.euclidean_length() == 0.0 {
        return Err(StoreError::geometry("split", "contour has zero length"));
    }
    if polygon.exterior().0.len() < 4 || polygon.unsigned_area() == 0.0 {
        return Ok(Slice::Empty);
    }
    if !polygon.intersects(curve) {
        return Ok(Slice::Unchanged(polygon.clone()));
    }

    let shape = to_i_overlay_shape(polygon);
    let splitters = vec![to_i_overlay_path(curve)];
    let shapes = contain_panic("split", || shape.slice_by(&splitters, FillRule::NonZero))?;

    let fragments: Vec<Polygon<f64>> = shapes.into_iter().filter_map(to_geo_polygon).collect();

    match fragments.len() {
        0 => Ok(Slice::Empty),
        1 => Ok(Slice::Unchanged(polygon.clone())),
        _ => Ok(Slice::Split(fragments)),
    }
}

/// Displace a segment perpendicular to itself
///
/// Positive distances move it to the left of its direction of travel,
/// negative ones to the right.
pub fn offset_segment(segment: &Line<f64>, distance: f64) -> Result<Line<f64>, StoreError> {
    let length = segment.euclidean_length();
    if length == 0.0 || !length.is_finite() {
        return Err(StoreError::geometry("offset", "segment has zero length"));
    }
    let delta = segment.delta();
    let normal = Coord {
        x: -delta.y / length * distance,
        y: delta.x / length * distance,
    };
    Ok(Line::new(segment.start + normal, segment.end + normal))
}

/// The segment of a curve the probe is built from
///
/// With `n` vertices this joins the 1-based vertices `floor(n/2)` and
/// `floor(n/2) + 1`.
pub fn probe_segment(curve: &LineString<f64>) -> Result<Line<f64>, StoreError> {
    let count = vertex_count(curve);
    if count < 2 {
        return Err(StoreError::geometry(
            "probe",
            format!("contour has {} vertices", count),
        ));
    }
    let mid = count / 2;
    match (vertex_at(curve, mid - 1), vertex_at(curve, mid)) {
        (Some(start), Some(end)) => Ok(Line::new(start, end)),
        _ => Err(StoreError::geometry("probe", "midpoint vertex out of range")),
    }
}

/// Point just off one side of a curve's midpoint segment
pub fn probe_point(curve: &LineString<f64>, offset: f64) -> Result<Point<f64>, StoreError> {
    let segment = probe_segment(curve)?;
    let shifted = offset_segment(&segment, offset)?;
    shifted
        .line_interpolate_point(0.5)
        .ok_or_else(|| StoreError::geometry("probe", "interpolation produced no point"))
}

/// Report where the probe heuristic's assumptions may not hold
pub fn probe_caveats(
    curve: &LineString<f64>,
    offset: f64,
    envelope: &Envelope,
) -> Vec<ProbeCaveat> {
    let mut caveats = Vec::new();
    let Ok(segment) = probe_segment(curve) else {
        return caveats;
    };
    if segment.euclidean_length() < 2.0 * offset.abs() {
        caveats.push(ProbeCaveat::ShortSegment);
    }
    if let Ok(point) = probe_point(curve, offset) {
        if point.euclidean_distance(curve) < offset.abs() / 2.0 {
            caveats.push(ProbeCaveat::NearContour);
        }
        if !envelope.to_polygon().contains(&point) {
            caveats.push(ProbeCaveat::OutsideEnvelope);
        }
    }
    caveats
}

/// Intersection of a polygon with a mask; empty when they are disjoint
///
/// The result is always areal. Touch points and shared edges, which a
/// spatial database would return as lower-dimensional parts, are dropped.
/// A panic inside the boolean-operation backend is reported as a
/// recoverable geometry failure.
pub fn intersect_with_mask(
    polygon: &Polygon<f64>,
    mask: &MultiPolygon<f64>,
) -> Result<MultiPolygon<f64>, StoreError> {
    contain_panic("intersection", || {
        MultiPolygon::new(vec![polygon.clone()]).intersection(mask)
    })
}

/// Run a geometry backend call, turning a panic into a `StoreError`
pub(crate) fn contain_panic<T>(
    operation: &'static str,
    f: impl FnOnce() -> T,
) -> Result<T, StoreError> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "backend panicked".to_string());
        StoreError::geometry(operation, reason)
    })
}

fn to_i_overlay_path(line_string: &LineString<f64>) -> Vec<[f64; 2]> {
    line_string.coords().map(|c| [c.x, c.y]).collect()
}

// geo rings repeat their first vertex; i_overlay contours do not.
fn to_i_overlay_ring(ring: &LineString<f64>) -> Vec<[f64; 2]> {
    let mut contour = to_i_overlay_path(ring);
    if ring.is_closed() {
        contour.pop();
    }
    contour
}

fn to_i_overlay_shape(polygon: &Polygon<f64>) -> Vec<Vec<[f64; 2]>> {
    let oriented = polygon.orient(Direction::Default);
    std::iter::once(oriented.exterior())
        .chain(oriented.interiors())
        .map(to_i_overlay_ring)
        .collect()
}

fn to_geo_linestring(pts: Vec<[f64; 2]>) -> LineString<f64> {
    LineString(pts.into_iter().map(|pt| Coord { x: pt[0], y: pt[1] }).collect())
}

fn to_geo_polygon(rings: Vec<Vec<[f64; 2]>>) -> Option<Polygon<f64>> {
    let mut rings = rings.into_iter().filter(|ring| ring.len() >= 3);
    let exterior = to_geo_linestring(rings.next()?);
    let interiors = rings.map(to_geo_linestring).collect();
    let polygon = Polygon::new(exterior, interiors);
    (polygon.unsigned_area() > 0.0).then_some(polygon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, polygon};

    fn square(size: f64) -> Polygon<f64> {
        polygon![
            (x: 0.0, y: 0.0),
            (x: size, y: 0.0),
            (x: size, y: size),
            (x: 0.0, y: size),
            (x: 0.0, y: 0.0),
        ]
    }

    fn total_area(polygons: &[Polygon<f64>]) -> f64 {
        polygons.iter().map(|p| p.unsigned_area()).sum()
    }

    #[test]
    fn test_split_by_crossing_line() {
        let area = square(10.0);
        let curve = line_string![(x: 4.0, y: -1.0), (x: 4.0, y: 11.0)];

        match split_polygon(&area, &curve).unwrap() {
            Slice::Split(fragments) => {
                assert_eq!(fragments.len(), 2);
                assert!((total_area(&fragments) - 100.0).abs() < 1e-6);
                let mut areas: Vec<f64> = fragments.iter().map(|p| p.unsigned_area()).collect();
                areas.sort_by(|a, b| a.partial_cmp(b).unwrap());
                assert!((areas[0] - 40.0).abs() < 1e-6);
                assert!((areas[1] - 60.0).abs() < 1e-6);
            }
            other => panic!("Expected a split, got {:?}", other),
        }
    }

    #[test]
    fn test_split_by_closed_ring_inside() {
        let area = square(10.0);
        let curve = line_string![
            (x: 3.0, y: 3.0),
            (x: 7.0, y: 3.0),
            (x: 7.0, y: 7.0),
            (x: 3.0, y: 7.0),
            (x: 3.0, y: 3.0),
        ];

        match split_polygon(&area, &curve).unwrap() {
            Slice::Split(fragments) => {
                assert_eq!(fragments.len(), 2);
                assert!((total_area(&fragments) - 100.0).abs() < 1e-6);
                let holed = fragments.iter().filter(|p| !p.interiors().is_empty()).count();
                assert_eq!(holed, 1, "Outer fragment should carry the ring as a hole");
            }
            other => panic!("Expected a split, got {:?}", other),
        }
    }

    #[test]
    fn test_split_outside_is_unchanged() {
        let area = square(10.0);
        let curve = line_string![(x: 20.0, y: 0.0), (x: 20.0, y: 10.0)];

        assert_eq!(split_polygon(&area, &curve).unwrap(), Slice::Unchanged(area));
    }

    #[test]
    fn test_split_dangling_line_is_unchanged() {
        let area = square(10.0);
        // Enters the polygon but stops inside it
        let curve = line_string![(x: -1.0, y: 5.0), (x: 5.0, y: 5.0)];

        assert_eq!(split_polygon(&area, &curve).unwrap(), Slice::Unchanged(area));
    }

    #[test]
    fn test_split_zero_length_contour_fails() {
        let area = square(10.0);
        let curve = line_string![(x: 5.0, y: 5.0), (x: 5.0, y: 5.0)];

        let err = split_polygon(&area, &curve).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_split_degenerate_polygon_is_empty() {
        let flat = polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 5.0, y: 0.0)];
        let curve = line_string![(x: 5.0, y: -1.0), (x: 5.0, y: 1.0)];

        assert_eq!(split_polygon(&flat, &curve).unwrap(), Slice::Empty);
    }

    #[test]
    fn test_offset_segment_moves_left() {
        let segment = Line::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 2.0, y: 0.0 });
        let shifted = offset_segment(&segment, 0.5).unwrap();
        assert_eq!(shifted.start, Coord { x: 0.0, y: 0.5 });
        assert_eq!(shifted.end, Coord { x: 2.0, y: 0.5 });

        let shifted = offset_segment(&segment, -0.5).unwrap();
        assert_eq!(shifted.start, Coord { x: 0.0, y: -0.5 });
    }

    #[test]
    fn test_offset_zero_length_segment_fails() {
        let segment = Line::new(Coord { x: 1.0, y: 1.0 }, Coord { x: 1.0, y: 1.0 });
        assert!(offset_segment(&segment, 0.1).is_err());
    }

    #[test]
    fn test_probe_segment_uses_midpoint_vertices() {
        // 5 vertices: floor(5/2) = 2, so 1-based vertices 2 and 3
        let curve = line_string![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 3.0, y: 0.0),
            (x: 4.0, y: 0.0),
        ];
        let segment = probe_segment(&curve).unwrap();
        assert_eq!(segment.start, Coord { x: 1.0, y: 0.0 });
        assert_eq!(segment.end, Coord { x: 2.0, y: 0.0 });

        let pair = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)];
        let segment = probe_segment(&pair).unwrap();
        assert_eq!(segment.start, Coord { x: 0.0, y: 0.0 });
        assert_eq!(segment.end, Coord { x: 1.0, y: 0.0 });
    }

    #[test]
    fn test_probe_point_is_deterministic() {
        let curve = line_string![(x: 0.0, y: 0.0), (x: 2.0, y: 0.0), (x: 4.0, y: 0.0)];
        let first = probe_point(&curve, 0.01).unwrap();
        let second = probe_point(&curve, 0.01).unwrap();
        assert_eq!(first, second);
        assert!((first.x() - 1.0).abs() < 1e-12);
        assert!((first.y() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_probe_point_needs_two_vertices() {
        let curve = LineString::new(vec![Coord { x: 0.0, y: 0.0 }]);
        assert!(probe_point(&curve, 0.01).is_err());
    }

    #[test]
    fn test_probe_caveats() {
        let envelope = Envelope::new(-5.0, -5.0, 5.0, 5.0);
        let curve = line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0)];
        assert!(probe_caveats(&curve, 0.01, &envelope).is_empty());
        assert_eq!(
            probe_caveats(&curve, 0.8, &envelope),
            vec![ProbeCaveat::ShortSegment]
        );

        // Hairpin: the return leg runs just above the probe segment
        let hairpin = line_string![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 4.0, y: 0.012),
            (x: 0.0, y: 0.012),
        ];
        assert!(probe_caveats(&hairpin, 0.01, &envelope).contains(&ProbeCaveat::NearContour));
    }

    #[test]
    fn test_caveat_when_offset_point_leaves_envelope() {
        let envelope = Envelope::new(0.0, 0.0, 10.0, 10.0);
        // Midpoint segment runs along y = 12, above the envelope
        let curve = line_string![
            (x: 5.0, y: 5.0),
            (x: 5.0, y: 12.0),
            (x: 8.0, y: 12.0),
            (x: 8.0, y: 5.0),
        ];
        assert_eq!(
            probe_caveats(&curve, 0.01, &envelope),
            vec![ProbeCaveat::OutsideEnvelope]
        );

        // Offset point lands exactly on the envelope edge, which is not inside
        let edge = line_string![(x: 2.0, y: -0.5), (x: 4.0, y: -0.5)];
        assert!(probe_caveats(&edge, 0.5, &envelope).contains(&ProbeCaveat::OutsideEnvelope));
    }

    #[test]
    fn test_backend_panic_becomes_recoverable_error() {
        let err = contain_panic("intersection", || -> MultiPolygon<f64> {
            panic!("sweep line lost its segment")
        })
        .unwrap_err();
        assert!(err.is_recoverable());
        assert!(err.to_string().contains("sweep line lost its segment"));

        assert_eq!(contain_panic("intersection", || 3).unwrap(), 3);
    }

    #[test]
    fn test_contains_excludes_boundary() {
        let area = square(10.0);
        assert!(contains(&area, &Point::new(5.0, 5.0)));
        assert!(!contains(&area, &Point::new(0.0, 5.0)));
        assert!(!contains(&area, &Point::new(15.0, 5.0)));
    }

    #[test]
    fn test_intersect_with_mask() {
        let area = square(10.0);
        let mask = MultiPolygon::new(vec![polygon![
            (x: 5.0, y: 5.0),
            (x: 15.0, y: 5.0),
            (x: 15.0, y: 15.0),
            (x: 5.0, y: 15.0),
            (x: 5.0, y: 5.0),
        ]]);
        let trimmed = intersect_with_mask(&area, &mask).unwrap();
        assert!((trimmed.unsigned_area() - 25.0).abs() < 1e-9);

        let far = MultiPolygon::new(vec![polygon![
            (x: 50.0, y: 50.0),
            (x: 60.0, y: 50.0),
            (x: 60.0, y: 60.0),
            (x: 50.0, y: 50.0),
        ]]);
        assert!(intersect_with_mask(&area, &far).unwrap().0.is_empty());
    }
}
