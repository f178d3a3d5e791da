//! GeoJSON input and output
//!
//! Contours arrive as a FeatureCollection of LineStrings (or
//! MultiLineStrings) carrying an integer elevation property. The coastline
//! mask is any GeoJSON holding polygons. Both outputs are written as
//! FeatureCollections.

use crate::error::IoError;
use crate::model::{Area, Contour, ContourId, SubtractedArea};
use geo::{LineString, MultiLineString, MultiPolygon, Polygon};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read contours from a GeoJSON file
///
/// Identifiers are assigned in feature order starting at 1. A
/// MultiLineString contributes one contour per part.
pub fn read_contours(path: &Path, elevation_property: &str) -> Result<Vec<Contour>, IoError> {
    let geojson = read_geojson(path)?;
    let contours = contours_from_geojson(geojson, elevation_property)?;
    debug!(path = %path.display(), count = contours.len(), "read contours");
    Ok(contours)
}

/// Read a coastline mask, merging every polygon in the file
pub fn read_mask(path: &Path) -> Result<MultiPolygon<f64>, IoError> {
    let geojson = read_geojson(path)?;
    let mask = mask_from_geojson(geojson)?;
    debug!(path = %path.display(), polygons = mask.0.len(), "read coastline mask");
    Ok(mask)
}

pub fn write_areas(path: &Path, areas: &[Area]) -> Result<(), IoError> {
    write_collection(path, &areas_to_feature_collection(areas))
}

pub fn write_subtracted(path: &Path, rows: &[SubtractedArea]) -> Result<(), IoError> {
    write_collection(path, &subtracted_to_feature_collection(rows))
}

pub fn contours_from_geojson(
    geojson: GeoJson,
    elevation_property: &str,
) -> Result<Vec<Contour>, IoError> {
    let features = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(IoError::MissingElevation {
                index: 0,
                property: elevation_property.to_string(),
            })
        }
    };

    let mut contours = Vec::new();
    for (index, feature) in features.into_iter().enumerate() {
        let elevation = feature_elevation(&feature, elevation_property).ok_or_else(|| {
            IoError::MissingElevation {
                index,
                property: elevation_property.to_string(),
            }
        })?;

        let value = feature
            .geometry
            .map(|g| g.value)
            .ok_or_else(|| unsupported(index, "null"))?;
        let curves = match &value {
            Value::LineString(_) => LineString::<f64>::try_from(&value).map(|line| vec![line]),
            Value::MultiLineString(_) => {
                MultiLineString::<f64>::try_from(&value).map(|lines| lines.0)
            }
            other => return Err(unsupported(index, other.type_name())),
        }
        .map_err(|_| unsupported(index, value.type_name()))?;

        for curve in curves {
            contours.push(Contour {
                id: ContourId(contours.len() as u64 + 1),
                elevation,
                curve,
            });
        }
    }
    Ok(contours)
}

/// Merge every polygon of a GeoJSON document into one mask
///
/// Non-areal geometries are ignored; polygons without an exterior ring are
/// dropped.
pub fn mask_from_geojson(geojson: GeoJson) -> Result<MultiPolygon<f64>, IoError> {
    let geometries: Vec<Option<Geometry>> = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features.into_iter().map(|f| f.geometry).collect(),
        GeoJson::Feature(f) => vec![f.geometry],
        GeoJson::Geometry(g) => vec![Some(g)],
    };

    let mut polygons = Vec::new();
    for (index, geometry) in geometries.into_iter().enumerate() {
        if let Some(geometry) = geometry {
            polygons.extend(areal_parts(&geometry.value).map_err(|_| {
                unsupported(index, geometry.value.type_name())
            })?);
        }
    }
    polygons.retain(|polygon| !polygon.exterior().0.is_empty());
    Ok(MultiPolygon::new(polygons))
}

pub fn areas_to_feature_collection(areas: &[Area]) -> FeatureCollection {
    let features = areas
        .iter()
        .map(|area| {
            let mut properties = JsonObject::new();
            properties.insert("gid".to_string(), serde_json::json!(area.id.0));
            properties.insert("elev".to_string(), serde_json::json!(area.elevation));
            properties.insert("keep".to_string(), serde_json::json!(area.keep.as_option()));
            feature(Value::from(&area.polygon), properties)
        })
        .collect();
    collection(features)
}

pub fn subtracted_to_feature_collection(rows: &[SubtractedArea]) -> FeatureCollection {
    let features = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut properties = JsonObject::new();
            properties.insert("gid".to_string(), serde_json::json!(i + 1));
            properties.insert("elev".to_string(), serde_json::json!(row.elevation));
            properties.insert("source_gid".to_string(), serde_json::json!(row.source.0));
            feature(Value::from(&row.geometry), properties)
        })
        .collect();
    collection(features)
}

fn read_geojson(path: &Path) -> Result<GeoJson, IoError> {
    let text = fs::read_to_string(path).map_err(|source| IoError::File {
        path: path.to_path_buf(),
        source,
    })?;
    text.parse::<GeoJson>().map_err(|source| IoError::GeoJson {
        path: path.to_path_buf(),
        source,
    })
}

fn write_collection(path: &Path, collection: &FeatureCollection) -> Result<(), IoError> {
    let text = serde_json::to_string_pretty(collection).map_err(|source| IoError::Serialize {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, text).map_err(|source| IoError::File {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), features = collection.features.len(), "wrote collection");
    Ok(())
}

/// Integer elevation; whole-valued floats are accepted
fn feature_elevation(feature: &Feature, property: &str) -> Option<i32> {
    let value = feature.property(property)?;
    if let Some(int) = value.as_i64() {
        return i32::try_from(int).ok();
    }
    let float = value.as_f64()?;
    if float.fract() == 0.0 && float >= i32::MIN as f64 && float <= i32::MAX as f64 {
        Some(float as i32)
    } else {
        None
    }
}

fn feature(value: Value, properties: JsonObject) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        foreign_members: None,
        features,
    }
}

fn unsupported(index: usize, kind: &str) -> IoError {
    IoError::UnsupportedGeometry {
        index,
        kind: kind.to_string(),
    }
}

fn areal_parts(value: &Value) -> Result<Vec<Polygon<f64>>, geojson::Error> {
    match value {
        Value::Polygon(_) => Ok(vec![Polygon::try_from(value)?]),
        Value::MultiPolygon(_) => Ok(MultiPolygon::try_from(value)?.0),
        Value::GeometryCollection(members) => {
            let mut parts = Vec::new();
            for member in members {
                parts.extend(areal_parts(&member.value)?);
            }
            Ok(parts)
        }
        _ => Ok(Vec::new()),
    }
}
