//! In-memory point store loaded from GeoJSON.
//!
//! Accepts either a GeoJSON `FeatureCollection` (only `Point` features are
//! kept) or a bare JSON array of `[lon, lat]` pairs.

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};

use heatmap_common::{BoundingBox, GeoPoint, HeatmapError, HeatmapResult};

use crate::source::PointSource;

/// Immutable set of points held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryPointStore {
    points: Vec<GeoPoint>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PointsDocument {
    Collection(FeatureCollection),
    Pairs(Vec<[f64; 2]>),
}

#[derive(Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    features: Vec<Feature>,
}

#[derive(Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
}

#[derive(Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

impl MemoryPointStore {
    pub fn from_points(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    pub fn from_geojson_str(json: &str) -> HeatmapResult<Self> {
        let document: PointsDocument = serde_json::from_str(json).map_err(|e| {
            HeatmapError::PointSourceError(format!(
                "expected a GeoJSON FeatureCollection or an array of [lon, lat] pairs: {}",
                e
            ))
        })?;

        let points = match document {
            PointsDocument::Pairs(pairs) => pairs.into_iter().map(|[lon, lat]| GeoPoint::new(lon, lat)).collect(),
            PointsDocument::Collection(collection) => points_from_features(collection)?,
        };

        Ok(Self::from_points(points))
    }

    pub fn from_file(path: impl AsRef<Path>) -> HeatmapResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            HeatmapError::PointSourceError(format!("{}: {}", path.display(), e))
        })?;

        let store = Self::from_geojson_str(&content)?;
        info!(path = %path.display(), points = store.len(), "Loaded points file");
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }
}

fn points_from_features(collection: FeatureCollection) -> HeatmapResult<Vec<GeoPoint>> {
    if collection.kind != "FeatureCollection" {
        return Err(HeatmapError::PointSourceError(format!(
            "unsupported GeoJSON type '{}'",
            collection.kind
        )));
    }

    let mut points = Vec::with_capacity(collection.features.len());
    let mut skipped = 0usize;

    for geometry in collection.features.into_iter().filter_map(|f| f.geometry) {
        if geometry.kind != "Point" {
            skipped += 1;
            continue;
        }

        let coords: Vec<f64> = serde_json::from_value(geometry.coordinates)
            .map_err(|e| HeatmapError::PointSourceError(format!("bad Point coordinates: {}", e)))?;
        match coords.as_slice() {
            [lon, lat, ..] => points.push(GeoPoint::new(*lon, *lat)),
            _ => {
                return Err(HeatmapError::PointSourceError(
                    "Point needs at least [lon, lat]".to_string(),
                ))
            }
        }
    }

    if skipped > 0 {
        debug!(skipped, "Skipped non-point features");
    }
    Ok(points)
}

#[async_trait]
impl PointSource for MemoryPointStore {
    async fn find_in_bbox(&self, bbox: &BoundingBox) -> HeatmapResult<Vec<GeoPoint>> {
        Ok(self
            .points
            .iter()
            .filter(|p| bbox.contains(p))
            .copied()
            .collect())
    }

    async fn count(&self) -> HeatmapResult<u64> {
        Ok(self.points.len() as u64)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs() {
        let store = MemoryPointStore::from_geojson_str("[[2.35, 48.85], [-74.0, 40.7]]").unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.points()[1], GeoPoint::new(-74.0, 40.7));
    }

    #[test]
    fn test_point_with_altitude() {
        let json = r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{},"geometry":{"type":"Point","coordinates":[1.0,2.0,300.0]}},
            {"type":"Feature","properties":{},"geometry":null}
        ]}"#;
        let store = MemoryPointStore::from_geojson_str(json).unwrap();
        assert_eq!(store.points(), &[GeoPoint::new(1.0, 2.0)]);
    }

    #[test]
    fn test_rejects_other_documents() {
        assert!(MemoryPointStore::from_geojson_str(r#"{"type":"Feature","geometry":null}"#).is_err());
        assert!(MemoryPointStore::from_geojson_str(
            r#"{"type":"GeometryCollection","features":[]}"#
        )
        .is_err());
        assert!(MemoryPointStore::from_geojson_str("not json").is_err());
    }
}
