//! Temporary on-disk point files.

use std::io::Write;

use heatmap_common::GeoPoint;
use tempfile::NamedTempFile;

/// Serialize points as a GeoJSON FeatureCollection.
pub fn points_to_geojson(points: &[GeoPoint]) -> String {
    let features: Vec<serde_json::Value> = points
        .iter()
        .map(|p| {
            serde_json::json!({
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Point", "coordinates": [p.lon, p.lat] }
            })
        })
        .collect();

    serde_json::json!({ "type": "FeatureCollection", "features": features }).to_string()
}

/// Write `contents` to a temporary `.geojson` file.
///
/// The file is removed when the returned handle is dropped.
pub fn write_temp_geojson(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".geojson")
        .tempfile()
        .expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp file");
    file.flush().expect("failed to flush temp file");
    file
}

/// Write points to a temporary GeoJSON file.
pub fn write_points_file(points: &[GeoPoint]) -> NamedTempFile {
    write_temp_geojson(&points_to_geojson(points))
}
