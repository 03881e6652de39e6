//! Common test fixtures for heatmap tests.
//!
//! Well-known tiles and small hand-written point sets.

use heatmap_common::tile::latlon_to_tile;
use heatmap_common::{GeoPoint, TileCoord};

/// Common bounding box definitions for testing, as (min_lon, min_lat, max_lon, max_lat).
pub mod bbox {
    /// Central Paris
    pub const PARIS: (f64, f64, f64, f64) = (2.25, 48.80, 2.45, 48.92);
}

/// Zoom 12 tile over central Paris.
pub fn paris_tile() -> TileCoord {
    latlon_to_tile(48.8566, 2.3522, 12)
}

/// Zoom 10 tile over lower Manhattan.
pub fn nyc_tile() -> TileCoord {
    latlon_to_tile(40.7128, -74.0060, 10)
}

/// A spread of tiles across zoom levels and hemispheres.
pub fn sample_tiles() -> Vec<TileCoord> {
    vec![
        TileCoord::new(0, 0, 0),
        TileCoord::new(1, 0, 0),
        TileCoord::new(1, 1, 1),
        TileCoord::new(4, 3, 12),
        paris_tile(),
        nyc_tile(),
        latlon_to_tile(-33.8688, 151.2093, 14), // Sydney
        latlon_to_tile(64.1466, -21.9426, 16),  // Reykjavik
        TileCoord::new(20, 524_287, 524_288),
    ]
}

/// Geographic centre of a tile, in the middle of its longitude and latitude range.
pub fn tile_center(tile: &TileCoord) -> GeoPoint {
    let b = tile.bounds();
    GeoPoint::new((b.min_x + b.max_x) / 2.0, (b.min_y + b.max_y) / 2.0)
}

/// Point at fractional position (`fx`, `fy`) inside a tile, measured from
/// the top-left corner.
pub fn point_in_tile(tile: &TileCoord, fx: f64, fy: f64) -> GeoPoint {
    let b = tile.bounds();
    GeoPoint::new(b.min_x + b.width() * fx, b.max_y - b.height() * fy)
}

/// A few landmarks spread over central Paris.
pub fn paris_landmarks() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(2.2945, 48.8584), // Eiffel Tower
        GeoPoint::new(2.3499, 48.8530), // Notre-Dame
        GeoPoint::new(2.3376, 48.8606), // Louvre
        GeoPoint::new(2.2950, 48.8738), // Arc de Triomphe
        GeoPoint::new(2.3431, 48.8867), // Sacré-Cœur
    ]
}

/// GeoJSON FeatureCollection with the Paris landmarks plus one
/// non-point feature that loaders must skip.
pub fn paris_geojson() -> String {
    let mut features: Vec<serde_json::Value> = paris_landmarks()
        .iter()
        .map(|p| {
            serde_json::json!({
                "type": "Feature",
                "properties": {},
                "geometry": { "type": "Point", "coordinates": [p.lon, p.lat] }
            })
        })
        .collect();

    features.push(serde_json::json!({
        "type": "Feature",
        "properties": { "name": "Seine" },
        "geometry": {
            "type": "LineString",
            "coordinates": [[2.25, 48.84], [2.40, 48.85]]
        }
    }));

    serde_json::json!({ "type": "FeatureCollection", "features": features }).to_string()
}
