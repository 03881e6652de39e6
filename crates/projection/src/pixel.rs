//! Point projector: geographic point → tile-relative pixel.
//!
//! The tile's origin corner and the point are both located at
//! `zoom + OVERSAMPLE_LEVELS` using the integer addressing transforms; their
//! difference is the pixel offset inside the tile. Because
//! `2^OVERSAMPLE_LEVELS == 256`, one oversampled column or row is exactly
//! one output pixel.
//!
//! Addressing rows count up from the south, image rows count down from the
//! top, so the row offset is flipped once more here (`256 - dy`). That flip
//! is independent of the one inside [`lat_to_y`].

use heatmap_common::tile::{lat_to_y, lon_to_x, x_to_lon, y_to_lat};
use heatmap_common::{GeoPoint, TileCoord};
use serde::{Deserialize, Serialize};

/// Zoom levels below the tile at which points are located.
///
/// 8 levels = 256x finer = one unit per output pixel.
pub const OVERSAMPLE_LEVELS: u32 = 8;

/// Integer pixel position relative to a tile's top-left corner.
///
/// Can fall outside `[0, 256]` for points near (or beyond) the tile edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i64,
    pub y: i64,
}

impl PixelPoint {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Shift by a margin, e.g. into the coordinates of a buffer that is
    /// larger than the tile on every side.
    pub fn offset(&self, margin: i64) -> Self {
        Self {
            x: self.x + margin,
            y: self.y + margin,
        }
    }
}

/// Projects points into the pixel space of one tile.
///
/// The tile corner is computed once, so projecting many points for the same
/// tile only costs the per-point transforms.
#[derive(Debug, Clone, Copy)]
pub struct PixelProjector {
    tile: TileCoord,
    deep_zoom: u32,
    corner_x: i64,
    corner_y: i64,
    tile_pixels: i64,
}

impl PixelProjector {
    pub fn new(tile: TileCoord) -> Self {
        Self::with_oversample(tile, OVERSAMPLE_LEVELS)
    }

    /// Projector locating points `oversample_levels` below the tile.
    pub fn with_oversample(tile: TileCoord, oversample_levels: u32) -> Self {
        let deep_zoom = tile.z + oversample_levels;

        // Origin corner of the tile in flipped-row space: west edge of the
        // column, southern edge of the row.
        let west = x_to_lon(tile.z, tile.x as i64);
        let south = y_to_lat(tile.z, tile.flipped_row() as i64);

        Self {
            tile,
            deep_zoom,
            corner_x: lon_to_x(deep_zoom, west),
            corner_y: lat_to_y(deep_zoom, south),
            tile_pixels: 1i64 << oversample_levels,
        }
    }

    pub fn tile(&self) -> TileCoord {
        self.tile
    }

    pub fn project(&self, point: &GeoPoint) -> PixelPoint {
        let dx = lon_to_x(self.deep_zoom, point.lon) - self.corner_x;
        let dy = lat_to_y(self.deep_zoom, point.lat) - self.corner_y;

        PixelPoint {
            x: dx,
            y: self.tile_pixels - dy,
        }
    }
}

/// Project a single point into the pixel space of `tile`.
pub fn project_point(point: &GeoPoint, tile: &TileCoord, oversample_levels: u32) -> PixelPoint {
    PixelProjector::with_oversample(*tile, oversample_levels).project(point)
}

/// Project every point into the pixel space of `tile` at the default
/// oversampling.
pub fn project_points(points: &[GeoPoint], tile: &TileCoord) -> Vec<PixelPoint> {
    let projector = PixelProjector::new(*tile);
    points.iter().map(|p| projector.project(p)).collect()
}
