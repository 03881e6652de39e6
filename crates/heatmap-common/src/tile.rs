//! Slippy-map tile addressing.
//!
//! Conversions between geographic coordinates and tile indices under the
//! Web Mercator tiling scheme. Columns count eastward from -180°. Rows come
//! in two flavours:
//!
//! - the *slippy* row carried by [`TileCoord::y`] and the `/z/x/y` URL,
//!   row 0 at the northern edge of the map;
//! - the *flipped* row produced by [`lat_to_y`] and consumed by
//!   [`y_to_lat`], row 0 at the southern edge (TMS ordering).
//!
//! [`TileCoord::flipped_row`] converts between the two. The pixel projector
//! applies a second, screen-space flip on top of this one.

use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::point::MAX_LATITUDE;
use crate::{BoundingBox, HeatmapError, HeatmapResult};

/// Output tile width and height in pixels.
pub const TILE_SIZE: u32 = 256;

/// Deepest zoom level accepted for a tile request.
///
/// Projection works 8 levels deeper than the tile, so indices stay well
/// inside `i64` and f64 keeps sub-pixel precision.
pub const MAX_ZOOM: u32 = 24;

/// Number of tiles per axis at a zoom level: `2^zoom`.
pub fn tile_count(zoom: u32) -> u64 {
    1u64 << zoom
}

/// Tolerance for snapping a floor onto an exact tile boundary.
///
/// Scaled with the tile count, since f64 loses absolute precision as the
/// index grows.
fn boundary_tolerance(n: f64) -> f64 {
    (n * 1e-12).max(1e-9)
}

/// Floor that treats values within tolerance of an integer as that integer.
fn snap_floor(value: f64, n: f64) -> i64 {
    let nearest = value.round();
    if (value - nearest).abs() <= boundary_tolerance(n) {
        nearest as i64
    } else {
        value.floor() as i64
    }
}

/// Column index containing a longitude at a zoom level.
///
/// No validation: longitudes outside [-180, 180] give columns outside
/// `[0, 2^zoom)`.
pub fn lon_to_x(zoom: u32, lon: f64) -> i64 {
    let n = tile_count(zoom) as f64;
    snap_floor(n * (lon + 180.0) / 360.0, n)
}

/// Longitude of the western edge of column `x`.
pub fn x_to_lon(zoom: u32, x: i64) -> f64 {
    x_to_lon_f(zoom, x as f64)
}

/// Longitude at a fractional column position.
pub fn x_to_lon_f(zoom: u32, x: f64) -> f64 {
    x / tile_count(zoom) as f64 * 360.0 - 180.0
}

/// Flipped row index (row 0 southernmost) containing a latitude.
///
/// Undefined as the latitude approaches ±90°; callers keep points inside
/// the Mercator band (see [`crate::GeoPoint::is_projectable`]).
pub fn lat_to_y(zoom: u32, lat: f64) -> i64 {
    let n = tile_count(zoom) as f64;
    let lat_rad = lat.to_radians();

    // asinh(tan φ) == ln(tan φ + sec φ), without the cancellation south of
    // the equator.
    let y_merc = n * (1.0 - lat_rad.tan().asinh() / PI) / 2.0;

    // North-up row flip. Equal to `n - floor(y_merc) - 1` away from row
    // boundaries; a boundary belongs to the row north of it.
    snap_floor(n - y_merc, n)
}

/// Latitude of the southern edge of flipped row `y`.
pub fn y_to_lat(zoom: u32, y: i64) -> f64 {
    y_to_lat_f(zoom, y as f64)
}

/// Latitude at a fractional flipped-row position.
pub fn y_to_lat_f(zoom: u32, y: f64) -> f64 {
    let n = tile_count(zoom) as f64;
    let lat_rad = (PI * (1.0 - 2.0 * y / n)).sinh().atan();
    -lat_rad.to_degrees()
}

/// A tile coordinate (z/x/y) with a slippy (north-origin) row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y), 0 at the north
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Create a tile coordinate, rejecting indices outside `[0, 2^z)`.
    pub fn try_new(z: u32, x: u32, y: u32) -> HeatmapResult<Self> {
        if z > MAX_ZOOM {
            return Err(HeatmapError::TileOutOfRange { z, x, y });
        }
        let n = tile_count(z);
        if x as u64 >= n || y as u64 >= n {
            return Err(HeatmapError::TileOutOfRange { z, x, y });
        }
        Ok(Self { z, x, y })
    }

    /// Build a tile from a flipped (south-origin) row.
    pub fn from_flipped(z: u32, x: u32, flipped_row: u32) -> Self {
        let n = tile_count(z);
        Self {
            z,
            x,
            y: (n - 1 - flipped_row as u64) as u32,
        }
    }

    /// Row index in the flipped (south-origin) convention of [`lat_to_y`].
    pub fn flipped_row(&self) -> u32 {
        (tile_count(self.z) - 1 - self.y as u64) as u32
    }

    /// Get the parent tile (zoom - 1).
    pub fn parent(&self) -> Option<TileCoord> {
        if self.z == 0 {
            return None;
        }
        Some(TileCoord {
            z: self.z - 1,
            x: self.x / 2,
            y: self.y / 2,
        })
    }

    /// Get the four children tiles (zoom + 1).
    pub fn children(&self) -> [TileCoord; 4] {
        let x = self.x * 2;
        let y = self.y * 2;
        let z = self.z + 1;
        [
            TileCoord { z, x, y },
            TileCoord { z, x: x + 1, y },
            TileCoord { z, x, y: y + 1 },
            TileCoord {
                z,
                x: x + 1,
                y: y + 1,
            },
        ]
    }

    /// Geographic bounds of the tile.
    pub fn bounds(&self) -> BoundingBox {
        let x = self.x as i64;
        let row = self.flipped_row() as i64;

        BoundingBox::new(
            x_to_lon(self.z, x),
            y_to_lat(self.z, row),
            x_to_lon(self.z, x + 1),
            y_to_lat(self.z, row + 1),
        )
    }

    /// Geographic bounds enlarged by `buffer` tiles on every side.
    ///
    /// The buffer is applied in tile-index space before unprojecting, so the
    /// latitude margin follows the Mercator stretch. The result is clamped to
    /// the valid longitude range and the Mercator latitude band.
    pub fn buffered_bounds(&self, buffer: f64) -> BoundingBox {
        let x = self.x as f64;
        let row = self.flipped_row() as f64;

        BoundingBox::new(
            x_to_lon_f(self.z, x - buffer).max(-180.0),
            y_to_lat_f(self.z, row - buffer).max(-MAX_LATITUDE),
            x_to_lon_f(self.z, x + 1.0 + buffer).min(180.0),
            y_to_lat_f(self.z, row + 1.0 + buffer).min(MAX_LATITUDE),
        )
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Tile containing a lat/lon point, clamped to the tile grid.
pub fn latlon_to_tile(lat: f64, lon: f64, zoom: u32) -> TileCoord {
    let max = tile_count(zoom) as i64 - 1;
    let x = lon_to_x(zoom, lon).clamp(0, max) as u32;
    let row = lat_to_y(zoom, lat).clamp(0, max) as u32;
    TileCoord::from_flipped(zoom, x, row)
}

/// TMS (Tile Map Service) Y-flip conversion.
/// TMS uses bottom-left origin, while XYZ uses top-left.
pub fn tms_to_xyz(z: u32, x: u32, y: u32) -> TileCoord {
    TileCoord::from_flipped(z, x, y)
}

pub fn xyz_to_tms(coord: &TileCoord) -> (u32, u32, u32) {
    (coord.z, coord.x, coord.flipped_row())
}

// =============================================================================
// TileMargin - pixel margin around a rendered tile
// =============================================================================

/// Pixel margin rendered around a tile.
///
/// Dots near the tile edge spill past it; rendering into a buffer that is
/// `margin_pixels` larger on every side and cropping afterwards keeps them
/// whole.
///
/// # Example
/// ```
/// use heatmap_common::tile::TileMargin;
///
/// let margin = TileMargin::default();
/// assert_eq!(margin.render_width(), 288);
/// assert_eq!(margin.margin_fraction(), 16.0 / 256.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileMargin {
    /// Margin size in pixels on each side of the tile
    pub margin_pixels: u32,
    /// Base tile size (256)
    pub tile_size: u32,
}

impl Default for TileMargin {
    fn default() -> Self {
        Self {
            margin_pixels: 16,
            tile_size: TILE_SIZE,
        }
    }
}

impl TileMargin {
    pub fn new(margin_pixels: u32, tile_size: u32) -> Self {
        Self {
            margin_pixels,
            tile_size,
        }
    }

    /// Margin matching a dot radius on a standard 256px tile.
    pub fn for_dot_radius(radius: u32) -> Self {
        Self::new(radius, TILE_SIZE)
    }

    /// Total render width including the margin on both sides.
    pub fn render_width(&self) -> u32 {
        self.tile_size + 2 * self.margin_pixels
    }

    /// Total render height including the margin on both sides.
    pub fn render_height(&self) -> u32 {
        self.tile_size + 2 * self.margin_pixels
    }

    /// Margin as a fraction of the tile size (16/256 by default).
    pub fn margin_fraction(&self) -> f64 {
        self.margin_pixels as f64 / self.tile_size as f64
    }

    /// Bounding box to query for points contributing to a tile.
    pub fn query_bounds(&self, coord: &TileCoord) -> BoundingBox {
        coord.buffered_bounds(self.margin_fraction())
    }
}
