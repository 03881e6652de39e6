//! Common types and utilities shared across the heatmap tile crates.

pub mod bbox;
pub mod error;
pub mod point;
pub mod tile;

pub use bbox::BoundingBox;
pub use error::{HeatmapError, HeatmapResult};
pub use point::{GeoPoint, MAX_LATITUDE};
pub use tile::{TileCoord, TileMargin, MAX_ZOOM, TILE_SIZE};
