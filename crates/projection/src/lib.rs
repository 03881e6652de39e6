//! Projection of geographic points into tile pixel space.
//!
//! Works on top of the integer tile math in `heatmap_common::tile`:
//! projecting a point 8 zoom levels below its tile yields a column/row index
//! that is exactly one output pixel wide.

pub mod pixel;

pub use pixel::{project_point, project_points, PixelPoint, PixelProjector, OVERSAMPLE_LEVELS};
