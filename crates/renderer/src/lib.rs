//! Heatmap tile rendering.
//!
//! Points are projected into a tile's pixel space, stamped as radial dots
//! onto a margin-extended density field, colorized through a scheme lookup
//! table, cropped to 256x256 and encoded as PNG or JPEG.

pub mod compositor;
pub mod density;
pub mod encode;
pub mod pipeline;
pub mod png;
pub mod scheme;

pub use density::{DensityField, DotKernel, RenderOptions, DEFAULT_DOT_RADIUS, DEFAULT_INTENSITY_CAP};
pub use encode::{encode, encode_as, ImageFormat};
pub use pipeline::TileRenderer;
pub use scheme::ColorScheme;
