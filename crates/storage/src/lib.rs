//! Point storage for the heatmap tile service.
//!
//! Provides a [`PointSource`] trait with two backends:
//! - PostgreSQL point catalog
//! - In-memory store loaded from GeoJSON

pub mod catalog;
pub mod memory;
pub mod source;

pub use catalog::PointCatalog;
pub use memory::MemoryPointStore;
pub use source::PointSource;
