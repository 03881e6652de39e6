//! Shared test utilities for the heatmap tile workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Fixture tiles and point sets
//! - Seeded point generators
//! - Temporary GeoJSON point files
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod files;
pub mod fixtures;
pub mod generators;

// Re-export commonly used items at the crate root
pub use files::*;
pub use generators::*;
