//! Error types for the heatmap tile crates.

use thiserror::Error;

/// Result type alias using HeatmapError.
pub type HeatmapResult<T> = Result<T, HeatmapError>;

/// Primary error type for tile addressing, rendering and point lookup.
#[derive(Debug, Error)]
pub enum HeatmapError {
    // === Request Errors ===
    #[error("Malformed tile address: {0}")]
    MalformedAddress(String),

    #[error("Tile out of range: {z}/{x}/{y}")]
    TileOutOfRange { z: u32, x: u32, y: u32 },

    #[error("No data for tile {0}")]
    NoData(String),

    #[error("Unsupported image format: '{0}'. Only 'jpg' or 'png' allowed.")]
    UnsupportedFormat(String),

    // === Point Source Errors ===
    #[error("Point source error: {0}")]
    PointSourceError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    // === Rendering Errors ===
    #[error("Invalid color scheme: {0}")]
    InvalidColorScheme(String),

    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("Encoding failed: {0}")]
    EncodeError(String),

    // === Infrastructure Errors ===
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl HeatmapError {
    /// Short label used for logging and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            HeatmapError::MalformedAddress(_) => "malformed_address",
            HeatmapError::TileOutOfRange { .. } => "tile_out_of_range",
            HeatmapError::NoData(_) => "no_data",
            HeatmapError::UnsupportedFormat(_) => "unsupported_format",
            HeatmapError::PointSourceError(_) | HeatmapError::DatabaseError(_) => "upstream",
            HeatmapError::InvalidColorScheme(_) => "color_scheme",
            HeatmapError::RenderError(_) | HeatmapError::EncodeError(_) => "render",
            HeatmapError::ConfigError(_) => "config",
            HeatmapError::InternalError(_) => "internal",
        }
    }

    /// Get the HTTP status code for this error.
    ///
    /// The tile endpoint never distinguishes request failures: every
    /// request-scoped error is reported as not found.
    pub fn http_status_code(&self) -> u16 {
        match self {
            HeatmapError::ConfigError(_) => 500,
            _ => 404,
        }
    }
}

impl From<std::io::Error> for HeatmapError {
    fn from(err: std::io::Error) -> Self {
        HeatmapError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for HeatmapError {
    fn from(err: serde_json::Error) -> Self {
        HeatmapError::InternalError(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_format_names_value() {
        let err = HeatmapError::UnsupportedFormat("gif".to_string());
        let msg = err.to_string();
        assert!(msg.contains("'gif'"));
        assert_eq!(err.kind(), "unsupported_format");
    }

    #[test]
    fn test_request_errors_map_to_not_found() {
        assert_eq!(HeatmapError::NoData("0/0/0".into()).http_status_code(), 404);
        assert_eq!(
            HeatmapError::TileOutOfRange { z: 0, x: 1, y: 0 }.http_status_code(),
            404
        );
        assert_eq!(HeatmapError::DatabaseError("down".into()).http_status_code(), 404);
        assert_eq!(HeatmapError::ConfigError("bad".into()).http_status_code(), 500);
    }
}
