//! Service configuration from environment variables.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use heatmap_common::{HeatmapError, HeatmapResult};
use renderer::{RenderOptions, DEFAULT_DOT_RADIUS, DEFAULT_INTENSITY_CAP};

pub const DEFAULT_COLOR_SCHEME: &str = "pbj";
pub const DEFAULT_PAGE_TITLE: &str = "Heatmap";

/// Where tile queries read their points from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointSourceConfig {
    /// PostgreSQL point catalog, optionally seeded from a GeoJSON file
    /// when the table is empty
    Postgres {
        database_url: String,
        seed_file: Option<PathBuf>,
    },
    /// GeoJSON file loaded into memory at startup
    File { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub point_source: PointSourceConfig,
    pub render: RenderOptions,
    /// Built-in scheme name or path to a JSON scheme definition
    pub color_scheme: String,
    pub page_title: String,
}

impl ServiceConfig {
    pub fn from_env() -> HeatmapResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> HeatmapResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let point_source = match (get("DATABASE_URL"), get("POINTS_FILE")) {
            (Some(database_url), seed) => PointSourceConfig::Postgres {
                database_url,
                seed_file: seed.map(PathBuf::from),
            },
            (None, Some(path)) => PointSourceConfig::File {
                path: PathBuf::from(path),
            },
            (None, None) => {
                return Err(HeatmapError::ConfigError(
                    "no point source configured: set DATABASE_URL or POINTS_FILE".to_string(),
                ))
            }
        };

        let render = RenderOptions {
            dot_radius: parse_u32(get("HEATMAP_DOT_RADIUS"), "HEATMAP_DOT_RADIUS", DEFAULT_DOT_RADIUS)?,
            intensity_cap: parse_u32(
                get("HEATMAP_INTENSITY_CAP"),
                "HEATMAP_INTENSITY_CAP",
                DEFAULT_INTENSITY_CAP,
            )?,
        };
        render.validate()?;

        Ok(Self {
            point_source,
            render,
            color_scheme: get("HEATMAP_COLOR_SCHEME").unwrap_or_else(|| DEFAULT_COLOR_SCHEME.to_string()),
            page_title: get("HEATMAP_PAGE_TITLE").unwrap_or_else(|| DEFAULT_PAGE_TITLE.to_string()),
        })
    }
}

fn parse_u32(value: Option<String>, key: &str, default: u32) -> HeatmapResult<u32> {
    match value {
        None => Ok(default),
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| HeatmapError::ConfigError(format!("{} must be a positive integer, got '{}'", key, v))),
    }
}

/// Listen address, with the port replaced by `port` when given.
pub fn resolve_listen_addr(listen: &str, port: Option<&str>) -> HeatmapResult<SocketAddr> {
    let mut addr: SocketAddr = listen
        .parse()
        .map_err(|e| HeatmapError::ConfigError(format!("invalid listen address '{}': {}", listen, e)))?;

    if let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) {
        let port: u16 = port
            .parse()
            .map_err(|_| HeatmapError::ConfigError(format!("invalid PORT '{}'", port)))?;
        addr.set_port(port);
    }

    Ok(addr)
}
