//! Application state and shared resources.

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use heatmap_common::HeatmapResult;
use renderer::{ColorScheme, TileRenderer};
use storage::{MemoryPointStore, PointCatalog, PointSource};

use crate::config::{PointSourceConfig, ServiceConfig};

/// Shared application state.
pub struct AppState {
    pub points: Arc<dyn PointSource>,
    pub renderer: TileRenderer,
    pub page_title: String,
}

impl AppState {
    pub fn new(points: Arc<dyn PointSource>, renderer: TileRenderer, page_title: impl Into<String>) -> Self {
        Self {
            points,
            renderer,
            page_title: page_title.into(),
        }
    }

    /// Open the configured point source and build the renderer.
    pub async fn from_config(config: &ServiceConfig) -> HeatmapResult<Self> {
        let points: Arc<dyn PointSource> = match &config.point_source {
            PointSourceConfig::Postgres {
                database_url,
                seed_file,
            } => {
                let catalog = PointCatalog::connect(database_url).await?;
                catalog.migrate().await?;
                if let Some(path) = seed_file {
                    seed_catalog(&catalog, path).await?;
                }
                Arc::new(catalog)
            }
            PointSourceConfig::File { path } => Arc::new(MemoryPointStore::from_file(path)?),
        };

        let scheme = ColorScheme::from_name_or_path(&config.color_scheme)?;
        let renderer = TileRenderer::new(Arc::new(scheme), config.render)?;

        info!(
            source = points.name(),
            points = points.count().await?,
            scheme = renderer.scheme().name(),
            dot_radius = config.render.dot_radius,
            intensity_cap = config.render.intensity_cap,
            "Application state initialized"
        );

        Ok(Self::new(points, renderer, config.page_title.clone()))
    }
}

/// Load a GeoJSON file into an empty catalog. A catalog that already holds
/// points is left alone so restarts do not duplicate data.
async fn seed_catalog(catalog: &PointCatalog, path: &Path) -> HeatmapResult<()> {
    let existing = catalog.count().await?;
    if existing > 0 {
        info!(existing, path = %path.display(), "Point catalog already populated; skipping seed");
        return Ok(());
    }

    let store = MemoryPointStore::from_file(path)?;
    let inserted = catalog.insert_points(store.points()).await?;
    info!(inserted, path = %path.display(), "Seeded point catalog");
    Ok(())
}
