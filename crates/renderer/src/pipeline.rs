//! Tile rendering pipeline: project, accumulate, colorize, crop.

use std::sync::Arc;
use std::time::Instant;

use heatmap_common::{BoundingBox, GeoPoint, HeatmapError, HeatmapResult, TileCoord, TileMargin};
use image::RgbaImage;
use projection::{PixelPoint, PixelProjector};
use tracing::debug;

use crate::compositor::crop_to_tile;
use crate::density::{render_density, DotKernel, RenderOptions};
use crate::encode::{encode_as, ImageFormat};
use crate::scheme::ColorScheme;

/// Renders heatmap tiles with one color scheme and one set of options.
///
/// Cheap to clone; the scheme is shared.
#[derive(Debug, Clone)]
pub struct TileRenderer {
    scheme: Arc<ColorScheme>,
    options: RenderOptions,
    kernel: Arc<DotKernel>,
}

impl TileRenderer {
    pub fn new(scheme: Arc<ColorScheme>, options: RenderOptions) -> HeatmapResult<Self> {
        options.validate()?;
        Ok(Self {
            scheme,
            kernel: Arc::new(DotKernel::new(options.dot_radius)),
            options,
        })
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn scheme(&self) -> &ColorScheme {
        &self.scheme
    }

    pub fn margin(&self) -> TileMargin {
        self.options.margin()
    }

    /// Geographic area whose points can affect `tile`.
    pub fn query_bounds(&self, tile: &TileCoord) -> BoundingBox {
        self.margin().query_bounds(tile)
    }

    /// Render `points` into a 256x256 RGBA tile.
    ///
    /// Points that cannot be projected (non-finite, or outside the Mercator
    /// latitude range) are skipped. An empty set, before or after skipping,
    /// is [`HeatmapError::NoData`].
    pub fn render(&self, tile: &TileCoord, points: &[GeoPoint]) -> HeatmapResult<RgbaImage> {
        let start = Instant::now();

        let projector = PixelProjector::new(*tile);
        let pixels: Vec<PixelPoint> = points
            .iter()
            .filter(|p| p.is_projectable())
            .map(|p| projector.project(p))
            .collect();

        let skipped = points.len() - pixels.len();
        if skipped > 0 {
            debug!(tile = %tile, skipped, "Skipped unprojectable points");
        }
        if pixels.is_empty() {
            return Err(HeatmapError::NoData(tile.to_string()));
        }

        let rendered = render_density(&pixels, &self.kernel, &self.options, &self.scheme)?;
        let image = crop_to_tile(&rendered, &self.margin())?;

        debug!(
            tile = %tile,
            points = pixels.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "Rendered heatmap tile"
        );

        Ok(image)
    }

    pub fn render_encoded(
        &self,
        tile: &TileCoord,
        points: &[GeoPoint],
        format: ImageFormat,
    ) -> HeatmapResult<Vec<u8>> {
        let image = self.render(tile, points)?;
        encode_as(&image, format)
    }
}

impl Default for TileRenderer {
    fn default() -> Self {
        let options = RenderOptions::default();
        Self {
            scheme: Arc::new(ColorScheme::default()),
            kernel: Arc::new(DotKernel::new(options.dot_radius)),
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::fixtures;

    #[test]
    fn test_empty_is_no_data() {
        let renderer = TileRenderer::default();
        let err = renderer.render(&fixtures::paris_tile(), &[]).unwrap_err();
        assert!(matches!(err, HeatmapError::NoData(_)));
    }

    #[test]
    fn test_all_unprojectable_is_no_data() {
        let renderer = TileRenderer::default();
        let points = [GeoPoint::new(f64::NAN, 0.0), GeoPoint::new(0.0, 89.0)];
        assert!(matches!(
            renderer.render(&TileCoord::new(0, 0, 0), &points),
            Err(HeatmapError::NoData(_))
        ));
    }

    #[test]
    fn test_centre_point_is_painted() {
        let renderer = TileRenderer::default();
        let tile = fixtures::paris_tile();
        let image = renderer
            .render(&tile, &[fixtures::point_in_tile(&tile, 0.5, 0.5)])
            .unwrap();

        assert_eq!(image.dimensions(), (256, 256));
        assert!(image.get_pixel(128, 128).0[3] > 0);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = RenderOptions {
            dot_radius: 0,
            intensity_cap: 128,
        };
        assert!(TileRenderer::new(Arc::new(ColorScheme::fire()), options).is_err());
    }
}
