//! Cropping the margin-extended render down to the tile.

use heatmap_common::{HeatmapError, HeatmapResult, TileMargin};
use image::RgbaImage;

/// Extract the central tile from a render that includes `margin` on every side.
pub fn crop_to_tile(rendered: &RgbaImage, margin: &TileMargin) -> HeatmapResult<RgbaImage> {
    let render_width = margin.render_width();
    let render_height = margin.render_height();

    if rendered.width() != render_width || rendered.height() != render_height {
        return Err(HeatmapError::RenderError(format!(
            "expected {}x{} render buffer, got {}x{}",
            render_width,
            render_height,
            rendered.width(),
            rendered.height()
        )));
    }

    if margin.margin_pixels == 0 {
        return Ok(rendered.clone());
    }

    let render_width = render_width as usize;
    let tile_size = margin.tile_size as usize;
    let offset = margin.margin_pixels as usize;
    let src = rendered.as_raw();

    let mut result = vec![0u8; tile_size * tile_size * 4];
    for (row, dst) in result.chunks_exact_mut(tile_size * 4).enumerate() {
        let src_start = ((offset + row) * render_width + offset) * 4;
        dst.copy_from_slice(&src[src_start..src_start + tile_size * 4]);
    }

    RgbaImage::from_raw(margin.tile_size, margin.tile_size, result)
        .ok_or_else(|| HeatmapError::RenderError("cropped buffer size mismatch".to_string()))
}
