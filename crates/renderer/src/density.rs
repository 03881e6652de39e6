//! Density accumulation and colorization.
//!
//! Every point stamps a radial dot onto a grid that is larger than the tile
//! by the dot radius on every side, so dots centred just outside the tile
//! still bleed into it. Accumulation is a saturating sum, which makes the
//! result independent of point order.

use heatmap_common::{HeatmapError, HeatmapResult, TileMargin};
use image::RgbaImage;
use projection::PixelPoint;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::scheme::ColorScheme;

pub const DEFAULT_DOT_RADIUS: u32 = 16;
pub const DEFAULT_INTENSITY_CAP: u32 = 128;

/// Largest dot radius accepted; a dot wider than the tile is meaningless.
pub const MAX_DOT_RADIUS: u32 = 256;

/// Kernel weight at the centre of a dot.
const KERNEL_PEAK: f64 = 255.0;

/// Render parameters shared by every tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Dot radius in pixels. Also the render margin on each side.
    pub dot_radius: u32,

    /// Accumulated density mapped to the top of the color scheme.
    pub intensity_cap: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            dot_radius: DEFAULT_DOT_RADIUS,
            intensity_cap: DEFAULT_INTENSITY_CAP,
        }
    }
}

impl RenderOptions {
    pub fn validate(&self) -> HeatmapResult<()> {
        if self.dot_radius == 0 || self.dot_radius > MAX_DOT_RADIUS {
            return Err(HeatmapError::ConfigError(format!(
                "dot radius must be in 1..={}, got {}",
                MAX_DOT_RADIUS, self.dot_radius
            )));
        }
        if self.intensity_cap == 0 {
            return Err(HeatmapError::ConfigError(
                "intensity cap must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn margin(&self) -> TileMargin {
        TileMargin::for_dot_radius(self.dot_radius)
    }
}

/// Precomputed radial weights: `round(255 * (1 - d / r))` inside the radius,
/// zero outside.
#[derive(Debug, Clone)]
pub struct DotKernel {
    radius: i64,
    side: usize,
    weights: Vec<u32>,
}

impl DotKernel {
    pub fn new(radius: u32) -> Self {
        let r = radius as i64;
        let side = (2 * r + 1) as usize;
        let mut weights = vec![0u32; side * side];

        for dy in -r..=r {
            for dx in -r..=r {
                let d = ((dx * dx + dy * dy) as f64).sqrt();
                if d < radius as f64 {
                    let idx = (dy + r) as usize * side + (dx + r) as usize;
                    weights[idx] = (KERNEL_PEAK * (1.0 - d / radius as f64)).round() as u32;
                }
            }
        }

        Self {
            radius: r,
            side,
            weights,
        }
    }

    pub fn radius(&self) -> u32 {
        self.radius as u32
    }

    /// Weight at offset (`dx`, `dy`) from the dot centre.
    pub fn weight(&self, dx: i64, dy: i64) -> u32 {
        if dx.abs() > self.radius || dy.abs() > self.radius {
            return 0;
        }
        self.weights[(dy + self.radius) as usize * self.side + (dx + self.radius) as usize]
    }
}

/// Accumulated density over the margin-extended render area.
#[derive(Debug, Clone)]
pub struct DensityField {
    width: usize,
    height: usize,
    margin: i64,
    cells: Vec<u32>,
}

impl DensityField {
    pub fn new(margin: &TileMargin) -> Self {
        Self {
            width: margin.render_width() as usize,
            height: margin.render_height() as usize,
            margin: margin.margin_pixels as i64,
            cells: vec![0; (margin.render_width() * margin.render_height()) as usize],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Density at field coordinates (margin included).
    pub fn get(&self, x: usize, y: usize) -> u32 {
        self.cells[y * self.width + x]
    }

    pub fn max_value(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&c| c == 0)
    }

    /// Stamp a dot centred at tile-relative pixel `center`.
    pub fn add_dot(&mut self, center: PixelPoint, kernel: &DotKernel) {
        let c = center.offset(self.margin);
        let r = kernel.radius;

        let x0 = (c.x - r).max(0);
        let x1 = (c.x + r).min(self.width as i64 - 1);
        let y0 = (c.y - r).max(0);
        let y1 = (c.y + r).min(self.height as i64 - 1);
        if x0 > x1 || y0 > y1 {
            return;
        }

        for fy in y0..=y1 {
            let row = fy as usize * self.width;
            for fx in x0..=x1 {
                let w = kernel.weight(fx - c.x, fy - c.y);
                if w > 0 {
                    let cell = &mut self.cells[row + fx as usize];
                    *cell = cell.saturating_add(w);
                }
            }
        }
    }

    pub fn accumulate(&mut self, points: &[PixelPoint], kernel: &DotKernel) {
        for p in points {
            self.add_dot(*p, kernel);
        }
    }

    /// Map densities to colors. Zero density stays fully transparent;
    /// anything at or above `cap` takes the top of the scheme.
    pub fn colorize(&self, scheme: &ColorScheme, cap: u32) -> RgbaImage {
        let cap = cap.max(1);
        let mut image = RgbaImage::new(self.width as u32, self.height as u32);
        let pixels: &mut [u8] = &mut image;

        pixels
            .par_chunks_mut(self.width * 4)
            .zip(self.cells.par_chunks(self.width))
            .for_each(|(out_row, cell_row)| {
                for (px, &acc) in out_row.chunks_exact_mut(4).zip(cell_row) {
                    let v = acc.min(cap);
                    if v == 0 {
                        continue;
                    }
                    px.copy_from_slice(&scheme.color_for(v as f64 / cap as f64));
                }
            });

        image
    }
}

/// Accumulate and colorize tile-relative points into a margin-extended image.
///
/// An empty point set is [`HeatmapError::NoData`]; a blank tile is never
/// produced for it.
pub fn render_density(
    points: &[PixelPoint],
    kernel: &DotKernel,
    options: &RenderOptions,
    scheme: &ColorScheme,
) -> HeatmapResult<RgbaImage> {
    if points.is_empty() {
        return Err(HeatmapError::NoData("empty point set".to_string()));
    }
    options.validate()?;
    if kernel.radius() != options.dot_radius {
        return Err(HeatmapError::RenderError(format!(
            "kernel radius {} does not match dot radius {}",
            kernel.radius(),
            options.dot_radius
        )));
    }

    let mut field = DensityField::new(&options.margin());
    field.accumulate(points, kernel);

    Ok(field.colorize(scheme, options.intensity_cap))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_shape() {
        let k = DotKernel::new(16);
        assert_eq!(k.weight(0, 0), 255);
        assert_eq!(k.weight(8, 0), 128);
        assert_eq!(k.weight(16, 0), 0);
        assert_eq!(k.weight(12, 12), 0);
        assert_eq!(k.weight(40, 0), 0);
        assert_eq!(k.weight(3, -4), k.weight(-4, 3));
    }

    #[test]
    fn test_dot_centre_lands_at_offset() {
        let kernel = DotKernel::new(16);
        let mut field = DensityField::new(&TileMargin::for_dot_radius(16));
        field.add_dot(PixelPoint::new(0, 0), &kernel);

        assert_eq!(field.get(16, 16), 255);
        assert_eq!(field.max_value(), 255);
        assert_eq!(field.get(0, 0), 0);
    }

    #[test]
    fn test_far_outside_dot_is_ignored() {
        let kernel = DotKernel::new(16);
        let mut field = DensityField::new(&TileMargin::for_dot_radius(16));
        field.add_dot(PixelPoint::new(-100, 50), &kernel);
        field.add_dot(PixelPoint::new(50, 400), &kernel);
        assert!(field.is_empty());
    }

    #[test]
    fn test_saturating_accumulation() {
        let kernel = DotKernel::new(1);
        let mut field = DensityField::new(&TileMargin::for_dot_radius(1));
        field.cells[field.width + 1] = u32::MAX - 10;
        field.add_dot(PixelPoint::new(0, 0), &kernel);
        assert_eq!(field.get(1, 1), u32::MAX);
    }

    #[test]
    fn test_colorize_zero_is_transparent() {
        let field = DensityField::new(&TileMargin::for_dot_radius(4));
        let image = field.colorize(&ColorScheme::classic(), 128);
        assert!(image.pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn test_colorize_caps_intensity() {
        let kernel = DotKernel::new(16);
        let mut field = DensityField::new(&TileMargin::for_dot_radius(16));
        field.add_dot(PixelPoint::new(100, 100), &kernel);
        let scheme = ColorScheme::classic();
        let image = field.colorize(&scheme, 128);

        assert_eq!(image.get_pixel(116, 116).0, scheme.color_for(1.0));
    }

    #[test]
    fn test_render_density_empty_is_no_data() {
        let options = RenderOptions::default();
        let kernel = DotKernel::new(options.dot_radius);
        let result = render_density(&[], &kernel, &options, &ColorScheme::classic());
        assert!(matches!(result, Err(HeatmapError::NoData(_))));
    }

    #[test]
    fn test_render_density_image_size() {
        let options = RenderOptions::default();
        let kernel = DotKernel::new(options.dot_radius);
        let image = render_density(
            &[PixelPoint::new(128, 128)],
            &kernel,
            &options,
            &ColorScheme::pbj(),
        )
        .unwrap();
        assert_eq!(image.dimensions(), (288, 288));
        assert!(image.get_pixel(144, 144).0[3] > 0);
    }

    #[test]
    fn test_render_density_rejects_mismatched_kernel() {
        let options = RenderOptions::default();
        let result = render_density(
            &[PixelPoint::new(0, 0)],
            &DotKernel::new(4),
            &options,
            &ColorScheme::pbj(),
        );
        assert!(matches!(result, Err(HeatmapError::RenderError(_))));
    }

    #[test]
    fn test_validate_options() {
        assert!(RenderOptions::default().validate().is_ok());
        let zero_radius = RenderOptions {
            dot_radius: 0,
            ..Default::default()
        };
        assert!(zero_radius.validate().is_err());
        let zero_cap = RenderOptions {
            intensity_cap: 0,
            ..Default::default()
        };
        assert!(zero_cap.validate().is_err());
    }
}
