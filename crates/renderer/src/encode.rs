//! Output image formats.

use std::fmt;
use std::str::FromStr;

use heatmap_common::{HeatmapError, HeatmapResult};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, RgbImage, RgbaImage};

use crate::png;

/// JPEG quality used for all JPEG tiles.
pub const JPEG_QUALITY: u8 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Map a tile URL extension (`png` or `jpeg`) to a format.
    pub fn from_extension(ext: &str) -> HeatmapResult<Self> {
        match ext {
            "png" => Ok(ImageFormat::Png),
            "jpeg" => Ok(ImageFormat::Jpeg),
            other => Err(HeatmapError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Format name as accepted by [`encode`].
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

impl FromStr for ImageFormat {
    type Err = HeatmapError;

    /// Only the exact names `png` and `jpg` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "png" => Ok(ImageFormat::Png),
            "jpg" => Ok(ImageFormat::Jpeg),
            other => Err(HeatmapError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encode `image` in the named format (`"png"` or `"jpg"`).
pub fn encode(image: &RgbaImage, format: &str) -> HeatmapResult<Vec<u8>> {
    encode_as(image, format.parse()?)
}

pub fn encode_as(image: &RgbaImage, format: ImageFormat) -> HeatmapResult<Vec<u8>> {
    match format {
        ImageFormat::Png => png::encode_png(image.as_raw(), image.width(), image.height()),
        ImageFormat::Jpeg => encode_jpeg(image),
    }
}

/// JPEG has no alpha channel: pixels are composited over black first, so
/// fully transparent areas come out black.
fn encode_jpeg(image: &RgbaImage) -> HeatmapResult<Vec<u8>> {
    let flattened = flatten_onto_black(image);

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY)
        .encode(
            flattened.as_raw(),
            flattened.width(),
            flattened.height(),
            ColorType::Rgb8,
        )
        .map_err(|e| HeatmapError::EncodeError(format!("JPEG encoding failed: {}", e)))?;

    Ok(buf)
}

pub fn flatten_onto_black(image: &RgbaImage) -> RgbImage {
    let mut out = RgbImage::new(image.width(), image.height());
    for (dst, src) in out.pixels_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        let scale = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
        dst.0 = [scale(r), scale(g), scale(b)];
    }
    out
}
