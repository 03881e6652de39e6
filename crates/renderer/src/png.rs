//! PNG encoding for RGBA tiles.
//!
//! Heatmap tiles only ever contain the colors of one scheme table plus full
//! transparency, so they nearly always fit an indexed PNG (color type 3).
//! Images with more than 256 distinct colors fall back to RGBA (color type 6).
//!
//! Palette order is first occurrence in scan order, so the same pixels always
//! produce the same bytes.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use heatmap_common::{HeatmapError, HeatmapResult};
use rayon::prelude::*;

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096;

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const COLOR_TYPE_INDEXED: u8 = 3;
const COLOR_TYPE_RGBA: u8 = 6;

/// Palette plus one index per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedPixels {
    pub palette: Vec<[u8; 4]>,
    pub indices: Vec<u8>,
}

impl IndexedPixels {
    pub fn has_transparency(&self) -> bool {
        self.palette.iter().any(|c| c[3] < 255)
    }
}

/// Encode RGBA pixels, choosing indexed or RGBA output automatically.
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> HeatmapResult<Vec<u8>> {
    check_dimensions(pixels, width, height)?;

    match index_pixels(pixels) {
        Some(indexed) => encode_png_indexed(&indexed, width, height),
        None => encode_png_rgba(pixels, width, height),
    }
}

/// Reduce RGBA pixels to a palette, or `None` if there are too many colors.
pub fn index_pixels(pixels: &[u8]) -> Option<IndexedPixels> {
    if pixels.len() / 4 >= PARALLEL_THRESHOLD {
        index_pixels_parallel(pixels)
    } else {
        index_pixels_sequential(pixels)
    }
}

#[inline(always)]
fn pack(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

fn index_pixels_sequential(pixels: &[u8]) -> Option<IndexedPixels> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = pack(px);
        let index = match lookup.get(&key) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push([px[0], px[1], px[2], px[3]]);
                lookup.insert(key, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some(IndexedPixels { palette, indices })
}

/// Each chunk lists its colors in first-occurrence order; merging the lists
/// in chunk order reproduces the sequential palette exactly.
fn index_pixels_parallel(pixels: &[u8]) -> Option<IndexedPixels> {
    let chunk_pixels = (pixels.len() / 4 / rayon::current_num_threads()).max(256);
    let chunk_bytes = chunk_pixels * 4;

    let per_chunk: Vec<Option<Vec<u32>>> = pixels
        .par_chunks(chunk_bytes)
        .map(|chunk| {
            let mut seen = HashSet::with_capacity(MAX_PALETTE_SIZE);
            let mut ordered = Vec::new();
            for px in chunk.chunks_exact(4) {
                let key = pack(px);
                if seen.insert(key) {
                    if ordered.len() >= MAX_PALETTE_SIZE {
                        return None;
                    }
                    ordered.push(key);
                }
            }
            Some(ordered)
        })
        .collect();

    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    for colors in per_chunk {
        for key in colors? {
            if lookup.contains_key(&key) {
                continue;
            }
            if palette.len() >= MAX_PALETTE_SIZE {
                return None;
            }
            lookup.insert(key, palette.len() as u8);
            palette.push(key.to_le_bytes());
        }
    }

    let mut indices = vec![0u8; pixels.len() / 4];
    indices
        .par_chunks_mut(chunk_pixels)
        .zip(pixels.par_chunks(chunk_bytes))
        .for_each(|(dst, src)| {
            for (idx, px) in dst.iter_mut().zip(src.chunks_exact(4)) {
                *idx = lookup.get(&pack(px)).copied().unwrap_or(0);
            }
        });

    Some(IndexedPixels { palette, indices })
}

/// Write an indexed PNG (color type 3), with a tRNS chunk when any palette
/// entry is not fully opaque.
pub fn encode_png_indexed(indexed: &IndexedPixels, width: u32, height: u32) -> HeatmapResult<Vec<u8>> {
    if indexed.indices.len() != width as usize * height as usize {
        return Err(HeatmapError::EncodeError(format!(
            "{} palette indices for a {}x{} image",
            indexed.indices.len(),
            width,
            height
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &header(width, height, COLOR_TYPE_INDEXED));

    let plte: Vec<u8> = indexed.palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if indexed.has_transparency() {
        let trns: Vec<u8> = indexed.palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(&indexed.indices, width as usize, height as usize)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Write a full-color RGBA PNG (color type 6).
pub fn encode_png_rgba(pixels: &[u8], width: u32, height: u32) -> HeatmapResult<Vec<u8>> {
    check_dimensions(pixels, width, height)?;

    let mut png = Vec::new();
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &header(width, height, COLOR_TYPE_RGBA));

    let idat = deflate_scanlines(pixels, width as usize * 4, height as usize)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn check_dimensions(pixels: &[u8], width: u32, height: u32) -> HeatmapResult<()> {
    if pixels.len() != width as usize * height as usize * 4 {
        return Err(HeatmapError::EncodeError(format!(
            "{} bytes of RGBA data for a {}x{} image",
            pixels.len(),
            width,
            height
        )));
    }
    Ok(())
}

fn header(width: u32, height: u32, color_type: u8) -> [u8; 13] {
    let mut ihdr = [0u8; 13];
    ihdr[0..4].copy_from_slice(&width.to_be_bytes());
    ihdr[4..8].copy_from_slice(&height.to_be_bytes());
    ihdr[8] = 8; // bit depth
    ihdr[9] = color_type;
    // compression, filter and interlace methods stay 0
    ihdr
}

/// Prefix each scanline with filter type 0 and zlib-compress.
fn deflate_scanlines(data: &[u8], row_bytes: usize, height: usize) -> HeatmapResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(height * (1 + row_bytes));
    for row in data.chunks_exact(row_bytes).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let compress_err = |e: std::io::Error| HeatmapError::EncodeError(format!("IDAT compression failed: {}", e));

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(&raw).map_err(compress_err)?;
    encoder.finish().map_err(compress_err)
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_pixels_simple() {
        let pixels = [
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, 0, 0, // transparent
            255, 0, 0, 255, // red again
        ];

        let indexed = index_pixels_sequential(&pixels).unwrap();
        assert_eq!(indexed.palette, vec![[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 0, 0]]);
        assert_eq!(indexed.indices, vec![0, 1, 2, 0]);
        assert!(indexed.has_transparency());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut pixels = Vec::with_capacity(128 * 128 * 4);
        for y in 0..128u32 {
            for x in 0..128u32 {
                let v = ((x / 8 + y / 8) % 40) as u8;
                pixels.extend_from_slice(&[v * 6, 255 - v, v, if v == 0 { 0 } else { 200 }]);
            }
        }

        let seq = index_pixels_sequential(&pixels).unwrap();
        let par = index_pixels_parallel(&pixels).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_too_many_colors() {
        let pixels: Vec<u8> = (0..300u32)
            .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 0, 255])
            .collect();
        assert!(index_pixels_sequential(&pixels).is_none());
    }

    #[test]
    fn test_chunk_crc() {
        let mut png = Vec::new();
        write_chunk(&mut png, b"IEND", &[]);
        assert_eq!(&png[..8], &[0, 0, 0, 0, b'I', b'E', b'N', b'D']);
        assert_eq!(&png[8..], &[0xAE, 0x42, 0x60, 0x82]);
    }

    #[test]
    fn test_rejects_short_buffer() {
        assert!(encode_png(&[0u8; 12], 2, 2).is_err());
    }
}
