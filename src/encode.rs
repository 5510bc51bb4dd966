//! Greyscale tooltip image encoding.
//!
//! Per-point image attributes arrive as raw sample rows: either a flat
//! row holding a square image, or an already-shaped 2-D row. This module
//! unpacks the row, normalizes samples onto an 8-bit greyscale range,
//! replicates the channel into RGB, and returns a JPEG data URI that an
//! image-display front end can embed directly.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use ndarray::ArrayViewD;

use crate::error::{ReshapeError, ResolveError};

/// URI scheme prefix expected by the renderer's image display primitive.
pub const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// JPEG quality for tooltip thumbnails.
const JPEG_QUALITY: u8 = 90;

/// Side length of the square image a flat row of `len` samples unpacks to.
///
/// Strict: a length with no integer square root is an error rather than a
/// floor-truncated image, so trailing samples cannot vanish silently.
pub fn square_side(len: usize) -> Result<usize, ReshapeError> {
    let side = len.isqrt();
    if side * side == len {
        Ok(side)
    } else {
        Err(ReshapeError { len })
    }
}

/// Encode one per-point sample row as a JPEG data URI.
///
/// A 1-D row is reshaped into a square; a 2-D row is used as-is. Samples
/// are min-max normalized onto 0-255, so the darkest sample maps to black
/// and the brightest to white; a constant row maps to black, and
/// non-finite samples map to black.
///
/// # Panics
///
/// Panics on rows of rank 3 or higher; the registry only admits image
/// attributes whose rows are 1-D or 2-D.
pub fn greyscale_data_uri(samples: ArrayViewD<'_, f64>) -> Result<String, ResolveError> {
    let (height, width) = match samples.shape() {
        &[len] => {
            let side = square_side(len)?;
            (side, side)
        }
        &[h, w] => (h, w),
        shape => panic!("image row must be 1-D or 2-D, got shape {shape:?}"),
    };

    // Row-major in both layouts: a flat row already is one, and a 2-D
    // row iterates rows first.
    let values: Vec<f64> = samples.iter().copied().collect();
    let bytes = normalized_bytes(&values);

    let mut rgb = RgbImage::new(width as u32, height as u32);
    for (i, &g) in bytes.iter().enumerate() {
        let x = (i % width) as u32;
        let y = (i / width) as u32;
        rgb.put_pixel(x, y, Rgb([g, g, g]));
    }

    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
    rgb.write_with_encoder(encoder)?;

    Ok(format!("{}{}", DATA_URI_PREFIX, STANDARD.encode(&jpeg)))
}

/// Min-max normalize samples onto 0-255.
fn normalized_bytes(values: &[f64]) -> Vec<u8> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in values {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    let range = max - min;

    values
        .iter()
        .map(|&v| {
            if !v.is_finite() || !range.is_finite() || range <= 0.0 {
                0
            } else {
                (((v - min) / range) * 255.0).round() as u8
            }
        })
        .collect()
}
