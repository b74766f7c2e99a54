//! Raster codecs for puzzle artifacts.
//!
//! - **Decode**: any enabled format (PNG, JPEG), detected from the bytes.
//! - **PNG**: lossless encoding for tiles and composites.
//! - **JPEG**: lossy encoding for the preview image. Alpha is dropped.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;

use crate::error::PuzzleError;

/// Default JPEG quality (1-100).
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// Minimum allowed JPEG quality.
pub const MIN_JPEG_QUALITY: u8 = 1;

/// Maximum allowed JPEG quality.
pub const MAX_JPEG_QUALITY: u8 = 100;

/// Decode raster bytes, sniffing the format from the content.
pub fn decode_image(source: &[u8]) -> Result<DynamicImage, PuzzleError> {
    let reader = ImageReader::new(Cursor::new(source))
        .with_guessed_format()
        .map_err(|e| PuzzleError::Decode {
            message: e.to_string(),
        })?;

    if reader.format().is_none() {
        return Err(PuzzleError::Decode {
            message: "unrecognized image format".to_string(),
        });
    }

    reader.decode().map_err(|e| PuzzleError::Decode {
        message: e.to_string(),
    })
}

/// Encode an RGBA image as PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Bytes, PuzzleError> {
    let mut output = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| PuzzleError::Encode {
            message: e.to_string(),
        })?;

    Ok(Bytes::from(output))
}

/// Encode an RGBA image as JPEG at the given quality (clamped to 1-100).
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<Bytes, PuzzleError> {
    let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();

    let mut output = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut output, clamp_quality(quality));
    encoder
        .encode_image(&rgb)
        .map_err(|e| PuzzleError::Encode {
            message: e.to_string(),
        })?;

    Ok(Bytes::from(output))
}

/// Returns `true` if quality is in the valid range (1-100).
#[inline]
pub fn is_valid_quality(quality: u8) -> bool {
    (MIN_JPEG_QUALITY..=MAX_JPEG_QUALITY).contains(&quality)
}

/// Clamp quality to the valid range.
#[inline]
pub fn clamp_quality(quality: u8) -> u8 {
    quality.clamp(MIN_JPEG_QUALITY, MAX_JPEG_QUALITY)
}
