// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image decoding and color normalization for fetched images

use image::{DynamicImage, ImageFormat, RgbImage};
use thiserror::Error;

/// Custom error types for image processing
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,
}

/// Image information extracted during loading
#[derive(Debug, Clone)]
pub struct ImageInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Format sniffed from magic bytes, `None` when the decoder had to guess
    pub format: Option<ImageFormat>,
    /// Size in bytes
    pub size_bytes: usize,
    /// Color type as decoded, before RGB normalization
    pub color_type: image::ColorType,
}

/// Decode raw image bytes
///
/// The format is taken from the magic bytes when recognized; anything else
/// is handed to the `image` crate to guess.
///
/// # Returns
/// * `Ok((DynamicImage, ImageInfo))` - The decoded image and metadata
/// * `Err(ImageError)` - If decoding fails
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), ImageError> {
    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    let format = detect_format(bytes);

    let img = match format {
        Some(format) => image::load_from_memory_with_format(bytes, format),
        None => image::load_from_memory(bytes),
    }
    .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    let info = ImageInfo {
        width: img.width(),
        height: img.height(),
        format,
        size_bytes: bytes.len(),
        color_type: img.color(),
    };

    Ok((img, info))
}

/// Detect image format from magic bytes
///
/// Recognizes PNG, JPEG, WebP, GIF, BMP and TIFF.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Some(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Some(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Some(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Some(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Some(ImageFormat::Tiff),

        _ => None,
    }
}

/// Normalize to 8-bit RGB
///
/// Returns the RGB buffer and whether a conversion was needed.
pub fn ensure_rgb(image: DynamicImage) -> (RgbImage, bool) {
    match image {
        DynamicImage::ImageRgb8(rgb) => (rgb, false),
        other => (other.to_rgb8(), true),
    }
}
