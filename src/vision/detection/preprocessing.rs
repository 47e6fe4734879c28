// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for YOLO detection

use image::imageops::FilterType;
use image::RgbImage;
use ndarray::Array4;

/// Default square input size of Ultralytics YOLOv8 exports
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Gray value used for letterbox padding
pub const LETTERBOX_FILL: u8 = 114;

/// Geometry of a letterbox resize, used to map boxes back to the source image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    /// Scale applied to the source image
    pub gain: f32,
    /// Horizontal padding (left) in model-input pixels
    pub pad_x: f32,
    /// Vertical padding (top) in model-input pixels
    pub pad_y: f32,
    /// Resized width before padding
    pub resized_width: u32,
    /// Resized height before padding
    pub resized_height: u32,
    pub source_width: u32,
    pub source_height: u32,
}

impl Letterbox {
    /// Compute the letterbox that fits `source` into `target` keeping aspect ratio
    pub fn new(source_width: u32, source_height: u32, target_width: u32, target_height: u32) -> Self {
        let gain = (target_width as f32 / source_width.max(1) as f32)
            .min(target_height as f32 / source_height.max(1) as f32);

        let resized_width = ((source_width as f32 * gain).round() as u32).clamp(1, target_width);
        let resized_height = ((source_height as f32 * gain).round() as u32).clamp(1, target_height);

        Self {
            gain,
            pad_x: ((target_width - resized_width) / 2) as f32,
            pad_y: ((target_height - resized_height) / 2) as f32,
            resized_width,
            resized_height,
            source_width,
            source_height,
        }
    }

    /// Map a corner box from model-input space back to source-image pixels
    ///
    /// The result is clamped to the source image bounds.
    pub fn to_source(&self, bbox: [f32; 4]) -> [f32; 4] {
        let max_x = self.source_width as f32;
        let max_y = self.source_height as f32;

        [
            ((bbox[0] - self.pad_x) / self.gain).clamp(0.0, max_x),
            ((bbox[1] - self.pad_y) / self.gain).clamp(0.0, max_y),
            ((bbox[2] - self.pad_x) / self.gain).clamp(0.0, max_x),
            ((bbox[3] - self.pad_y) / self.gain).clamp(0.0, max_y),
        ]
    }
}

/// Preprocess an RGB image for YOLO detection
///
/// Steps:
/// 1. Resize preserving aspect ratio to fit `target_width` x `target_height`
/// 2. Pad with gray (114), centering the resized image
/// 3. Scale pixels to [0, 1]
/// 4. Lay out as NCHW tensor [1, 3, H, W]
pub fn preprocess_for_detection(
    image: &RgbImage,
    target_width: u32,
    target_height: u32,
) -> (Array4<f32>, Letterbox) {
    let letterbox = Letterbox::new(image.width(), image.height(), target_width, target_height);

    let resized = image::imageops::resize(
        image,
        letterbox.resized_width,
        letterbox.resized_height,
        FilterType::Triangle,
    );

    let fill = LETTERBOX_FILL as f32 / 255.0;
    let mut tensor = Array4::from_elem(
        (1, 3, target_height as usize, target_width as usize),
        fill,
    );

    let offset_x = letterbox.pad_x as usize;
    let offset_y = letterbox.pad_y as usize;

    for (x, y, pixel) in resized.enumerate_pixels() {
        let tx = x as usize + offset_x;
        let ty = y as usize + offset_y;
        for c in 0..3 {
            tensor[[0, c, ty, tx]] = pixel[c] as f32 / 255.0;
        }
    }

    (tensor, letterbox)
}
