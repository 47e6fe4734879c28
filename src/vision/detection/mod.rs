// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection for the recognition endpoint
//!
//! Components:
//! - `classes` - Static ImageNet class-name table
//! - `preprocessing` - Letterbox resize into the model input tensor
//! - `postprocess` - YOLO output decoding and non-maximum suppression
//! - `yolo` - ONNX Runtime backed YOLOv8 detector

pub mod classes;
pub mod postprocess;
pub mod preprocessing;
pub mod yolo;

use anyhow::Result;
use image::RgbImage;

pub use classes::{class_name, IMAGENET_CLASSES};
pub use postprocess::{decode_yolo_output, iou, non_max_suppression, PostprocessConfig};
pub use preprocessing::{preprocess_for_detection, Letterbox, LETTERBOX_FILL, YOLO_INPUT_SIZE};
pub use yolo::YoloDetector;

/// A single detection in source-image pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct RawDetection {
    /// Corner box `[x1, y1, x2, y2]`
    pub bbox: [f32; 4],
    /// Class index produced by the model
    pub class_id: usize,
    /// Detection confidence (0.0-1.0)
    pub confidence: f32,
}

impl RawDetection {
    pub fn new(bbox: [f32; 4], class_id: usize, confidence: f32) -> Self {
        Self {
            bbox,
            class_id,
            confidence,
        }
    }

    pub fn width(&self) -> f32 {
        self.bbox[2] - self.bbox[0]
    }

    pub fn height(&self) -> f32 {
        self.bbox[3] - self.bbox[1]
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }
}

/// Opaque object detector
///
/// Implementations take an RGB image and return every detection in
/// source-image pixels. A detector is loaded once and shared read-only
/// across concurrently handled requests.
pub trait Detector: Send + Sync {
    fn detect(&self, image: &RgbImage) -> Result<Vec<RawDetection>>;
}
