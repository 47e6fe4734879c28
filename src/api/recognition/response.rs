// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image recognition response types

use serde::{Deserialize, Serialize};

use crate::vision::{class_name, RawDetection};

/// Axis-aligned box in source-image pixels, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    /// Build from corner coordinates `[x1, y1, x2, y2]`
    pub fn from_corners(corners: [f32; 4]) -> Self {
        let [x1, y1, x2, y2] = corners;
        Self {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }
}

/// A detected object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedObject {
    /// Class index as a decimal string
    pub class_id: String,
    pub class_name: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    pub bounding_box: BoundingBox,
}

impl From<&RawDetection> for DetectedObject {
    fn from(det: &RawDetection) -> Self {
        Self {
            class_id: det.class_id.to_string(),
            class_name: class_name(det.class_id),
            confidence: det.confidence,
            bounding_box: BoundingBox::from_corners(det.bbox),
        }
    }
}

/// Recognition result for one requested image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageResult {
    pub id: i64,
    /// Mean object confidence, 0.0 when nothing was detected
    pub confidence: Option<f32>,
    pub objects: Vec<DetectedObject>,
}

impl ImageResult {
    pub fn detected(id: i64, objects: Vec<DetectedObject>) -> Self {
        Self {
            id,
            confidence: Some(mean_confidence(&objects)),
            objects,
        }
    }

    /// Placeholder for an image that could not be processed
    pub fn degraded(id: i64) -> Self {
        Self {
            id,
            confidence: Some(0.0),
            objects: Vec::new(),
        }
    }
}

/// Arithmetic mean of object confidences, 0.0 for an empty slice
pub fn mean_confidence(objects: &[DetectedObject]) -> f32 {
    if objects.is_empty() {
        return 0.0;
    }

    let sum: f64 = objects.iter().map(|o| o.confidence as f64).sum();
    (sum / objects.len() as f64) as f32
}

/// Envelope returned by `POST /image/recognition`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResponse {
    pub code: u16,
    pub message: String,
    pub data: Vec<ImageResult>,
}

impl RecognitionResponse {
    pub fn success(data: Vec<ImageResult>) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            data,
        }
    }
}
