// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 output decoding
//!
//! Ultralytics exports emit a single tensor of shape `[1, 4 + nc, N]`: for each
//! of the N anchors, a `cx, cy, w, h` box in model-input pixels followed by one
//! score per class. There is no separate objectness score.

use anyhow::{bail, Result};
use ndarray::{ArrayView2, ArrayViewD, Axis, Ix3};
use std::cmp::Ordering;
use tracing::debug;

use super::preprocessing::Letterbox;
use super::RawDetection;

/// Thresholds applied when decoding raw model output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostprocessConfig {
    /// Minimum class score to keep a candidate
    pub confidence_threshold: f32,
    /// IoU above which a lower-scored box of the same class is suppressed
    pub iou_threshold: f32,
    /// Upper bound on detections returned per image
    pub max_detections: usize,
}

impl Default for PostprocessConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
        }
    }
}

/// Decode a YOLOv8 output tensor into detections in source-image pixels
pub fn decode_yolo_output(
    output: ArrayViewD<f32>,
    letterbox: &Letterbox,
    config: &PostprocessConfig,
) -> Result<Vec<RawDetection>> {
    let output = output.into_dimensionality::<Ix3>()?;
    let predictions: ArrayView2<f32> = output.index_axis_move(Axis(0), 0);

    let channels = predictions.shape()[0];
    let anchors = predictions.shape()[1];
    if channels < 5 {
        bail!(
            "Unexpected detection output: {} channels, need 4 box values and at least one class",
            channels
        );
    }

    let mut candidates = Vec::new();
    for anchor in 0..anchors {
        let mut best_class = 0;
        let mut best_score = f32::MIN;
        for class_idx in 0..channels - 4 {
            let score = predictions[[4 + class_idx, anchor]];
            if score > best_score {
                best_score = score;
                best_class = class_idx;
            }
        }

        if best_score < config.confidence_threshold {
            continue;
        }

        let cx = predictions[[0, anchor]];
        let cy = predictions[[1, anchor]];
        let w = predictions[[2, anchor]];
        let h = predictions[[3, anchor]];

        let bbox = letterbox.to_source([
            cx - w / 2.0,
            cy - h / 2.0,
            cx + w / 2.0,
            cy + h / 2.0,
        ]);

        candidates.push(RawDetection::new(bbox, best_class, best_score));
    }

    debug!(
        "Decoded {} candidates from {} anchors ({} classes)",
        candidates.len(),
        anchors,
        channels - 4
    );

    let mut detections = non_max_suppression(candidates, config.iou_threshold);
    detections.truncate(config.max_detections);

    Ok(detections)
}

/// Intersection over union of two corner boxes
pub fn iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let ix1 = a[0].max(b[0]);
    let iy1 = a[1].max(b[1]);
    let ix2 = a[2].min(b[2]);
    let iy2 = a[3].min(b[3]);

    let inter = (ix2 - ix1).max(0.0) * (iy2 - iy1).max(0.0);
    let area_a = (a[2] - a[0]).max(0.0) * (a[3] - a[1]).max(0.0);
    let area_b = (b[2] - b[0]).max(0.0) * (b[3] - b[1]).max(0.0);
    let union = area_a + area_b - inter;

    if union <= 0.0 {
        0.0
    } else {
        inter / union
    }
}

/// Greedy class-aware non-maximum suppression
///
/// Returns the surviving detections ordered by descending confidence.
/// Boxes of different classes never suppress each other.
pub fn non_max_suppression(mut detections: Vec<RawDetection>, iou_threshold: f32) -> Vec<RawDetection> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
    });

    let mut kept: Vec<RawDetection> = Vec::with_capacity(detections.len());
    for det in detections {
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == det.class_id && iou(&k.bbox, &det.bbox) > iou_threshold);
        if !suppressed {
            kept.push(det);
        }
    }

    kept
}
