// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for the recognition service
//!
//! This module provides:
//! - Image download over HTTP
//! - Image decoding and RGB normalization
//! - Object detection via a YOLOv8 ONNX model
//!
//! Inference runs on CPU.

pub mod detection;
pub mod fetcher;
pub mod image_utils;
pub mod model_manager;

pub use detection::{class_name, Detector, RawDetection, YoloDetector};
pub use fetcher::{FetchConfig, FetchError, ImageFetcher};
pub use image_utils::{decode_image_bytes, detect_format, ensure_rgb, ImageError, ImageInfo};
pub use model_manager::{DetectorConfig, DetectorInfo, DetectorState};
