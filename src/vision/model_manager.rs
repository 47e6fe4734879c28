// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detector loading and the shared detector handle

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::vision::detection::{Detector, PostprocessConfig, YoloDetector, YOLO_INPUT_SIZE};

/// Configuration for loading the detection model
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Path to the YOLOv8 ONNX export
    pub model_path: PathBuf,
    /// Square model input size in pixels
    pub input_size: u32,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
    pub postprocess: PostprocessConfig,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/yolov8n.onnx"),
            input_size: YOLO_INPUT_SIZE,
            intra_threads: 4,
            postprocess: PostprocessConfig::default(),
        }
    }
}

/// Information about the loaded detector
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorInfo {
    /// Model name
    pub name: String,
    /// Where the model was loaded from, if it came from a file
    pub source: Option<PathBuf>,
}

/// The loaded detector, shared read-only by every request
#[derive(Clone)]
pub struct DetectorState {
    detector: Arc<dyn Detector>,
    info: DetectorInfo,
}

impl fmt::Debug for DetectorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DetectorState")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

impl DetectorState {
    /// Load the detection model once at startup
    ///
    /// Errors are fatal to the caller; there is no retry or fallback model.
    pub fn load(config: &DetectorConfig) -> Result<Self> {
        let detector = YoloDetector::new(
            &config.model_path,
            config.input_size,
            config.intra_threads,
            config.postprocess,
        )?;

        let name = config
            .model_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "yolo".to_string());

        info!("✅ Detector {} ready", name);

        Ok(Self {
            detector: Arc::new(detector),
            info: DetectorInfo {
                name,
                source: Some(config.model_path.clone()),
            },
        })
    }

    /// Wrap an already constructed detector
    pub fn from_detector(detector: Arc<dyn Detector>, name: impl Into<String>) -> Self {
        Self {
            detector,
            info: DetectorInfo {
                name: name.into(),
                source: None,
            },
        }
    }

    pub fn detector(&self) -> Arc<dyn Detector> {
        Arc::clone(&self.detector)
    }

    pub fn info(&self) -> &DetectorInfo {
        &self.info
    }
}
