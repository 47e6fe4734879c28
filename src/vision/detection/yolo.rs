// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 object detector backed by ONNX Runtime
//!
//! Loads an Ultralytics YOLOv8 ONNX export and runs it on CPU.

use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::postprocess::{decode_yolo_output, PostprocessConfig};
use super::preprocessing::preprocess_for_detection;
use super::{Detector, RawDetection};

/// YOLOv8 detection model
#[derive(Clone)]
pub struct YoloDetector {
    /// ONNX Runtime session (`run` needs exclusive access)
    session: Arc<Mutex<Session>>,
    input_name: String,
    /// Square model input size in pixels
    input_size: u32,
    postprocess: PostprocessConfig,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("input_name", &self.input_name)
            .field("input_size", &self.input_size)
            .field("postprocess", &self.postprocess)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load a YOLOv8 ONNX model from a file
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    /// - The file is not a loadable ONNX graph
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        input_size: u32,
        intra_threads: usize,
        postprocess: PostprocessConfig,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .with_context(|| {
                format!("Failed to load detection model from {}", model_path.display())
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        if let Some(input) = session.inputs.first() {
            debug!("Detection model input {}: {:?}", input_name, input.input_type);
        }
        if let Some(output) = session.outputs.first() {
            debug!("Detection model output {}: {:?}", output.name, output.output_type);
        }

        info!(
            "Detection model loaded (input {}x{}, conf {}, iou {})",
            input_size, input_size, postprocess.confidence_threshold, postprocess.iou_threshold
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            input_size,
            postprocess,
        })
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    pub fn postprocess_config(&self) -> &PostprocessConfig {
        &self.postprocess
    }
}

impl Detector for YoloDetector {
    fn detect(&self, image: &RgbImage) -> Result<Vec<RawDetection>> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(Vec::new());
        }

        let (input, letterbox) = preprocess_for_detection(image, self.input_size, self.input_size);
        debug!(
            "Detection input {:?} (source {}x{}, gain {:.4})",
            input.shape(),
            image.width(),
            image.height(),
            letterbox.gain
        );

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Detection session lock poisoned"))?;

        let input_value = Value::from_array(input).context("Failed to create input tensor")?;

        let outputs = session
            .run(ort::inputs![&self.input_name => input_value])
            .context("Detection inference failed")?;

        let output_tensor = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;
        debug!("Detection output shape: {:?}", output_tensor.shape());

        decode_yolo_output(output_tensor.view(), &letterbox, &self.postprocess)
    }
}
