// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;

use crate::config::ServiceConfig;
use crate::vision::detection::PostprocessConfig;
use crate::vision::{DetectorConfig, FetchConfig};

/// Image Recognition Node
///
/// Every option can also be set through its environment variable.
#[derive(Parser, Debug, Clone)]
#[command(name = "image-recognition-node")]
#[command(version)]
#[command(about = "Object detection over batches of image URLs", long_about = None)]
pub struct Args {
    /// Address to bind
    #[arg(long, env = "RECOGNITION_HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Port to bind
    #[arg(long, env = "RECOGNITION_PORT", default_value_t = crate::config::DEFAULT_PORT)]
    pub port: u16,

    /// Path to the YOLOv8 ONNX model
    #[arg(long, env = "RECOGNITION_MODEL_PATH", default_value = "./models/yolov8n.onnx")]
    pub model_path: PathBuf,

    /// Timeout for each image download, in seconds
    #[arg(long, env = "RECOGNITION_FETCH_TIMEOUT_SECS", default_value_t = 30)]
    pub fetch_timeout_secs: u64,

    /// Minimum class score for a detection
    #[arg(long, env = "RECOGNITION_CONFIDENCE_THRESHOLD", default_value_t = 0.25)]
    pub confidence_threshold: f32,

    /// IoU threshold for non-maximum suppression
    #[arg(long, env = "RECOGNITION_IOU_THRESHOLD", default_value_t = 0.7)]
    pub iou_threshold: f32,

    /// Maximum detections returned per image
    #[arg(long, env = "RECOGNITION_MAX_DETECTIONS", default_value_t = 300)]
    pub max_detections: usize,

    /// Square model input size in pixels
    #[arg(long, env = "RECOGNITION_INPUT_SIZE", default_value_t = 640)]
    pub input_size: u32,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "RECOGNITION_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,
}

impl Args {
    /// Validate the options and resolve them into a `ServiceConfig`
    pub fn into_config(self) -> Result<ServiceConfig> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            bail!(
                "confidence threshold must be between 0 and 1, got {}",
                self.confidence_threshold
            );
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            bail!("IoU threshold must be between 0 and 1, got {}", self.iou_threshold);
        }
        if self.input_size == 0 || self.input_size % 32 != 0 {
            bail!("input size must be a positive multiple of 32, got {}", self.input_size);
        }
        if self.fetch_timeout_secs == 0 {
            bail!("fetch timeout must be at least one second");
        }
        if self.intra_threads == 0 {
            bail!("intra threads must be at least 1");
        }

        Ok(ServiceConfig {
            listen_addr: SocketAddr::new(self.host, self.port),
            detector: DetectorConfig {
                model_path: self.model_path,
                input_size: self.input_size,
                intra_threads: self.intra_threads,
                postprocess: PostprocessConfig {
                    confidence_threshold: self.confidence_threshold,
                    iou_threshold: self.iou_threshold,
                    max_detections: self.max_detections,
                },
            },
            fetch: FetchConfig {
                timeout: Duration::from_secs(self.fetch_timeout_secs),
                ..FetchConfig::default()
            },
        })
    }
}
