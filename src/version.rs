// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Image Recognition Node

/// Semantic version number
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2026-10-18";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "batch-recognition",
    "yolov8-onnx",
    "imagenet-class-names",
    "per-item-degradation",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Image Recognition Node {} ({})", VERSION, BUILD_DATE)
}
