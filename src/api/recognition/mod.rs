// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image recognition API endpoint module
//!
//! Provides POST /image/recognition for detecting objects in batches of image URLs.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{recognition_handler, ItemError};
pub use request::{ImageRequestItem, RecognitionRequest};
pub use response::{
    mean_confidence, BoundingBox, DetectedObject, ImageResult, RecognitionResponse,
};
