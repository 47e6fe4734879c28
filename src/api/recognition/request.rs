// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image recognition request types

use serde::{Deserialize, Serialize};

/// One image to recognize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRequestItem {
    /// Caller-chosen identifier, echoed back in the result
    pub id: i64,
    /// Absolute URL of the image
    pub url: String,
}

/// Batch of images to recognize
///
/// Results come back in the same order as `datas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionRequest {
    pub datas: Vec<ImageRequestItem>,
}

impl RecognitionRequest {
    pub fn len(&self) -> usize {
        self.datas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.datas.is_empty()
    }
}
