// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image recognition endpoint handler

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use super::request::{ImageRequestItem, RecognitionRequest};
use super::response::{DetectedObject, ImageResult, RecognitionResponse};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::{
    decode_image_bytes, ensure_rgb, DetectorState, FetchError, ImageError, ImageFetcher,
    RawDetection,
};

/// Why a single image could not be recognized
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Inference worker failed: {0}")]
    Worker(String),
}

/// POST /image/recognition - Detect objects in a batch of images
///
/// Images are fetched and recognized one at a time, in request order.
/// A failure on one image yields `{id, confidence: 0.0, objects: []}` for
/// that entry and processing moves on.
///
/// # Errors
/// - 500 `{"detail": "Model not loaded"}` when no detector is available
/// - 500 `{"detail": "<error>"}` when the body is not a valid batch
pub async fn recognition_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RecognitionRequest>, JsonRejection>,
) -> Result<Json<RecognitionResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected recognition request: {}", rejection.body_text());
        ApiError::InternalError(rejection.body_text())
    })?;

    let detector = state.detector.as_ref().ok_or_else(|| {
        warn!("Recognition requested before model was loaded");
        ApiError::ModelNotLoaded
    })?;

    debug!("Recognition batch of {} images", request.len());

    let mut data = Vec::with_capacity(request.len());
    for item in &request.datas {
        info!("Received image {}: {}", item.id, item.url);

        let result = match recognize_item(&state.fetcher, detector, item).await {
            Ok(objects) => {
                info!("Image {}: detected {} objects", item.id, objects.len());
                ImageResult::detected(item.id, objects)
            }
            Err(e) => {
                warn!("Image {} failed: {}", item.id, e);
                ImageResult::degraded(item.id)
            }
        };
        data.push(result);
    }

    Ok(Json(RecognitionResponse::success(data)))
}

/// Fetch, decode and run detection for one image
///
/// Decoding and inference run on the blocking pool.
async fn recognize_item(
    fetcher: &ImageFetcher,
    detector: &DetectorState,
    item: &ImageRequestItem,
) -> Result<Vec<DetectedObject>, ItemError> {
    let bytes = fetcher.fetch(&item.url).await?;
    let detector = detector.detector();
    let id = item.id;

    let detections = tokio::task::spawn_blocking(move || -> Result<Vec<RawDetection>, ItemError> {
        let (image, info) = decode_image_bytes(&bytes)?;
        let (rgb, converted) = ensure_rgb(image);
        debug!(
            "Image {}: {}x{} {:?} ({:?}, {} bytes, converted to RGB: {})",
            id, info.width, info.height, info.format, info.color_type, info.size_bytes, converted
        );

        detector
            .detect(&rgb)
            .map_err(|e| ItemError::Inference(format!("{:#}", e)))
    })
    .await
    .map_err(|e| ItemError::Worker(e.to_string()))??;

    Ok(detections.iter().map(DetectedObject::from).collect())
}
