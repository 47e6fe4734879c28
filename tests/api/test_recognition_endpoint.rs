// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Recognition endpoint tests for POST /image/recognition
//!
//! Images are served by a local axum server; detectors are canned so no
//! ONNX model is needed.

use axum::http::StatusCode;
use image_recognition_node::{api::AppState, vision::RawDetection};
use serde_json::json;
use std::sync::Arc;

use crate::common::{
    assert_degraded, batch, post_json, post_raw, state_with, FailingDetector, FixedDetector,
    ImageServer, PanickingDetector,
};

const ENDPOINT: &str = "/image/recognition";

fn two_objects() -> FixedDetector {
    FixedDetector(vec![
        RawDetection::new([10.0, 20.0, 110.0, 220.0], 954, 0.8),
        RawDetection::new([0.0, 0.0, 5.0, 5.0], 9999, 0.6),
    ])
}

fn confidence(result: &serde_json::Value) -> f64 {
    result["confidence"].as_f64().unwrap()
}

// =============================================================================
// Whole-request failures
// =============================================================================

#[tokio::test]
async fn test_model_not_loaded() {
    let state = Arc::new(AppState::new_for_test());
    let body = batch(&[(1, "http://127.0.0.1:1/a.png".to_string())]);

    let (status, response) = post_json(state, ENDPOINT, &body).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response, json!({"detail": "Model not loaded"}));
}

#[tokio::test]
async fn test_malformed_json_is_500() {
    let state = state_with(two_objects());
    let (status, response) = post_raw(state, ENDPOINT, "{not json").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!response["detail"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_datas_is_500() {
    let state = state_with(two_objects());
    let (status, response) = post_raw(state, ENDPOINT, r#"{"items": []}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response["detail"].as_str().unwrap().contains("datas"));
}

// =============================================================================
// Successful batches
// =============================================================================

#[tokio::test]
async fn test_empty_batch() {
    let state = state_with(two_objects());
    let (status, response) = post_json(state, ENDPOINT, &json!({"datas": []})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response, json!({"code": 200, "message": "success", "data": []}));
}

#[tokio::test]
async fn test_detections_are_reshaped() {
    let server = ImageServer::start().await;
    let state = state_with(two_objects());
    let body = batch(&[(42, server.url("/rgb.png"))]);

    let (status, response) = post_json(state, ENDPOINT, &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["code"], 200);
    assert_eq!(response["message"], "success");

    let result = &response["data"][0];
    assert_eq!(result["id"], 42);
    assert!((confidence(result) - 0.7).abs() < 1e-6);

    let objects = result["objects"].as_array().unwrap();
    assert_eq!(objects.len(), 2);

    assert_eq!(objects[0]["classId"], "954");
    assert_eq!(objects[0]["className"], "banana");
    assert_eq!(
        objects[0]["boundingBox"],
        json!({"x": 10.0, "y": 20.0, "width": 100.0, "height": 200.0})
    );

    assert_eq!(objects[1]["classId"], "9999");
    assert_eq!(objects[1]["className"], "class_9999");
}

#[tokio::test]
async fn test_zero_detections() {
    let server = ImageServer::start().await;
    let state = state_with(FixedDetector(vec![]));
    let body = batch(&[(1, server.url("/rgb.png"))]);

    let (status, response) = post_json(state, ENDPOINT, &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response["data"],
        json!([{"id": 1, "confidence": 0.0, "objects": []}])
    );
}

#[tokio::test]
async fn test_grayscale_image_is_processed() {
    let server = ImageServer::start().await;
    let state = state_with(two_objects());
    let body = batch(&[(3, server.url("/gray.png"))]);

    let (_, response) = post_json(state, ENDPOINT, &body).await;

    assert_eq!(response["data"][0]["objects"].as_array().unwrap().len(), 2);
}

// =============================================================================
// Per-item degradation
// =============================================================================

#[tokio::test]
async fn test_404_item_degrades_without_failing_batch() {
    let server = ImageServer::start().await;
    let state = state_with(two_objects());
    let body = batch(&[
        (1, server.url("/rgb.png")),
        (2, server.url("/missing.png")),
        (3, server.url("/gray.png")),
    ]);

    let (status, response) = post_json(state, ENDPOINT, &body).await;

    assert_eq!(status, StatusCode::OK);
    let data = response["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);

    assert_eq!(data[0]["objects"].as_array().unwrap().len(), 2);
    assert_degraded(&data[1], 2);
    assert_eq!(data[2]["objects"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_bad_sources_degrade() {
    let server = ImageServer::start().await;
    let state = state_with(two_objects());
    let body = batch(&[
        (1, server.url("/error.png")),
        (2, server.url("/not-an-image.png")),
        (3, server.url("/empty.png")),
        (4, "http://127.0.0.1:1/unreachable.png".to_string()),
        (5, "not a url".to_string()),
    ]);

    let (status, response) = post_json(state, ENDPOINT, &body).await;

    assert_eq!(status, StatusCode::OK);
    let data = response["data"].as_array().unwrap();
    assert_eq!(data.len(), 5);
    for (i, result) in data.iter().enumerate() {
        assert_degraded(result, i as i64 + 1);
    }
}

#[tokio::test]
async fn test_detector_error_degrades() {
    let server = ImageServer::start().await;
    let state = state_with(FailingDetector);
    let body = batch(&[(1, server.url("/rgb.png")), (2, server.url("/gray.png"))]);

    let (status, response) = post_json(state, ENDPOINT, &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["code"], 200);
    assert_degraded(&response["data"][0], 1);
    assert_degraded(&response["data"][1], 2);
}

#[tokio::test]
async fn test_detector_panic_degrades() {
    let server = ImageServer::start().await;
    let state = state_with(PanickingDetector);
    let body = batch(&[(9, server.url("/rgb.png"))]);

    let (status, response) = post_json(state, ENDPOINT, &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_degraded(&response["data"][0], 9);
}
