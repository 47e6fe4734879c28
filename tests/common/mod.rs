// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared fixtures: a local image server, canned detectors and request helpers

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage};
use image_recognition_node::{
    api::{create_app, AppState},
    vision::{Detector, DetectorState, RawDetection},
};
use serde_json::Value;
use tower::util::ServiceExt;

pub fn encode_png(image: &DynamicImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    buffer.into_inner()
}

pub fn rgb_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(&DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        Rgb([200, 40, 40]),
    )))
}

pub fn gray_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(&DynamicImage::ImageLuma8(GrayImage::from_pixel(
        width,
        height,
        Luma([128]),
    )))
}

fn png(bytes: Vec<u8>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], bytes)
}

/// Local HTTP server with a fixed set of image URLs
///
/// - `/rgb.png` 64x48 RGB
/// - `/wide.png` 200x100 RGB
/// - `/gray.png` 32x32 grayscale
/// - `/missing.png` 404
/// - `/error.png` 500
/// - `/not-an-image.png` HTML body
/// - `/empty.png` empty body
/// - `/slow.png` answers after 5 seconds
pub struct ImageServer {
    base_url: String,
}

impl ImageServer {
    pub async fn start() -> Self {
        let app = Router::new()
            .route("/rgb.png", get(|| async { png(rgb_png(64, 48)) }))
            .route("/wide.png", get(|| async { png(rgb_png(200, 100)) }))
            .route("/gray.png", get(|| async { png(gray_png(32, 32)) }))
            .route("/missing.png", get(|| async { StatusCode::NOT_FOUND }))
            .route(
                "/error.png",
                get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
            )
            .route(
                "/not-an-image.png",
                get(|| async { "<html><body>moved</body></html>" }),
            )
            .route("/empty.png", get(|| async { png(Vec::new()) }))
            .route(
                "/slow.png",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    png(rgb_png(8, 8))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Returns the same detections for every image
pub struct FixedDetector(pub Vec<RawDetection>);

impl Detector for FixedDetector {
    fn detect(&self, _image: &RgbImage) -> anyhow::Result<Vec<RawDetection>> {
        Ok(self.0.clone())
    }
}

/// Returns one full-frame detection whose class index is the image width
pub struct SizeDetector;

impl Detector for SizeDetector {
    fn detect(&self, image: &RgbImage) -> anyhow::Result<Vec<RawDetection>> {
        let (w, h) = image.dimensions();
        Ok(vec![RawDetection::new(
            [0.0, 0.0, w as f32, h as f32],
            w as usize,
            0.9,
        )])
    }
}

pub struct FailingDetector;

impl Detector for FailingDetector {
    fn detect(&self, _image: &RgbImage) -> anyhow::Result<Vec<RawDetection>> {
        anyhow::bail!("session run failed")
    }
}

pub struct PanickingDetector;

impl Detector for PanickingDetector {
    fn detect(&self, _image: &RgbImage) -> anyhow::Result<Vec<RawDetection>> {
        panic!("detector blew up")
    }
}

pub fn state_with<D: Detector + 'static>(detector: D) -> Arc<AppState> {
    Arc::new(
        AppState::new_for_test()
            .with_detector(DetectorState::from_detector(Arc::new(detector), "test")),
    )
}

pub fn batch(items: &[(i64, String)]) -> Value {
    let datas: Vec<Value> = items
        .iter()
        .map(|(id, url)| serde_json::json!({"id": id, "url": url}))
        .collect();
    serde_json::json!({ "datas": datas })
}

async fn send(state: Arc<AppState>, request: Request<Body>) -> (StatusCode, Value) {
    let response = create_app(state).oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

pub async fn post_raw(state: Arc<AppState>, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(state, request).await
}

pub async fn post_json(state: Arc<AppState>, uri: &str, body: &Value) -> (StatusCode, Value) {
    post_raw(state, uri, &body.to_string()).await
}

pub async fn get_json(state: Arc<AppState>, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(state, request).await
}

pub fn assert_degraded(result: &Value, id: i64) {
    assert_eq!(
        result,
        &serde_json::json!({"id": id, "confidence": 0.0, "objects": []}),
        "expected degraded result for id {}",
        id
    );
}
