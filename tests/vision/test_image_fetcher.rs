// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ImageFetcher tests against a local image server

use std::time::{Duration, Instant};

use image_recognition_node::vision::{decode_image_bytes, FetchConfig, FetchError, ImageFetcher};

use crate::common::ImageServer;

#[tokio::test]
async fn test_fetch_png() {
    let server = ImageServer::start().await;
    let fetcher = ImageFetcher::default();

    let bytes = fetcher.fetch(&server.url("/rgb.png")).await.unwrap();
    let (_, info) = decode_image_bytes(&bytes).unwrap();

    assert_eq!((info.width, info.height), (64, 48));
}

#[tokio::test]
async fn test_fetch_404_is_status_error() {
    let server = ImageServer::start().await;
    let fetcher = ImageFetcher::default();

    match fetcher.fetch(&server.url("/missing.png")).await {
        Err(FetchError::Status { status, url }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/missing.png"));
        }
        other => panic!("expected status error, got {:?}", other.map(|b| b.len())),
    }
}

#[tokio::test]
async fn test_fetch_500_is_status_error() {
    let server = ImageServer::start().await;
    let fetcher = ImageFetcher::default();

    let result = fetcher.fetch(&server.url("/error.png")).await;
    assert!(matches!(result, Err(FetchError::Status { status: 500, .. })));
}

#[tokio::test]
async fn test_fetch_non_image_body_succeeds() {
    // Content is not checked at fetch time; decoding rejects it later
    let server = ImageServer::start().await;
    let fetcher = ImageFetcher::default();

    let bytes = fetcher.fetch(&server.url("/not-an-image.png")).await.unwrap();
    assert!(decode_image_bytes(&bytes).is_err());
}

#[tokio::test]
async fn test_fetch_times_out() {
    let server = ImageServer::start().await;
    let fetcher = ImageFetcher::new(FetchConfig {
        timeout: Duration::from_millis(300),
        ..FetchConfig::default()
    });

    let started = Instant::now();
    let result = fetcher.fetch(&server.url("/slow.png")).await;

    match result {
        Err(FetchError::Transport { source, .. }) => assert!(source.is_timeout()),
        other => panic!("expected timeout, got {:?}", other.map(|b| b.len())),
    }
    assert!(started.elapsed() < Duration::from_secs(4));
}
