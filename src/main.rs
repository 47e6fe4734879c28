// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use image_recognition_node::{
    api::{start_server, AppState},
    cli::Args,
    version,
    vision::{DetectorState, ImageFetcher},
};
use std::env;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = args.into_config()?;

    info!("🚀 Starting {}", version::get_version_string());
    info!("Features: {}", version::FEATURES.join(", "));

    // The service does not start without a detector
    let detector = match DetectorState::load(&config.detector) {
        Ok(detector) => detector,
        Err(e) => {
            error!("❌ Failed to load detection model: {:#}", e);
            return Err(e);
        }
    };

    let fetcher = ImageFetcher::new(config.fetch.clone());
    info!("Image fetch timeout: {:?}", fetcher.timeout());

    let state = AppState::new(detector, fetcher);

    start_server(config.listen_addr, state).await
}
