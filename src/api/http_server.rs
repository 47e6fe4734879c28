// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::health_handler;
use super::recognition::recognition_handler;
use crate::vision::{DetectorState, ImageFetcher};

/// Shared state handed to every handler
///
/// Built once at startup and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Loaded detector; `None` only when startup skipped loading
    pub detector: Option<DetectorState>,
    pub fetcher: ImageFetcher,
}

impl AppState {
    pub fn new(detector: DetectorState, fetcher: ImageFetcher) -> Self {
        Self {
            detector: Some(detector),
            fetcher,
        }
    }

    /// State without a detector and with a default fetcher
    pub fn new_for_test() -> Self {
        Self {
            detector: None,
            fetcher: ImageFetcher::default(),
        }
    }

    pub fn with_detector(mut self, detector: DetectorState) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn model_loaded(&self) -> bool {
        self.detector.is_some()
    }
}

/// Build the router with all routes and middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/image/recognition", post(recognition_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl+C
pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = create_app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌐 Recognition API listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
