// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP image fetching

use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default per-request timeout for image downloads
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the image fetcher
#[derive(Debug, Clone, PartialEq)]
pub struct FetchConfig {
    /// Total time allowed for one download (connect + body)
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_FETCH_TIMEOUT,
            user_agent: format!("image-recognition-node/{}", crate::version::VERSION),
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Downloads image bytes over HTTP(S)
///
/// Holds one pooled `reqwest::Client` for the life of the service.
/// Downloads are attempted once, never retried.
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl ImageFetcher {
    pub fn new(config: FetchConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.config.timeout
    }

    /// Fetch the body at `url`
    ///
    /// Any transport error, timeout, or non-2xx status is a `FetchError`.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(transport)?;
        debug!("Fetched {} bytes from {}", body.len(), url);

        Ok(body.to_vec())
    }
}

impl Default for ImageFetcher {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}
