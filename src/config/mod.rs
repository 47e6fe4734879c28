// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Resolved service configuration

use std::net::SocketAddr;

use crate::vision::{DetectorConfig, FetchConfig};

/// Port the service listens on unless overridden
pub const DEFAULT_PORT: u16 = 5000;

/// Everything `main` needs to start the service
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub listen_addr: SocketAddr,
    pub detector: DetectorConfig,
    pub fetch: FetchConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            detector: DetectorConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}
