// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Command-line and environment configuration for the controller binary.

use crate::constants::{
    DEFAULT_RESYNC_PERIOD_SECS, DEFAULT_WORKERS, METRICS_SERVER_BIND_ADDRESS, METRICS_SERVER_PORT,
};
use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact human-readable lines with ANSI colors
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Controller settings, read from flags with environment fallbacks.
#[derive(Clone, Debug, Parser)]
#[clap(
    name = "polaris-controller",
    about = "Syncs Kubernetes Services, Namespaces and ConfigMaps into a Polaris registry"
)]
pub struct ControllerArgs {
    /// Number of queue workers.
    #[clap(long, default_value_t = DEFAULT_WORKERS, env = "POLARIS_CONTROLLER_WORKERS")]
    pub workers: usize,

    /// Seconds between full resync passes; 0 disables resync.
    #[clap(
        long,
        default_value_t = DEFAULT_RESYNC_PERIOD_SECS,
        env = "POLARIS_CONTROLLER_RESYNC_PERIOD_SECS"
    )]
    pub resync_period_secs: u64,

    /// Only watch this namespace. Watches all namespaces when unset.
    #[clap(long, env = "POLARIS_CONTROLLER_WATCH_NAMESPACE")]
    pub watch_namespace: Option<String>,

    /// Address the metrics server binds to.
    #[clap(long, default_value = METRICS_SERVER_BIND_ADDRESS)]
    pub metrics_address: IpAddr,

    /// Port the metrics server listens on.
    #[clap(long, default_value_t = METRICS_SERVER_PORT)]
    pub metrics_port: u16,

    /// Log output format.
    #[clap(long, value_enum, default_value = "text", env = "RUST_LOG_FORMAT", ignore_case = true)]
    pub log_format: LogFormat,
}

impl ControllerArgs {
    /// Resync period, or `None` when resync is disabled.
    #[must_use]
    pub fn resync_period(&self) -> Option<Duration> {
        (self.resync_period_secs > 0).then(|| Duration::from_secs(self.resync_period_secs))
    }

    /// Socket address for the metrics server.
    #[must_use]
    pub fn metrics_addr(&self) -> SocketAddr {
        SocketAddr::new(self.metrics_address, self.metrics_port)
    }

    /// Worker count, never below one.
    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
