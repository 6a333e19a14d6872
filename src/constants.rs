// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the Polaris controller.
//!
//! This module contains the queue key grammar tokens and the numeric defaults
//! used throughout the codebase. Constants are organized by category for easy
//! maintenance.

// ============================================================================
// Queue Key Grammar
// ============================================================================

/// Separator between a kind prefix, an identity and a flag in a queue key
pub const KEY_SEPARATOR: char = '~';

/// Separator between namespace and name inside an identity key
pub const IDENTITY_SEPARATOR: char = '/';

/// Kind prefix for `Namespace` queue keys
pub const NAMESPACE_PREFIX: &str = "Namespace~";

/// Kind prefix for `Service` queue keys
pub const SERVICE_PREFIX: &str = "Service~";

/// Kind prefix for `ConfigMap` queue keys
pub const CONFIG_MAP_PREFIX: &str = "ConfigMap~";

/// Flag marking a key produced by the periodic full resync pass
pub const RESYNC_FLAG: &str = "resync";

/// Full suffix appended by [`crate::identity::add_resync_suffix`]
pub const RESYNC_SUFFIX: &str = "~resync";

/// Registration-origin flag: the resource was registered when the event fired
pub const FLAG_REGISTERED: &str = "1";

/// Registration-origin flag: the resource was not registered when the event fired
pub const FLAG_NOT_REGISTERED: &str = "0";

// ============================================================================
// Kubernetes Kind Names
// ============================================================================

/// Kind name for core/v1 `Namespace`
pub const KIND_NAMESPACE: &str = "Namespace";

/// Kind name for core/v1 `Service`
pub const KIND_SERVICE: &str = "Service";

/// Kind name for core/v1 `ConfigMap`
pub const KIND_CONFIG_MAP: &str = "ConfigMap";

/// API version shared by all watched kinds
pub const CORE_API_VERSION: &str = "v1";

// ============================================================================
// Work Queue Constants
// ============================================================================

/// Base delay for per-key rate-limited requeues (5 milliseconds)
pub const REQUEUE_BASE_DELAY_MILLIS: u64 = 5;

/// Maximum delay for per-key rate-limited requeues (1000 seconds)
pub const REQUEUE_MAX_DELAY_SECS: u64 = 1000;

/// Randomization factor applied to requeue delays (±10%)
pub const REQUEUE_RANDOMIZATION_FACTOR: f64 = 0.1;

/// Number of times a worker retries a key before dropping it
pub const MAX_KEY_RETRIES: u32 = 5;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Default number of queue workers
pub const DEFAULT_WORKERS: usize = 4;

/// Default period between full resync passes (60 seconds)
pub const DEFAULT_RESYNC_PERIOD_SECS: u64 = 60;

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Port for Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 9090;

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
