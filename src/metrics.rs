// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for the Polaris controller.
//!
//! All metrics carry the namespace prefix `polaris_controller_`.
//!
//! # Metrics Categories
//!
//! - **Key Metrics** - Keys produced by event handlers and key errors
//! - **Queue Metrics** - Queue depth and rate-limited requeues
//! - **Worker Metrics** - Work items processed by kind and outcome
//!
//! # Example
//!
//! ```rust,no_run
//! use polaris_controller::metrics::{gather_metrics, record_key_enqueued};
//!
//! record_key_enqueued("Service", "live");
//! let text = gather_metrics().unwrap();
//! ```

use prometheus::{CounterVec, Encoder, IntGauge, Opts, Registry, TextEncoder};
use std::sync::LazyLock;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all controller metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "polaris_controller";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Key Metrics
// ============================================================================

/// Total number of queue keys produced by event handlers
///
/// Labels:
/// - `resource_type`: Kind of resource (`Namespace`, `Service`, `ConfigMap`)
/// - `origin`: Why the key was produced (`live`, `resync`, `namespace_sync`)
pub static KEYS_ENQUEUED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_keys_enqueued_total"),
        "Total number of queue keys produced by resource type and origin",
    );
    let counter = CounterVec::new(opts, &["resource_type", "origin"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of key encoding or decoding errors
///
/// Labels:
/// - `error_type`: Category of error (`encoding`, `unsupported_kind`, `malformed_key`, ...)
pub static KEY_ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_key_errors_total"),
        "Total number of key encoding and decoding errors by type",
    );
    let counter = CounterVec::new(opts, &["error_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Queue Metrics
// ============================================================================

/// Number of keys waiting in the work queue
pub static QUEUE_DEPTH: LazyLock<IntGauge> = LazyLock::new(|| {
    let gauge = IntGauge::new(
        format!("{METRICS_NAMESPACE}_queue_depth"),
        "Number of keys waiting in the work queue",
    )
    .unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Total number of requeue operations
///
/// Labels:
/// - `reason`: Reason for requeue (`rate_limited`, `dropped`)
pub static REQUEUE_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_requeues_total"),
        "Total number of requeue operations by reason",
    );
    let counter = CounterVec::new(opts, &["reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Worker Metrics
// ============================================================================

/// Total number of work items processed
///
/// Labels:
/// - `resource_type`: Kind of resource
/// - `origin`: Why the key was produced
pub static ITEMS_PROCESSED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_items_processed_total"),
        "Total number of work items processed by resource type and origin",
    );
    let counter = CounterVec::new(opts, &["resource_type", "origin"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a key produced by an event handler
///
/// # Arguments
/// * `resource_type` - The kind of resource the key points at
/// * `origin` - Why the key was produced
pub fn record_key_enqueued(resource_type: &str, origin: &str) {
    KEYS_ENQUEUED_TOTAL
        .with_label_values(&[resource_type, origin])
        .inc();
}

/// Record a key error
///
/// # Arguments
/// * `error_type` - Stable label from `KeyError::error_type`
pub fn record_key_error(error_type: &str) {
    KEY_ERRORS_TOTAL.with_label_values(&[error_type]).inc();
}

/// Record the current queue depth
pub fn set_queue_depth(depth: usize) {
    QUEUE_DEPTH.set(i64::try_from(depth).unwrap_or(i64::MAX));
}

/// Record a requeue
///
/// # Arguments
/// * `reason` - Why the key was requeued or dropped
pub fn record_requeue(reason: &str) {
    REQUEUE_TOTAL.with_label_values(&[reason]).inc();
}

/// Record a processed work item
///
/// # Arguments
/// * `resource_type` - The kind of resource
/// * `origin` - Why the key was produced
pub fn record_item_processed(resource_type: &str, origin: &str) {
    ITEMS_PROCESSED_TOTAL
        .with_label_values(&[resource_type, origin])
        .inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Returns
/// Prometheus-formatted metrics as a String
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
