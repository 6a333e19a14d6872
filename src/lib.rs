// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Polaris Controller - Kubernetes to Polaris registry sync
//!
//! The controller watches Services, Namespaces and ConfigMaps and funnels
//! every change through a single work queue keyed by strings. This crate
//! owns the key vocabulary shared by everything that produces or consumes
//! those keys.
//!
//! ## Key grammar
//!
//! ```text
//! [KindPrefix]Namespace/Name[~Flag]
//! ```
//!
//! - `KindPrefix` is one of `Namespace~`, `Service~`, `ConfigMap~`
//! - `Flag` is `resync` or a registration token (`1` registered, `0` not)
//! - Cluster-scoped objects drop the `Namespace/` part
//!
//! ## Modules
//!
//! - [`identity`] - Object identity keys and the resync suffix
//! - [`kind`] - Resource kinds and their key prefixes
//! - [`queue_key`] - Building, decomposing and classifying queue keys
//! - [`routing`] - Routing a dequeued key to a typed work item
//! - [`event_handler`] - Turning watch events into queue keys
//! - [`registry_names`] - Registry namespace/service names for a Service
//! - [`work_queue`] - Deduplicating, rate-limited work queue
//! - [`worker`] - Per-key dispatch and retry policy
//! - [`backoff`] - Per-item exponential backoff
//! - [`metrics`] - Prometheus metrics
//! - [`config`] - Command-line configuration
//!
//! ## Example
//!
//! ```rust
//! use polaris_controller::routing::{route_key, EventOrigin};
//! use polaris_controller::kind::ResourceKind;
//!
//! let item = route_key("ns1/svcA~resync").unwrap();
//! assert_eq!(item.kind, ResourceKind::Service);
//! assert_eq!(item.origin, EventOrigin::Resync);
//! ```

pub mod backoff;
pub mod config;
pub mod constants;
pub mod event_handler;
pub mod identity;
pub mod key_errors;
pub mod kind;
pub mod labels;
pub mod metrics;
pub mod queue_key;
pub mod registry_names;
pub mod routing;
pub mod work_queue;
pub mod worker;
