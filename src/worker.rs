// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Queue worker step: route a dequeued key, dispatch it, decide its fate.
//!
//! [`handle_key`] owns the retry policy. Keys that fail to route are poison
//! and dropped at once. Keys whose dispatch fails are requeued with the
//! queue's per-key backoff until [`MAX_KEY_RETRIES`] is reached, then dropped.
//! The caller still has to call [`WorkQueue::done`].
//!
//! [`ServiceDispatcher`] is the dispatch step used by the binary. It resolves
//! Service items against the reflector cache and fails while that cache has
//! not finished its initial list, which is the transient case the retry path
//! exists for.

use crate::constants::MAX_KEY_RETRIES;
use crate::kind::ResourceKind;
use crate::metrics;
use crate::registry_names::{is_sync_enabled, registry_namespace, registry_service_name};
use crate::routing::{route_key, WorkItem};
use crate::work_queue::WorkQueue;
use k8s_openapi::api::core::v1::Service;
use kube::runtime::reflector::{ObjectRef, Store};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What happened to a key after one pass through [`handle_key`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Routed and dispatched successfully
    Processed,
    /// Could not be routed; dropped without retry
    Poisoned,
    /// Dispatch failed; requeued with backoff
    Requeued,
    /// Dispatch kept failing; dropped after the retry limit
    GaveUp,
}

/// Route `key`, run `dispatch` on the work item and apply the retry policy.
pub fn handle_key<F>(queue: &Arc<WorkQueue>, key: &str, dispatch: F) -> KeyOutcome
where
    F: FnOnce(&WorkItem) -> anyhow::Result<()>,
{
    let item = match route_key(key) {
        Ok(item) => item,
        Err(e) => {
            error!(key = %key, error = %e, "Dropping malformed queue key");
            metrics::record_key_error(e.error_type());
            metrics::record_requeue("dropped");
            queue.forget(key);
            return KeyOutcome::Poisoned;
        }
    };

    match dispatch(&item) {
        Ok(()) => {
            metrics::record_item_processed(item.kind.as_str(), item.origin.as_str());
            queue.forget(key);
            KeyOutcome::Processed
        }
        Err(e) if queue.num_requeues(key) < MAX_KEY_RETRIES => {
            warn!(key = %key, item = %item, error = %e, "Dispatch failed, requeueing key");
            metrics::record_requeue("rate_limited");
            queue.add_rate_limited(key);
            KeyOutcome::Requeued
        }
        Err(e) => {
            error!(
                key = %key,
                item = %item,
                error = %e,
                retries = MAX_KEY_RETRIES,
                "Giving up on key after max retries"
            );
            metrics::record_requeue("dropped");
            queue.forget(key);
            KeyOutcome::GaveUp
        }
    }
}

/// Resolves work items against the Service cache.
#[derive(Clone)]
pub struct ServiceDispatcher {
    services: Store<Service>,
    services_ready: Arc<AtomicBool>,
}

impl ServiceDispatcher {
    /// Dispatcher over `services`; `services_ready` is set once the Service
    /// watch delivered its initial list.
    #[must_use]
    pub fn new(services: Store<Service>, services_ready: Arc<AtomicBool>) -> Self {
        Self {
            services,
            services_ready,
        }
    }

    /// Dispatch one work item.
    ///
    /// # Errors
    ///
    /// Fails for Service items while the Service cache is still empty from
    /// startup; the item is retried once the cache has synced.
    pub fn dispatch(&self, item: &WorkItem) -> anyhow::Result<()> {
        if item.kind != ResourceKind::Service {
            debug!(item = %item, "Observed change");
            return Ok(());
        }

        if !self.services_ready.load(Ordering::Acquire) {
            anyhow::bail!("Service cache has not finished its initial list, cannot resolve {item}");
        }

        let reference = ObjectRef::<Service>::new(&item.name).within(&item.namespace);
        match self.services.get(&reference) {
            Some(service) => info!(
                item = %item,
                registry_namespace = %registry_namespace(&service),
                registry_service = %registry_service_name(&service),
                synced = is_sync_enabled(service.as_ref()),
                "Resolved Service for registry sync"
            ),
            None => info!(item = %item, "Service is gone, registry entry is stale"),
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod worker_tests;
