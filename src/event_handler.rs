// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Turning watch events into queue keys.
//!
//! Three producers feed the queue:
//!
//! - Live watch events on Services, Namespaces and ConfigMaps produce
//!   kind-prefixed keys ([`key_for_event`]).
//! - A Namespace whose sync annotation changes fans out one flagged key per
//!   Service in it, recording whether the Service was registered before the
//!   change ([`namespace_fanout_keys`]).
//! - The periodic resync pass produces resync-tagged identity keys for every
//!   known Service ([`resync_keys`]).
//!
//! Producers never combine a kind prefix with a flag. Objects whose identity
//! cannot be encoded are logged, counted and dropped here; they never reach
//! the queue.

use crate::identity::{add_resync_suffix, object_key};
use crate::key_errors::KeyError;
use crate::kind::{KindedResource, ResourceKind};
use crate::metrics::{record_key_enqueued, record_key_error};
use crate::queue_key::{key_with_flag, map_queue_key, KeyFlag};
use crate::registry_names::is_sync_enabled;
use crate::routing::EventOrigin;
use k8s_openapi::api::core::v1::{Namespace, Service};
use kube::runtime::watcher::Event;
use kube::ResourceExt;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Kind-prefixed queue key for a watch event, if the event carries an object.
///
/// `Init` and `InitDone` markers carry no object and produce no key. Deletes
/// produce the same key as updates; the worker observes the absence.
pub fn key_for_event<K>(event: &Event<K>) -> Option<String>
where
    K: KindedResource,
{
    match event {
        Event::Apply(obj) | Event::InitApply(obj) | Event::Delete(obj) => {
            let kind = obj.resource_kind();
            accept(kind, EventOrigin::Live, map_queue_key(obj))
        }
        Event::Init | Event::InitDone => None,
    }
}

/// Flagged service keys for a namespace whose sync state changed.
///
/// A Service counts as registered when its namespace was synced before the
/// change or the Service itself carries the sync annotation.
pub fn namespace_fanout_keys<'a, I>(namespace_was_synced: bool, services: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Service>,
{
    services
        .into_iter()
        .filter_map(|service| {
            let registered = namespace_was_synced || is_sync_enabled(service);
            let flag = KeyFlag::registered(registered);
            accept(
                ResourceKind::Service,
                EventOrigin::NamespaceSync { registered },
                key_with_flag(service, flag.as_str()),
            )
        })
        .collect()
}

/// Resync-tagged identity keys for the periodic full pass.
pub fn resync_keys<'a, I>(services: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a Service>,
{
    services
        .into_iter()
        .filter_map(|service| {
            let key = object_key(service).map(|key| add_resync_suffix(&key));
            accept(ResourceKind::Service, EventOrigin::Resync, key)
        })
        .collect()
}

fn accept(
    kind: ResourceKind,
    origin: EventOrigin,
    result: Result<String, KeyError>,
) -> Option<String> {
    match result {
        Ok(key) => {
            debug!(key = %key, kind = %kind, origin = origin.as_str(), "Produced queue key");
            record_key_enqueued(kind.as_str(), origin.as_str());
            Some(key)
        }
        Err(e) => {
            warn!(
                kind = %kind,
                origin = origin.as_str(),
                error_type = e.error_type(),
                error = %e,
                "Dropping event, queue key could not be built"
            );
            record_key_error(e.error_type());
            None
        }
    }
}

/// Last observed sync state of every Namespace.
///
/// Owned by the namespace event loop; used to detect sync annotation changes
/// that require a service fan-out.
#[derive(Debug, Default)]
pub struct NamespaceSyncTracker {
    states: HashMap<String, bool>,
}

impl NamespaceSyncTracker {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a Namespace from an apply event.
    ///
    /// Returns the previous sync state when it changed, so the caller can fan
    /// out with the correct registration flag. The first sighting of a
    /// Namespace is not a change.
    pub fn observe(&mut self, namespace: &Namespace) -> Option<bool> {
        let name = namespace.name_any();
        let synced = is_sync_enabled(namespace);
        match self.states.insert(name, synced) {
            Some(previous) if previous != synced => Some(previous),
            _ => None,
        }
    }

    /// Forget a deleted Namespace, returning its last sync state.
    pub fn remove(&mut self, namespace: &Namespace) -> Option<bool> {
        self.states.remove(&namespace.name_any())
    }

    /// Number of tracked Namespaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether no Namespace is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
#[path = "event_handler_tests.rs"]
mod event_handler_tests;
