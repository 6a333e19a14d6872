// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Routing of dequeued keys to kind-specific work.
//!
//! Workers call [`route_key`] on every key they pull from the queue. The kind
//! predicates are checked in a fixed order (ConfigMap, Service, Namespace);
//! a key with no prefix belongs to the service queue, which is where the
//! namespace fan-out and the resync pass put their keys.

use crate::key_errors::KeyError;
use crate::kind::ResourceKind;
use crate::queue_key::{decompose, is_config_map_key, is_namespace_key, is_service_key, KeyFlag};
use std::fmt;

/// Why a key was enqueued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventOrigin {
    /// A live watch event (add, update or delete)
    Live,
    /// The periodic full resync pass
    Resync,
    /// A namespace-level sync change fanned out to its services
    NamespaceSync {
        /// Whether the service was registered when the event fired
        registered: bool,
    },
}

impl EventOrigin {
    /// Label for metrics and logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EventOrigin::Live => "live",
            EventOrigin::Resync => "resync",
            EventOrigin::NamespaceSync { .. } => "namespace_sync",
        }
    }
}

/// A decoded queue key, ready for kind-specific dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkItem {
    /// Kind of the object to reconcile
    pub kind: ResourceKind,
    /// Namespace of the object, empty for cluster-scoped kinds
    pub namespace: String,
    /// Name of the object
    pub name: String,
    /// Why the key was enqueued
    pub origin: EventOrigin,
}

impl fmt::Display for WorkItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{} {} ({})", self.kind, self.name, self.origin.as_str())
        } else {
            write!(
                f,
                "{} {}/{} ({})",
                self.kind,
                self.namespace,
                self.name,
                self.origin.as_str()
            )
        }
    }
}

/// Decode a dequeued key into a [`WorkItem`].
///
/// # Errors
///
/// Returns [`KeyError::MalformedKey`] for an empty key, an identity that is
/// not `namespace/name`, or a flag that is neither the resync marker nor a
/// known registration token. Such keys are poison and must be dropped.
pub fn route_key(key: &str) -> Result<WorkItem, KeyError> {
    if key.is_empty() {
        return Err(malformed(key, "empty queue key"));
    }

    let (rest, kind) = match is_config_map_key(key) {
        (rest, true) => (rest, ResourceKind::ConfigMap),
        _ => match is_service_key(key) {
            (rest, true) => (rest, ResourceKind::Service),
            _ => match is_namespace_key(key) {
                (rest, true) => (rest, ResourceKind::Namespace),
                (rest, false) => (rest, ResourceKind::Service),
            },
        },
    };

    let parts = decompose(rest)?;
    if parts.name.is_empty() {
        return Err(malformed(key, "name is empty"));
    }

    let flag = KeyFlag::parse(parts.flag).map_err(|err| malformed(key, &err.to_string()))?;
    let origin = match flag {
        KeyFlag::None => EventOrigin::Live,
        KeyFlag::Resync => EventOrigin::Resync,
        ref registration => match registration.registered_origin() {
            Some(registered) => EventOrigin::NamespaceSync { registered },
            None => {
                return Err(malformed(
                    key,
                    &format!("unknown registration flag '{}'", registration.as_str()),
                ))
            }
        },
    };

    Ok(WorkItem {
        kind,
        namespace: parts.namespace.to_string(),
        name: parts.name.to_string(),
        origin,
    })
}

fn malformed(key: &str, reason: &str) -> KeyError {
    KeyError::MalformedKey {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
#[path = "routing_tests.rs"]
mod routing_tests;
