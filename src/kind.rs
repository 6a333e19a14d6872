// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resource kinds that can be tagged onto a queue key.
//!
//! The controller watches exactly three core/v1 kinds. Each has a static
//! prefix (`Namespace~`, `Service~`, `ConfigMap~`) that is prepended to the
//! identity key when the event should be routed by kind. The prefixes are
//! distinct and none is a prefix of another, so classification by
//! `starts_with` is unambiguous.
//!
//! Typed collaborators expose their kind through [`KindedResource`]. Untyped
//! objects are classified from their `TypeMeta` via
//! [`ResourceKind::from_type_meta`], which is the only place an unsupported
//! kind can be reported.

use crate::constants::{
    CONFIG_MAP_PREFIX, CORE_API_VERSION, KIND_CONFIG_MAP, KIND_NAMESPACE, KIND_SERVICE,
    NAMESPACE_PREFIX, SERVICE_PREFIX,
};
use crate::key_errors::KeyError;
use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Service};
use kube::core::TypeMeta;
use kube::Resource;
use std::fmt;
use std::str::FromStr;

/// Closed set of resource kinds carried in queue keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// core/v1 `Namespace` (cluster-scoped)
    Namespace,
    /// core/v1 `Service`
    Service,
    /// core/v1 `ConfigMap`
    ConfigMap,
}

impl ResourceKind {
    /// Every kind, in the order keys are classified by [`ResourceKind::split_prefix`].
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::ConfigMap,
        ResourceKind::Service,
        ResourceKind::Namespace,
    ];

    /// The prefix prepended to identity keys of this kind.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            ResourceKind::Namespace => NAMESPACE_PREFIX,
            ResourceKind::Service => SERVICE_PREFIX,
            ResourceKind::ConfigMap => CONFIG_MAP_PREFIX,
        }
    }

    /// The Kubernetes `kind` name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Namespace => KIND_NAMESPACE,
            ResourceKind::Service => KIND_SERVICE,
            ResourceKind::ConfigMap => KIND_CONFIG_MAP,
        }
    }

    /// Strip this kind's prefix from `key`, if present.
    #[must_use]
    pub fn strip_prefix(self, key: &str) -> Option<&str> {
        key.strip_prefix(self.prefix())
    }

    /// Classify a key by its prefix.
    ///
    /// Returns the matching kind and the remainder of the key, or `None` for
    /// an untagged key.
    #[must_use]
    pub fn split_prefix(key: &str) -> Option<(ResourceKind, &str)> {
        Self::ALL
            .into_iter()
            .find_map(|kind| kind.strip_prefix(key).map(|rest| (kind, rest)))
    }

    /// Classify an untyped object from its type metadata.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::UnsupportedKind`] when the type metadata is absent,
    /// is not core/v1, or names a kind outside the supported set.
    pub fn from_type_meta(types: Option<&TypeMeta>) -> Result<Self, KeyError> {
        let Some(types) = types else {
            return Err(KeyError::UnsupportedKind {
                kind: String::new(),
                api_version: String::new(),
            });
        };

        let unsupported = || KeyError::UnsupportedKind {
            kind: types.kind.clone(),
            api_version: types.api_version.clone(),
        };

        if types.api_version != CORE_API_VERSION {
            return Err(unsupported());
        }
        types.kind.parse().map_err(|_| unsupported())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            KIND_NAMESPACE => Ok(ResourceKind::Namespace),
            KIND_SERVICE => Ok(ResourceKind::Service),
            KIND_CONFIG_MAP => Ok(ResourceKind::ConfigMap),
            other => Err(KeyError::UnsupportedKind {
                kind: other.to_string(),
                api_version: CORE_API_VERSION.to_string(),
            }),
        }
    }
}

/// A Kubernetes object that knows which [`ResourceKind`] it is.
///
/// Implemented for the three watched core/v1 types, so kind tagging a typed
/// object cannot fail on the kind.
pub trait KindedResource: Resource<DynamicType = ()> {
    /// The kind used to tag this object's queue keys.
    fn resource_kind(&self) -> ResourceKind;
}

impl KindedResource for Namespace {
    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::Namespace
    }
}

impl KindedResource for Service {
    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::Service
    }
}

impl KindedResource for ConfigMap {
    fn resource_kind(&self) -> ResourceKind {
        ResourceKind::ConfigMap
    }
}

#[cfg(test)]
#[path = "kind_tests.rs"]
mod kind_tests;
