// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Registry naming and sync-state helpers.
//!
//! A Service is registered under its Kubernetes namespace and name unless the
//! override annotations say otherwise. Whether a Namespace or Service is
//! synced at all is read from the sync annotation; that state becomes the
//! registration-origin flag of fan-out keys.

use crate::labels::{
    POLARIS_OVERRIDE_NAMESPACE, POLARIS_OVERRIDE_SERVICE, POLARIS_SYNC_ANNOTATION, SYNC_ENABLED,
};
use k8s_openapi::api::core::v1::Service;
use kube::{Resource, ResourceExt};

/// Registry namespace for a Service.
///
/// Returns the `polarismesh.cn/overrideNamespace` annotation when set and
/// non-empty, otherwise the Service's own namespace.
#[must_use]
pub fn registry_namespace(service: &Service) -> String {
    annotation_override(service, POLARIS_OVERRIDE_NAMESPACE)
        .unwrap_or_else(|| service.namespace().unwrap_or_default())
}

/// Registry service name for a Service.
///
/// Returns the `polarismesh.cn/overrideService` annotation when set and
/// non-empty, otherwise the Service's own name.
#[must_use]
pub fn registry_service_name(service: &Service) -> String {
    annotation_override(service, POLARIS_OVERRIDE_SERVICE).unwrap_or_else(|| service.name_any())
}

/// Whether an object opted into registry sync.
#[must_use]
pub fn is_sync_enabled<K: Resource>(obj: &K) -> bool {
    obj.meta()
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(POLARIS_SYNC_ANNOTATION))
        .is_some_and(|value| value == SYNC_ENABLED)
}

fn annotation_override(service: &Service, annotation: &str) -> Option<String> {
    service
        .annotations()
        .get(annotation)
        .filter(|value| !value.is_empty())
        .cloned()
}

#[cfg(test)]
#[path = "registry_names_tests.rs"]
mod registry_names_tests;
