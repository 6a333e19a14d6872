// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Annotation constants read from watched resources.
//!
//! The controller never writes these; users set them on Services and
//! Namespaces to opt into registry sync and to rename the registry entry.

// ============================================================================
// Sync Annotations
// ============================================================================

/// Annotation marking a Namespace or Service as synced to the registry
pub const POLARIS_SYNC_ANNOTATION: &str = "polarismesh.cn/sync";

/// Annotation value that enables sync
pub const SYNC_ENABLED: &str = "true";

// ============================================================================
// Registry Naming Annotations
// ============================================================================

/// Annotation overriding the registry namespace a Service is registered under
pub const POLARIS_OVERRIDE_NAMESPACE: &str = "polarismesh.cn/overrideNamespace";

/// Annotation overriding the registry service name a Service is registered as
pub const POLARIS_OVERRIDE_SERVICE: &str = "polarismesh.cn/overrideService";
