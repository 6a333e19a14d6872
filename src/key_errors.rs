// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for queue key encoding and decoding.
//!
//! Every operation in [`crate::identity`] and [`crate::queue_key`] reports
//! failures through [`KeyError`]. The caller decides whether to drop the
//! event, drop the dequeued item, or escalate; nothing in the key layer
//! retries or swallows an error.

use thiserror::Error;

/// Errors raised while building or parsing queue keys.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// The object's identity could not be derived
    ///
    /// Returned when a watched object carries no name (or an empty one), so no
    /// `namespace/name` key exists for it. The event must be dropped; a key
    /// built from a failed encoding would route work to the wrong object.
    #[error("Cannot derive queue key for {kind} object: {reason}")]
    Encoding {
        /// Kind of the object, or "unknown" when not available
        kind: String,
        /// Explanation of what is missing
        reason: String,
    },

    /// Kind tagging was requested for an object outside the supported set
    ///
    /// Only `Namespace`, `Service` and `ConfigMap` carry a kind prefix. This
    /// usually means a watch was configured for a kind the key scheme does not
    /// know about.
    #[error("Unsupported resource kind '{kind}' (apiVersion '{api_version}')")]
    UnsupportedKind {
        /// The `kind` reported by the object's type metadata
        kind: String,
        /// The `apiVersion` reported by the object's type metadata
        api_version: String,
    },

    /// The identity segment of a key does not follow `namespace/name`
    ///
    /// A dequeued key that fails this check is poison: drop it and log, never
    /// requeue it verbatim.
    #[error("Malformed queue key '{key}': {reason}")]
    MalformedKey {
        /// The offending key (or identity segment)
        key: String,
        /// Explanation of the grammar violation
        reason: String,
    },

    /// A resync-tagged key was expected but the suffix is absent
    #[error("Queue key '{key}' does not end with the resync suffix")]
    MissingResyncSuffix {
        /// The key that was expected to carry the suffix
        key: String,
    },

    /// A registration-origin flag token cannot be placed in a queue key
    ///
    /// Tokens must be non-empty, must not contain the key separator and must
    /// not equal the resync marker, otherwise decoding becomes ambiguous.
    #[error("Invalid registration flag '{flag}': {reason}")]
    InvalidFlag {
        /// The rejected token
        flag: String,
        /// Why the token was rejected
        reason: String,
    },
}

impl KeyError {
    /// Short, stable label for metrics and structured logs.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            KeyError::Encoding { .. } => "encoding",
            KeyError::UnsupportedKind { .. } => "unsupported_kind",
            KeyError::MalformedKey { .. } => "malformed_key",
            KeyError::MissingResyncSuffix { .. } => "missing_resync_suffix",
            KeyError::InvalidFlag { .. } => "invalid_flag",
        }
    }

    /// Whether a dequeued key that produced this error must be discarded.
    ///
    /// Decoding errors are permanent for a given key string: retrying the same
    /// bytes can never succeed.
    #[must_use]
    pub fn is_poison(&self) -> bool {
        matches!(
            self,
            KeyError::MalformedKey { .. } | KeyError::MissingResyncSuffix { .. }
        )
    }
}

#[cfg(test)]
#[path = "key_errors_tests.rs"]
mod key_errors_tests;
