// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Queue key composition and decomposition.
//!
//! A queue key is the only thing stored in the work queue. Its grammar is:
//!
//! ```text
//! QueueKey   := [KindPrefix] Namespace "/" Name ["~" Flag]
//! KindPrefix := "Namespace~" | "Service~" | "ConfigMap~"
//! Flag       := "resync" | <registration-origin token>
//! ```
//!
//! Event handlers build keys with [`key_with_flag`] or [`map_queue_key`];
//! workers recover the parts with the `is_*_key` predicates followed by
//! [`decompose`]. [`QueueKey`] wraps the same grammar in a typed value whose
//! flag slot is a tagged [`KeyFlag`] instead of an opaque string.
//!
//! # Example
//!
//! ```rust
//! use polaris_controller::queue_key::{decompose, is_service_key};
//!
//! let (rest, is_service) = is_service_key("Service~ns1/svcA~1");
//! assert!(is_service);
//!
//! let parts = decompose(rest).unwrap();
//! assert_eq!(parts.base, "ns1/svcA");
//! assert_eq!(parts.namespace, "ns1");
//! assert_eq!(parts.name, "svcA");
//! assert_eq!(parts.flag, "1");
//! ```

use crate::constants::{
    FLAG_NOT_REGISTERED, FLAG_REGISTERED, IDENTITY_SEPARATOR, KEY_SEPARATOR, RESYNC_FLAG,
};
use crate::identity::{dynamic_object_key, object_key, split_identity_key};
use crate::key_errors::KeyError;
use crate::kind::{KindedResource, ResourceKind};
use k8s_openapi::api::core::v1::ConfigMap;
use kube::core::DynamicObject;
use kube::Resource;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Composer
// ============================================================================

/// Build `namespace/name~flag` for an object.
///
/// The flag is opaque here; any string is accepted.
///
/// # Errors
///
/// Returns [`KeyError::Encoding`] when the object's identity cannot be derived.
pub fn key_with_flag<K>(obj: &K, flag: &str) -> Result<String, KeyError>
where
    K: Resource<DynamicType = ()>,
{
    let key = object_key(obj)?;
    Ok(format!("{key}{KEY_SEPARATOR}{flag}"))
}

/// Build `namespace/name~flag` for a `ConfigMap`.
///
/// # Errors
///
/// Returns [`KeyError::Encoding`] when the ConfigMap has no name.
pub fn config_map_key_with_flag(config_map: &ConfigMap, flag: &str) -> Result<String, KeyError> {
    key_with_flag(config_map, flag)
}

/// Build `KindPrefix + namespace/name` for a typed object.
///
/// # Errors
///
/// Returns [`KeyError::Encoding`] when the object's identity cannot be derived.
pub fn map_queue_key<K>(obj: &K) -> Result<String, KeyError>
where
    K: KindedResource,
{
    let key = object_key(obj)?;
    Ok(format!("{}{key}", obj.resource_kind().prefix()))
}

/// Build `KindPrefix + namespace/name` for an untyped object.
///
/// The kind is taken from the object's type metadata.
///
/// # Errors
///
/// Returns [`KeyError::UnsupportedKind`] when the object is not a core/v1
/// `Namespace`, `Service` or `ConfigMap`, and [`KeyError::Encoding`] when its
/// identity cannot be derived. No key is produced in either case.
pub fn map_dynamic_queue_key(obj: &DynamicObject) -> Result<String, KeyError> {
    let kind = ResourceKind::from_type_meta(obj.types.as_ref())?;
    let key = dynamic_object_key(obj)?;
    Ok(format!("{}{key}", kind.prefix()))
}

// ============================================================================
// Decomposer
// ============================================================================

/// The parts of an untagged queue key, borrowed from the key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecomposedKey<'a> {
    /// Identity segment, everything before the first `~`
    pub base: &'a str,
    /// Namespace part of the identity (empty for cluster-scoped objects)
    pub namespace: &'a str,
    /// Name part of the identity
    pub name: &'a str,
    /// Everything after the first `~`, or empty when there is no flag
    pub flag: &'a str,
}

/// Split a queue key into identity, namespace, name and flag.
///
/// The key must already have its kind prefix removed (see
/// [`is_service_key`] and friends). An empty key is the "no key" sentinel and
/// decodes to all-empty parts.
///
/// # Errors
///
/// Returns [`KeyError::MalformedKey`] when the identity segment has more than
/// one `/`.
pub fn decompose(key: &str) -> Result<DecomposedKey<'_>, KeyError> {
    if key.is_empty() {
        return Ok(DecomposedKey::default());
    }

    let (base, flag) = key.split_once(KEY_SEPARATOR).unwrap_or((key, ""));
    let (namespace, name) = split_identity_key(base)?;

    Ok(DecomposedKey {
        base,
        namespace,
        name,
        flag,
    })
}

/// Strip the `Service~` prefix.
///
/// Returns the remainder and `true` on a match, or the key unchanged and
/// `false` otherwise.
#[must_use]
pub fn is_service_key(key: &str) -> (&str, bool) {
    strip_kind(ResourceKind::Service, key)
}

/// Strip the `ConfigMap~` prefix.
///
/// Returns the remainder and `true` on a match, or the key unchanged and
/// `false` otherwise.
#[must_use]
pub fn is_config_map_key(key: &str) -> (&str, bool) {
    strip_kind(ResourceKind::ConfigMap, key)
}

/// Strip the `Namespace~` prefix.
///
/// Returns the remainder and `true` on a match, or the key unchanged and
/// `false` otherwise.
#[must_use]
pub fn is_namespace_key(key: &str) -> (&str, bool) {
    strip_kind(ResourceKind::Namespace, key)
}

fn strip_kind(kind: ResourceKind, key: &str) -> (&str, bool) {
    match kind.strip_prefix(key) {
        Some(rest) => (rest, true),
        None => (key, false),
    }
}

// ============================================================================
// Typed Queue Key
// ============================================================================

/// The single flag slot of a queue key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum KeyFlag {
    /// No flag: a live watch event
    #[default]
    None,
    /// Produced by the periodic full resync pass
    Resync,
    /// Registration-origin token recorded when the event fired
    Registration(String),
}

impl KeyFlag {
    /// A validated registration-origin flag.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidFlag`] when the token is empty, contains
    /// `~`, or equals the resync marker.
    pub fn registration(token: impl Into<String>) -> Result<Self, KeyError> {
        let token = token.into();
        let reason = if token.is_empty() {
            Some("token is empty")
        } else if token.contains(KEY_SEPARATOR) {
            Some("token contains the key separator '~'")
        } else if token == RESYNC_FLAG {
            Some("token collides with the resync marker")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(KeyError::InvalidFlag {
                flag: token,
                reason: reason.to_string(),
            }),
            None => Ok(KeyFlag::Registration(token)),
        }
    }

    /// The registration flag for a resource that was (or was not) registered.
    #[must_use]
    pub fn registered(registered: bool) -> Self {
        let token = if registered {
            FLAG_REGISTERED
        } else {
            FLAG_NOT_REGISTERED
        };
        KeyFlag::Registration(token.to_string())
    }

    /// Interpret the flag segment of a decomposed key.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidFlag`] when the segment is not a valid
    /// registration token (for example `resync~resync`).
    pub fn parse(segment: &str) -> Result<Self, KeyError> {
        match segment {
            "" => Ok(KeyFlag::None),
            RESYNC_FLAG => Ok(KeyFlag::Resync),
            other => KeyFlag::registration(other),
        }
    }

    /// The token written after `~`, empty for [`KeyFlag::None`].
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            KeyFlag::None => "",
            KeyFlag::Resync => RESYNC_FLAG,
            KeyFlag::Registration(token) => token,
        }
    }

    /// Registration state recorded by [`KeyFlag::registered`], if any.
    #[must_use]
    pub fn registered_origin(&self) -> Option<bool> {
        match self {
            KeyFlag::Registration(token) if token == FLAG_REGISTERED => Some(true),
            KeyFlag::Registration(token) if token == FLAG_NOT_REGISTERED => Some(false),
            _ => None,
        }
    }
}

/// A queue key as a typed value.
///
/// `Display` writes the wire grammar and `FromStr` parses it, so a
/// `QueueKey` can be pushed through the string-keyed work queue and recovered
/// intact on the other side.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QueueKey {
    kind: Option<ResourceKind>,
    namespace: String,
    name: String,
    flag: KeyFlag,
}

impl QueueKey {
    /// An untagged key with no flag.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::MalformedKey`] when the name is empty, either
    /// component contains `/` or `~`, or a cluster-scoped name equals a kind
    /// name. `Service` followed by a flag would read back as the `Service~`
    /// prefix.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self, KeyError> {
        let namespace = namespace.into();
        let name = name.into();

        if name.is_empty() {
            return Err(KeyError::MalformedKey {
                key: format!("{namespace}{IDENTITY_SEPARATOR}"),
                reason: "name is empty".to_string(),
            });
        }
        for component in [&namespace, &name] {
            if component.contains(KEY_SEPARATOR) || component.contains(IDENTITY_SEPARATOR) {
                return Err(KeyError::MalformedKey {
                    key: component.clone(),
                    reason: "component contains a reserved separator".to_string(),
                });
            }
        }

        if namespace.is_empty() && name.parse::<ResourceKind>().is_ok() {
            return Err(KeyError::MalformedKey {
                key: name,
                reason: "cluster-scoped name collides with a kind prefix".to_string(),
            });
        }

        Ok(Self {
            kind: None,
            namespace,
            name,
            flag: KeyFlag::None,
        })
    }

    /// A kind-tagged key for a typed object.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::Encoding`] when the object's identity cannot be
    /// derived.
    pub fn for_object<K>(obj: &K) -> Result<Self, KeyError>
    where
        K: KindedResource,
    {
        let key = object_key(obj)?;
        let (namespace, name) = split_identity_key(&key)?;
        Ok(Self::new(namespace, name)?.with_kind(obj.resource_kind()))
    }

    /// Tag this key with a kind prefix.
    #[must_use]
    pub fn with_kind(mut self, kind: ResourceKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Replace the flag slot.
    #[must_use]
    pub fn with_flag(mut self, flag: KeyFlag) -> Self {
        self.flag = flag;
        self
    }

    /// The kind prefix, if any.
    #[must_use]
    pub fn kind(&self) -> Option<ResourceKind> {
        self.kind
    }

    /// Namespace component, empty for cluster-scoped objects.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Name component.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The flag slot.
    #[must_use]
    pub fn flag(&self) -> &KeyFlag {
        &self.flag
    }

    /// The identity key, `namespace/name` or `name`.
    #[must_use]
    pub fn identity(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}{IDENTITY_SEPARATOR}{}", self.namespace, self.name)
        }
    }
}

impl fmt::Display for QueueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kind) = self.kind {
            f.write_str(kind.prefix())?;
        }
        f.write_str(&self.identity())?;
        match &self.flag {
            KeyFlag::None => Ok(()),
            flag => write!(f, "{KEY_SEPARATOR}{}", flag.as_str()),
        }
    }
}

impl FromStr for QueueKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, rest) = match ResourceKind::split_prefix(s) {
            Some((kind, rest)) => (Some(kind), rest),
            None => (None, s),
        };

        let parts = decompose(rest)?;
        let flag = KeyFlag::parse(parts.flag).map_err(|err| KeyError::MalformedKey {
            key: s.to_string(),
            reason: err.to_string(),
        })?;

        let key = QueueKey::new(parts.namespace, parts.name).map_err(|err| match err {
            KeyError::MalformedKey { reason, .. } => KeyError::MalformedKey {
                key: s.to_string(),
                reason,
            },
            other => other,
        })?;

        Ok(Self {
            kind,
            flag,
            ..key
        })
    }
}

#[cfg(test)]
#[path = "queue_key_tests.rs"]
mod queue_key_tests;
