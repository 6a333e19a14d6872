// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Identity keys for watched objects.
//!
//! An identity key is the canonical `namespace/name` string for an object, or
//! just `name` for cluster-scoped objects such as `Namespace`. It is the
//! innermost segment of every queue key.
//!
//! This module also owns the resync suffix helpers, which turn an identity key
//! into the variant enqueued by the periodic full resync pass and back.

use crate::constants::{IDENTITY_SEPARATOR, RESYNC_SUFFIX};
use crate::key_errors::KeyError;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::core::DynamicObject;
use kube::Resource;

/// An object delivered by a watch stream, or the identity left behind by a
/// delete whose final state was never observed.
#[derive(Clone, Debug)]
pub enum Observed<K> {
    /// A live object with readable metadata
    Object(K),
    /// Identity already resolved at delete time, in `namespace/name` form
    Tombstone {
        /// The identity key of the deleted object
        key: String,
    },
}

/// Derive the identity key of a typed object.
///
/// # Errors
///
/// Returns [`KeyError::Encoding`] when `metadata.name` is absent or empty.
pub fn object_key<K>(obj: &K) -> Result<String, KeyError>
where
    K: Resource<DynamicType = ()>,
{
    meta_key(&K::kind(&()), obj.meta())
}

/// Derive the identity key of an untyped object.
///
/// # Errors
///
/// Returns [`KeyError::Encoding`] when `metadata.name` is absent or empty.
pub fn dynamic_object_key(obj: &DynamicObject) -> Result<String, KeyError> {
    let kind = obj.types.as_ref().map_or("unknown", |t| t.kind.as_str());
    meta_key(kind, &obj.metadata)
}

/// Derive the identity key of an object or tombstone.
///
/// Tombstones pass their stored key through unchanged.
///
/// # Errors
///
/// Returns [`KeyError::Encoding`] when the object has no name or the
/// tombstone key is empty.
pub fn observed_key<K>(observed: &Observed<K>) -> Result<String, KeyError>
where
    K: Resource<DynamicType = ()>,
{
    match observed {
        Observed::Object(obj) => object_key(obj),
        Observed::Tombstone { key } if key.is_empty() => Err(KeyError::Encoding {
            kind: K::kind(&()).into_owned(),
            reason: "tombstone carries an empty key".to_string(),
        }),
        Observed::Tombstone { key } => Ok(key.clone()),
    }
}

fn meta_key(kind: &str, meta: &ObjectMeta) -> Result<String, KeyError> {
    let name = match meta.name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => {
            return Err(KeyError::Encoding {
                kind: kind.to_string(),
                reason: "metadata.name is missing".to_string(),
            })
        }
    };

    match meta.namespace.as_deref() {
        Some(namespace) if !namespace.is_empty() => {
            Ok(format!("{namespace}{IDENTITY_SEPARATOR}{name}"))
        }
        _ => Ok(name.to_string()),
    }
}

/// Split an identity key into `(namespace, name)`.
///
/// A key without a separator is a cluster-scoped name and yields an empty
/// namespace. Separators are not escaped, so a key with more than one `/` is
/// rejected.
///
/// # Errors
///
/// Returns [`KeyError::MalformedKey`] when the key has more than two segments.
pub fn split_identity_key(key: &str) -> Result<(&str, &str), KeyError> {
    let mut parts = key.split(IDENTITY_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(name), None, _) => Ok(("", name)),
        (Some(namespace), Some(name), None) => Ok((namespace, name)),
        _ => Err(KeyError::MalformedKey {
            key: key.to_string(),
            reason: "unexpected key format, expected 'namespace/name' or 'name'".to_string(),
        }),
    }
}

/// Append the resync suffix to a key.
///
/// Not idempotent: applying it twice produces `key~resync~resync`, which no
/// decoder accepts as a resync of `key`.
#[must_use]
pub fn add_resync_suffix(key: &str) -> String {
    format!("{key}{RESYNC_SUFFIX}")
}

/// Whether `key` carries the resync suffix.
#[must_use]
pub fn is_resync_key(key: &str) -> bool {
    key.ends_with(RESYNC_SUFFIX)
}

/// Remove the resync suffix added by [`add_resync_suffix`].
///
/// # Errors
///
/// Returns [`KeyError::MissingResyncSuffix`] when `key` does not end with
/// `~resync`.
pub fn strip_resync_suffix(key: &str) -> Result<&str, KeyError> {
    key.strip_suffix(RESYNC_SUFFIX)
        .ok_or_else(|| KeyError::MissingResyncSuffix {
            key: key.to_string(),
        })
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod identity_tests;
