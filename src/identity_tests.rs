// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `identity.rs`

#[cfg(test)]
mod tests {
    use super::super::*;
    use k8s_openapi::api::core::v1::{ConfigMap, Namespace, Service};
    use kube::core::{ApiResource, TypeMeta};

    fn service(namespace: &str, name: &str) -> Service {
        Service {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    // ========== object_key ==========

    #[test]
    fn test_object_key_namespaced() {
        assert_eq!(object_key(&service("default", "web")).unwrap(), "default/web");
    }

    #[test]
    fn test_object_key_cluster_scoped() {
        let ns = Namespace {
            metadata: ObjectMeta {
                name: Some("kube-system".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(object_key(&ns).unwrap(), "kube-system");
    }

    #[test]
    fn test_object_key_empty_namespace_is_cluster_scoped() {
        let cm = ConfigMap {
            metadata: ObjectMeta {
                name: Some("cm1".to_string()),
                namespace: Some(String::new()),
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(object_key(&cm).unwrap(), "cm1");
    }

    #[test]
    fn test_object_key_missing_name_fails() {
        let svc = Service {
            metadata: ObjectMeta {
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let err = object_key(&svc).unwrap_err();
        assert_eq!(
            err,
            KeyError::Encoding {
                kind: "Service".to_string(),
                reason: "metadata.name is missing".to_string(),
            }
        );
    }

    #[test]
    fn test_object_key_empty_name_fails() {
        let svc = service("default", "");
        assert!(matches!(object_key(&svc), Err(KeyError::Encoding { .. })));
    }

    #[test]
    fn test_dynamic_object_key() {
        let ar = ApiResource::erase::<ConfigMap>(&());
        let mut obj = DynamicObject::new("cm1", &ar).within("kube-system");
        assert_eq!(dynamic_object_key(&obj).unwrap(), "kube-system/cm1");

        obj.metadata.name = None;
        obj.types = Some(TypeMeta {
            api_version: "v1".to_string(),
            kind: "ConfigMap".to_string(),
        });
        assert!(matches!(
            dynamic_object_key(&obj),
            Err(KeyError::Encoding { ref kind, .. }) if kind == "ConfigMap"
        ));
    }

    // ========== observed_key ==========

    #[test]
    fn test_observed_key_object() {
        let observed = Observed::Object(service("ns1", "svcA"));
        assert_eq!(observed_key(&observed).unwrap(), "ns1/svcA");
    }

    #[test]
    fn test_observed_key_tombstone_passes_through() {
        let observed: Observed<Service> = Observed::Tombstone {
            key: "ns1/gone".to_string(),
        };
        assert_eq!(observed_key(&observed).unwrap(), "ns1/gone");
    }

    #[test]
    fn test_observed_key_empty_tombstone_fails() {
        let observed: Observed<Service> = Observed::Tombstone { key: String::new() };
        assert!(matches!(
            observed_key(&observed),
            Err(KeyError::Encoding { .. })
        ));
    }

    // ========== split_identity_key ==========

    #[test]
    fn test_split_identity_key() {
        assert_eq!(split_identity_key("default/web").unwrap(), ("default", "web"));
        assert_eq!(split_identity_key("kube-system").unwrap(), ("", "kube-system"));
        assert_eq!(split_identity_key("").unwrap(), ("", ""));
    }

    #[test]
    fn test_split_identity_key_too_many_segments() {
        let err = split_identity_key("a/b/c").unwrap_err();
        assert!(matches!(err, KeyError::MalformedKey { ref key, .. } if key == "a/b/c"));
    }

    // ========== resync suffix ==========

    #[test]
    fn test_add_resync_suffix() {
        assert_eq!(add_resync_suffix("ns1/svcA"), "ns1/svcA~resync");
    }

    #[test]
    fn test_add_resync_suffix_is_not_idempotent() {
        let twice = add_resync_suffix(&add_resync_suffix("ns1/svcA"));
        assert_eq!(twice, "ns1/svcA~resync~resync");
    }

    #[test]
    fn test_strip_resync_suffix() {
        assert_eq!(strip_resync_suffix("ns1/svcA~resync").unwrap(), "ns1/svcA");
    }

    #[test]
    fn test_strip_resync_suffix_round_trip() {
        for key in ["ns1/svcA", "default/web", "kube-system", ""] {
            let tagged = add_resync_suffix(key);
            assert!(is_resync_key(&tagged));
            assert_eq!(strip_resync_suffix(&tagged).unwrap(), key);
        }
    }

    #[test]
    fn test_strip_resync_suffix_missing() {
        assert_eq!(
            strip_resync_suffix("ns1/svcA~1"),
            Err(KeyError::MissingResyncSuffix {
                key: "ns1/svcA~1".to_string()
            })
        );
        assert!(!is_resync_key("ns1/svcA"));
    }
}
