// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `key_errors.rs`

#[cfg(test)]
mod tests {
    use super::super::KeyError;

    #[test]
    fn test_encoding_error_display() {
        let err = KeyError::Encoding {
            kind: "Service".to_string(),
            reason: "metadata.name is missing".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "Cannot derive queue key for Service object: metadata.name is missing"
        );
    }

    #[test]
    fn test_unsupported_kind_display() {
        let err = KeyError::UnsupportedKind {
            kind: "Pod".to_string(),
            api_version: "v1".to_string(),
        };

        assert_eq!(
            err.to_string(),
            "Unsupported resource kind 'Pod' (apiVersion 'v1')"
        );
    }

    #[test]
    fn test_malformed_key_display() {
        let err = KeyError::MalformedKey {
            key: "a/b/c".to_string(),
            reason: "unexpected key format".to_string(),
        };

        assert!(err.to_string().contains("a/b/c"));
        assert!(err.to_string().contains("unexpected key format"));
    }

    #[test]
    fn test_error_type_labels_are_distinct() {
        let errors = [
            KeyError::Encoding {
                kind: String::new(),
                reason: String::new(),
            },
            KeyError::UnsupportedKind {
                kind: String::new(),
                api_version: String::new(),
            },
            KeyError::MalformedKey {
                key: String::new(),
                reason: String::new(),
            },
            KeyError::MissingResyncSuffix { key: String::new() },
            KeyError::InvalidFlag {
                flag: String::new(),
                reason: String::new(),
            },
        ];

        let mut labels: Vec<&str> = errors.iter().map(KeyError::error_type).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), errors.len());
    }

    #[test]
    fn test_only_decoding_errors_are_poison() {
        assert!(KeyError::MalformedKey {
            key: "x".to_string(),
            reason: "y".to_string(),
        }
        .is_poison());
        assert!(KeyError::MissingResyncSuffix {
            key: "ns/a".to_string()
        }
        .is_poison());

        assert!(!KeyError::Encoding {
            kind: "Service".to_string(),
            reason: "no name".to_string(),
        }
        .is_poison());
        assert!(!KeyError::UnsupportedKind {
            kind: "Pod".to_string(),
            api_version: "v1".to_string(),
        }
        .is_poison());
    }
}
