//! Tests for core type definitions in the lokal-common crate.
//!
//! This test suite covers:
//! - `BundleKey` implementing the expected traits (Display, Hash, Serialize)
//! - Fully qualified key splitting
//! - Supported-locale set membership and client locale normalization

use std::collections::HashMap;
use lokal_common::{split_key, BundleKey, LanguageSpec, SupportedLocales};

#[test]
fn test_bundle_key_implements_expected_traits() {
    let key = BundleKey::new("example", "fr");

    // Test Debug
    let debug_str = format!("{:?}", key);
    assert!(debug_str.contains("example"));
    assert!(debug_str.contains("fr"));

    // Test Display: serialized identity is "feature-locale"
    assert_eq!(key.to_string(), "example-fr");

    // Test Clone, PartialEq and Eq
    let cloned = key.clone();
    assert_eq!(key, cloned);
    assert_ne!(key, BundleKey::new("example", "en"));
    assert_ne!(key, BundleKey::new("other", "fr"));

    // Test Hash - can be used in HashMap
    let mut map = HashMap::new();
    map.insert(key.clone(), "test_bundle");
    assert_eq!(map.get(&key), Some(&"test_bundle"));
}

#[test]
fn test_bundle_key_serialization() {
    let key = BundleKey::new("shared", "de");

    let serialized = serde_json::to_string(&key).unwrap();
    let deserialized: BundleKey = serde_json::from_str(&serialized).unwrap();
    assert_eq!(deserialized, key);
    assert_eq!(deserialized.feature(), "shared");
    assert_eq!(deserialized.locale(), "de");
}

#[test]
fn test_split_key_takes_first_dot_segment() {
    assert_eq!(split_key("example.greeting"), Some(("example", "greeting")));
    assert_eq!(
        split_key("example.greeting.formal"),
        Some(("example", "greeting.formal"))
    );
    assert_eq!(
        split_key("example/another.title"),
        Some(("example/another", "title"))
    );
    assert_eq!(split_key("nodot"), None);
}

#[test]
fn test_supported_locales_from_manifest_specs() {
    let specs = vec![
        LanguageSpec {
            code: "en".to_string(),
            name: "English".to_string(),
        },
        LanguageSpec {
            code: "fr".to_string(),
            name: "Français".to_string(),
        },
    ];

    let locales = SupportedLocales::from_specs(&specs, "en");
    assert_eq!(locales.default_locale(), "en");
    assert!(locales.is_supported("fr"));
    assert!(!locales.is_supported("es"));
    assert_eq!(locales.codes().len(), 2);
}

#[test]
fn test_client_locale_normalization_handles_garbage() {
    // A malformed tag still yields something comparable against the set
    let normalized = SupportedLocales::normalize_client_locale("EN_us!!");
    assert!(!normalized.is_empty());

    assert_eq!(SupportedLocales::normalize_client_locale("de-AT"), "de");
}
