//! Common type definitions and newtype wrappers for domain modeling.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one lazily loadable translation bundle.
///
/// Two requests with an equal `BundleKey` are the same logical unit of work:
/// the key is the identity used for cache lookups and for in-flight
/// de-duplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BundleKey {
    feature: String,
    locale: String,
}

impl BundleKey {
    /// Creates a key for the given feature and locale.
    pub fn new(feature: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            feature: feature.into(),
            locale: locale.into(),
        }
    }

    /// The feature namespace this bundle belongs to.
    pub fn feature(&self) -> &str {
        &self.feature
    }

    /// The locale this bundle translates into.
    pub fn locale(&self) -> &str {
        &self.locale
    }
}

impl fmt::Display for BundleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.feature, self.locale)
    }
}

/// Splits a fully qualified translation key into its feature namespace and
/// local key, e.g. `"example/another.greeting"` into
/// `("example/another", "greeting")`.
///
/// Returns `None` for keys without a namespace separator.
pub fn split_key(full_key: &str) -> Option<(&str, &str)> {
    full_key.split_once('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_key_displays_as_feature_dash_locale() {
        let key = BundleKey::new("example", "fr");
        assert_eq!(key.to_string(), "example-fr");
    }

    #[test]
    fn split_key_handles_nested_features() {
        assert_eq!(
            split_key("example/another.greeting"),
            Some(("example/another", "greeting"))
        );
        assert_eq!(split_key("plain"), None);
    }
}
