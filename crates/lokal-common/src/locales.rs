//! Supported-locale set and client locale normalization.

use serde::{Deserialize, Serialize};
use unic_langid::LanguageIdentifier;

/// One entry of the language manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageSpec {
    /// Short locale code, e.g. `"en"`.
    pub code: String,
    /// Human-readable display name, e.g. `"English"`.
    pub name: String,
}

/// The fixed set of locales the application can display, plus the default
/// locale used for fallback and URL canonicalization.
#[derive(Debug, Clone)]
pub struct SupportedLocales {
    codes: Vec<String>,
    default_locale: String,
}

impl SupportedLocales {
    /// Creates a supported-locale set. The default locale is always part of
    /// the set, whether or not it is listed in `codes`.
    pub fn new<I, S>(codes: I, default_locale: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let default_locale = default_locale.into();
        let mut codes: Vec<String> = codes.into_iter().map(Into::into).collect();
        if !codes.iter().any(|code| code == &default_locale) {
            codes.push(default_locale.clone());
        }
        Self {
            codes,
            default_locale,
        }
    }

    /// Builds the set from manifest entries.
    pub fn from_specs(specs: &[LanguageSpec], default_locale: &str) -> Self {
        Self::new(specs.iter().map(|spec| spec.code.clone()), default_locale)
    }

    /// Whether `code` is one of the displayable locales.
    pub fn is_supported(&self, code: &str) -> bool {
        self.codes.iter().any(|supported| supported == code)
    }

    /// The default locale.
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// All supported locale codes.
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Reduces a browser-reported tag like `"en-US"` to its language
    /// subtag. Unparseable input falls back to the text before the first
    /// `-`, lowercased.
    pub fn normalize_client_locale(raw: &str) -> String {
        raw.parse::<LanguageIdentifier>().map_or_else(
            |_| {
                raw.split('-')
                    .next()
                    .unwrap_or(raw)
                    .to_ascii_lowercase()
            },
            |id| id.language.as_str().to_string(),
        )
    }
}
