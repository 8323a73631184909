//! Language manifest loaded from `languages.json`.

use anyhow::Context;
use lokal_common::{LanguageSpec, SupportedLocales};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_locale_code() -> String {
    "en".to_string()
}

/// The application's language manifest: the enumerable set of displayable
/// languages plus the default locale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageManifest {
    /// Displayable languages.
    pub languages: Vec<LanguageSpec>,
    /// Default locale; falls back to `"en"` when the manifest omits it.
    #[serde(default = "default_locale_code")]
    pub default: String,
}

impl LanguageManifest {
    /// Loads the manifest from a JSON file.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading language manifest {}", path.display()))?;
        let manifest: Self = serde_json::from_str(&raw)
            .with_context(|| format!("parsing language manifest {}", path.display()))?;
        Ok(manifest)
    }

    /// The supported-locale set this manifest describes.
    pub fn supported_locales(&self) -> SupportedLocales {
        SupportedLocales::from_specs(&self.languages, &self.default)
    }
}
