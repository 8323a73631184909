//! Process-wide translation table with default-locale fallback.
//!
//! All mutation goes through a successful load's merge step; lookups never
//! write. Misses are reported to registered missing-key observers, which is
//! how the autoload batcher discovers bundles nobody asked to load yet.

use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Observer invoked with `(locale, full_key)` when a key is absent in both
/// the requested and the default locale table.
pub type MissingKeyHandler = dyn Fn(&str, &str) + Send + Sync;

/// Mapping from locale to fully qualified key to localized text.
pub struct TranslationTable {
    messages: DashMap<String, HashMap<String, String>>,
    default_locale: String,
    missing_handlers: RwLock<Vec<Arc<MissingKeyHandler>>>,
}

impl TranslationTable {
    /// Creates an empty table falling back to `default_locale`.
    pub fn new(default_locale: impl Into<String>) -> Self {
        Self {
            messages: DashMap::new(),
            default_locale: default_locale.into(),
            missing_handlers: RwLock::new(Vec::new()),
        }
    }

    /// Merges a fetched bundle under the feature namespace: every entry is
    /// addressed as `feature.key` afterwards. Additive union, last merge
    /// wins on key collision; entries are never deleted.
    pub fn merge(&self, locale: &str, feature: &str, entries: HashMap<String, String>) {
        let mut table = self.messages.entry(locale.to_string()).or_default();
        for (key, text) in entries {
            table.insert(format!("{feature}.{key}"), text);
        }
    }

    /// Merges locale-independent common strings without a feature
    /// namespace. Used for the eager startup bundles.
    pub fn merge_root(&self, locale: &str, entries: HashMap<String, String>) {
        let mut table = self.messages.entry(locale.to_string()).or_default();
        table.extend(entries);
    }

    /// Exact lookup in one locale's table.
    pub fn get(&self, locale: &str, full_key: &str) -> Option<String> {
        self.messages.get(locale)?.get(full_key).cloned()
    }

    /// Resolves a key under `locale`, falling back to the default locale.
    /// A key absent in both tables notifies the missing-key observers and
    /// echoes the key itself.
    pub fn translate(&self, locale: &str, full_key: &str) -> String {
        if let Some(text) = self.get(locale, full_key) {
            return text;
        }
        if locale != self.default_locale {
            if let Some(text) = self.get(&self.default_locale, full_key) {
                return text;
            }
        }
        self.notify_missing(locale, full_key);
        full_key.to_string()
    }

    /// Like [`translate`](Self::translate), then substitutes `{name}`
    /// placeholders from `args`.
    pub fn translate_with_args(&self, locale: &str, full_key: &str, args: &[(&str, &str)]) -> String {
        let mut text = self.translate(locale, full_key);
        for (name, value) in args {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }

    /// Registers a missing-key observer.
    pub fn on_missing(&self, handler: Arc<MissingKeyHandler>) {
        self.missing_handlers.write().push(handler);
    }

    /// The locale used for fallback lookups.
    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    fn notify_missing(&self, locale: &str, full_key: &str) {
        for handler in self.missing_handlers.read().iter() {
            handler(locale, full_key);
        }
    }
}

impl std::fmt::Debug for TranslationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranslationTable")
            .field("default_locale", &self.default_locale)
            .field("locales", &self.messages.len())
            .finish_non_exhaustive()
    }
}
