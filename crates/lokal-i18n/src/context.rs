//! The explicitly constructed, explicitly injected i18n context.
//!
//! All process-wide state (load-state cache, translation table, pending
//! autoloads, active locale) lives here, owned by the application root and
//! passed into every component that needs it. The bundle index is built
//! before any load is attempted; there is no teardown, the context lives as
//! long as the process by design.

use crate::autoload::{AutoloadBatcher, DEFAULT_QUIET_PERIOD};
use crate::cache::LoadStateCache;
use crate::error::LoadResult;
use crate::fetcher::BundleFetcher;
use crate::index::{BundleHandle, BundleIndex};
use crate::loader::{BundleLoader, DEFAULT_FETCH_TIMEOUT};
use crate::locale::ActiveLocale;
use crate::table::TranslationTable;
use anyhow::Context as _;
use lokal_common::SupportedLocales;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Owns the full lazy-loading translation pipeline.
pub struct I18nContext {
    locales: SupportedLocales,
    cache: Arc<LoadStateCache>,
    table: Arc<TranslationTable>,
    loader: BundleLoader,
    batcher: Arc<AutoloadBatcher>,
    fetcher: Arc<dyn BundleFetcher>,
    active: ActiveLocale,
}

impl I18nContext {
    /// Wires the pipeline with default timings.
    pub fn new(
        locales: SupportedLocales,
        index: BundleIndex,
        fetcher: Arc<dyn BundleFetcher>,
    ) -> Self {
        Self::with_timings(
            locales,
            index,
            fetcher,
            DEFAULT_FETCH_TIMEOUT,
            DEFAULT_QUIET_PERIOD,
        )
    }

    /// Wires the pipeline with explicit fetch timeout and autoload quiet
    /// period.
    pub fn with_timings(
        locales: SupportedLocales,
        index: BundleIndex,
        fetcher: Arc<dyn BundleFetcher>,
        fetch_timeout: Duration,
        quiet_period: Duration,
    ) -> Self {
        let index = Arc::new(index);
        let cache = Arc::new(LoadStateCache::new());
        let table = Arc::new(TranslationTable::new(locales.default_locale()));
        let loader = BundleLoader::new(
            Arc::clone(&index),
            Arc::clone(&cache),
            Arc::clone(&table),
            Arc::clone(&fetcher),
        )
        .with_fetch_timeout(fetch_timeout);
        let batcher = AutoloadBatcher::with_quiet_period(
            loader.clone(),
            Arc::clone(&cache),
            quiet_period,
        );

        // The table holds its observer weakly; the context keeps the batcher
        // alive, so no reference cycle forms.
        let observer = Arc::downgrade(&batcher);
        table.on_missing(Arc::new(move |locale, full_key| {
            if let Some(batcher) = observer.upgrade() {
                batcher.note_miss(locale, full_key);
            }
        }));

        let active = ActiveLocale::new(locales.default_locale());
        info!(
            "I18nContext initialized with default locale '{}' and {} indexed bundles",
            locales.default_locale(),
            index.len()
        );

        Self {
            locales,
            cache,
            table,
            loader,
            batcher,
            fetcher,
            active,
        }
    }

    /// Eagerly fetches the locale-independent common bundles and merges them
    /// un-namespaced into their locale's table. Common strings are not lazy.
    pub async fn preload_common(&self, bundles: &[(String, BundleHandle)]) -> anyhow::Result<()> {
        for (locale, handle) in bundles {
            let entries = self
                .fetcher
                .fetch(handle)
                .await
                .with_context(|| format!("preloading common strings for '{locale}'"))?;
            self.table.merge_root(locale, entries);
        }
        info!("Preloaded {} common string bundles", bundles.len());
        Ok(())
    }

    /// Resolves a fully qualified key under the active locale.
    pub fn translate(&self, full_key: &str) -> String {
        self.table.translate(&self.active.get(), full_key)
    }

    /// Resolves a key and substitutes `{name}` placeholders.
    pub fn translate_with_args(&self, full_key: &str, args: &[(&str, &str)]) -> String {
        self.table
            .translate_with_args(&self.active.get(), full_key, args)
    }

    /// Loads a feature's bundle for the active locale.
    pub async fn load(&self, feature: &str) -> LoadResult<()> {
        self.loader.load(feature, &self.active.get()).await
    }

    /// Loads a feature's bundle for an explicit locale.
    pub async fn load_for(&self, feature: &str, locale: &str) -> LoadResult<()> {
        self.loader.load(feature, locale).await
    }

    /// The supported-locale set.
    pub fn locales(&self) -> &SupportedLocales {
        &self.locales
    }

    /// The live active-locale state.
    pub fn active_locale(&self) -> &ActiveLocale {
        &self.active
    }

    /// The load-state cache.
    pub fn cache(&self) -> &Arc<LoadStateCache> {
        &self.cache
    }

    /// The translation table.
    pub fn table(&self) -> &TranslationTable {
        &self.table
    }

    /// The bundle loader.
    pub fn loader(&self) -> &BundleLoader {
        &self.loader
    }

    /// The autoload batcher.
    pub fn batcher(&self) -> &Arc<AutoloadBatcher> {
        &self.batcher
    }
}

impl std::fmt::Debug for I18nContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("I18nContext")
            .field("default_locale", &self.locales.default_locale())
            .field("active_locale", &self.active.get())
            .finish_non_exhaustive()
    }
}
