//! Per-consumer handle for one feature's translations.
//!
//! Each UI consumer holds its own handle: it kicks off the initial load,
//! re-loads whenever the active locale changes, and exposes a live loading
//! flag. The handle owns only its own cancellation — tearing it down never
//! cancels a cache-level operation another consumer may still be awaiting.

use crate::context::I18nContext;
use crate::error::LoadResult;
use lokal_common::BundleKey;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Translation accessor scoped to one feature namespace.
pub struct FeatureTranslations {
    feature: String,
    ctx: Arc<I18nContext>,
    is_loading: Arc<AtomicBool>,
    invocation: Arc<Mutex<CancellationToken>>,
    generation: Arc<AtomicU64>,
    watcher: JoinHandle<()>,
}

impl FeatureTranslations {
    /// Creates the handle, starts the initial load for the active locale and
    /// spawns a watcher that re-loads on every locale change.
    pub fn new(ctx: Arc<I18nContext>, feature: impl Into<String>) -> Self {
        let feature = feature.into();
        let is_loading = Arc::new(AtomicBool::new(false));
        let invocation = Arc::new(Mutex::new(CancellationToken::new()));
        let generation = Arc::new(AtomicU64::new(0));

        Self::spawn_load(
            &ctx,
            &feature,
            &is_loading,
            &invocation,
            &generation,
            ctx.active_locale().get(),
        );

        let watcher = {
            let ctx = Arc::clone(&ctx);
            let feature = feature.clone();
            let is_loading = Arc::clone(&is_loading);
            let invocation = Arc::clone(&invocation);
            let generation = Arc::clone(&generation);
            let mut changes = ctx.active_locale().subscribe();
            tokio::spawn(async move {
                while changes.changed().await.is_ok() {
                    let locale = changes.borrow_and_update().clone();
                    Self::spawn_load(&ctx, &feature, &is_loading, &invocation, &generation, locale);
                }
            })
        };

        Self {
            feature,
            ctx,
            is_loading,
            invocation,
            generation,
            watcher,
        }
    }

    /// Looks up `key` inside this feature's namespace under the active
    /// locale.
    pub fn lookup(&self, key: &str) -> String {
        self.ctx.translate(&format!("{}.{}", self.feature, key))
    }

    /// Looks up `key` and substitutes `{name}` placeholders.
    pub fn lookup_with_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        self.ctx
            .translate_with_args(&format!("{}.{}", self.feature, key), args)
    }

    /// Whether a load for this consumer is currently in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading.load(Ordering::SeqCst)
    }

    /// Invalidates this feature's cache entry for the active locale and
    /// re-runs the load.
    pub async fn reload(&self) -> LoadResult<()> {
        let locale = self.ctx.active_locale().get();
        self.ctx
            .cache()
            .clear(&BundleKey::new(&self.feature, &locale));

        let (token, generation) =
            Self::begin_invocation(&self.invocation, &self.generation, &self.is_loading);
        let result = self
            .ctx
            .loader()
            .load_with_token(&self.feature, &locale, &token)
            .await;
        Self::finish_invocation(
            &self.invocation,
            &self.generation,
            &self.is_loading,
            generation,
        );
        result
    }

    /// The feature namespace this handle serves.
    pub fn feature(&self) -> &str {
        &self.feature
    }

    /// Cancels the previous invocation, installs a fresh token and raises
    /// the loading flag. Token, generation and flag move together under the
    /// invocation lock.
    fn begin_invocation(
        invocation: &Arc<Mutex<CancellationToken>>,
        generation: &Arc<AtomicU64>,
        is_loading: &Arc<AtomicBool>,
    ) -> (CancellationToken, u64) {
        let token = CancellationToken::new();
        let mut slot = invocation.lock();
        slot.cancel();
        *slot = token.clone();
        let current = generation.fetch_add(1, Ordering::SeqCst) + 1;
        is_loading.store(true, Ordering::SeqCst);
        (token, current)
    }

    /// Lowers the loading flag, but only when this invocation is still the
    /// newest one. A superseded invocation settling late must not clear the
    /// flag while its successor's load is in flight.
    fn finish_invocation(
        invocation: &Arc<Mutex<CancellationToken>>,
        generation: &Arc<AtomicU64>,
        is_loading: &Arc<AtomicBool>,
        completed: u64,
    ) {
        let _slot = invocation.lock();
        if generation.load(Ordering::SeqCst) == completed {
            is_loading.store(false, Ordering::SeqCst);
        }
    }

    fn spawn_load(
        ctx: &Arc<I18nContext>,
        feature: &str,
        is_loading: &Arc<AtomicBool>,
        invocation: &Arc<Mutex<CancellationToken>>,
        generation: &Arc<AtomicU64>,
        locale: String,
    ) {
        let (token, started) = Self::begin_invocation(invocation, generation, is_loading);

        let ctx = Arc::clone(ctx);
        let feature = feature.to_string();
        let is_loading = Arc::clone(is_loading);
        let invocation = Arc::clone(invocation);
        let generation = Arc::clone(generation);
        tokio::spawn(async move {
            if let Err(error) = ctx
                .loader()
                .load_with_token(&feature, &locale, &token)
                .await
            {
                // Fetch failures are logged by the loader; a cancelled or
                // missing load is not an error for this consumer.
                debug!("Feature load for {}-{} settled: {}", feature, locale, error);
            }
            Self::finish_invocation(&invocation, &generation, &is_loading, started);
        });
    }
}

impl Drop for FeatureTranslations {
    fn drop(&mut self) {
        self.invocation.lock().cancel();
        self.watcher.abort();
    }
}

impl std::fmt::Debug for FeatureTranslations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureTranslations")
            .field("feature", &self.feature)
            .field("is_loading", &self.is_loading())
            .finish_non_exhaustive()
    }
}
