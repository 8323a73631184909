//! Application assembly.
//!
//! The assets directory follows a fixed convention:
//!
//! ```text
//! <root>/languages.json                              language manifest
//! <root>/locales/<locale>.json                       common strings, eager
//! <root>/features/<feature>/locales/<locale>.json    feature bundles, lazy
//! ```

use anyhow::Context;
use lokal_i18n::{
    scan_common_bundles, BundleIndex, FeatureTranslations, I18nContext, JsonFileFetcher,
    LanguageManifest,
};
use lokal_router::{
    Navigation, NavigationError, NavigationGuard, PreferenceStore, Route, Router, SectionMatcher,
};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// The assembled application: translation context plus locale-aware router.
#[derive(Debug)]
pub struct App {
    ctx: Arc<I18nContext>,
    router: Router,
}

impl App {
    /// Builds the application from an assets directory.
    ///
    /// Scans the bundle index, preloads common strings for every locale and
    /// wires the navigation guard over `store`. `client_locale` is the
    /// visitor-reported language tag, e.g. the `LANG` environment value or
    /// an `Accept-Language` entry.
    pub async fn bootstrap(
        assets_root: &Path,
        client_locale: &str,
        store: Arc<dyn PreferenceStore>,
    ) -> anyhow::Result<Self> {
        let manifest = LanguageManifest::from_path(&assets_root.join("languages.json"))?;
        let locales = manifest.supported_locales();
        info!(
            "Bootstrapping with {} languages, default '{}'",
            manifest.languages.len(),
            locales.default_locale()
        );

        let index = BundleIndex::scan(&assets_root.join("features"))
            .context("scanning feature bundles")?;
        let ctx = Arc::new(I18nContext::new(
            locales.clone(),
            index,
            Arc::new(JsonFileFetcher),
        ));

        let common = scan_common_bundles(&assets_root.join("locales"))
            .context("scanning common string bundles")?;
        ctx.preload_common(&common).await?;

        let guard = NavigationGuard::new(
            locales.clone(),
            ctx.active_locale().clone(),
            store,
            client_locale,
        );
        let router = Router::new(Self::routes(&ctx), guard, locales);

        Ok(Self { ctx, router })
    }

    /// The route table: a literal example page whose view lazily loads the
    /// `example` feature bundle, and a catch-all section page.
    fn routes(ctx: &Arc<I18nContext>) -> Vec<Route> {
        let example = {
            let ctx = Arc::clone(ctx);
            Route::new(
                "i18n-example",
                SectionMatcher::Literal("i18nexample".to_string()),
            )
            .with_view(move || {
                let ctx = Arc::clone(&ctx);
                async move {
                    ctx.load("example").await?;
                    Ok(())
                }
            })
        };
        vec![example, Route::new("portfolio-section", SectionMatcher::Optional)]
    }

    /// Navigates to a URL, committing the resolved locale on success.
    pub async fn navigate(&self, url: &str) -> Result<Navigation, NavigationError> {
        self.router.navigate(url).await
    }

    /// Creates a per-consumer translation handle for one feature.
    pub fn translations(&self, feature: &str) -> FeatureTranslations {
        FeatureTranslations::new(Arc::clone(&self.ctx), feature)
    }

    /// The shared translation context.
    pub fn context(&self) -> &Arc<I18nContext> {
        &self.ctx
    }

    /// The locale-aware router.
    pub fn router(&self) -> &Router {
        &self.router
    }
}
