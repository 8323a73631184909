//! # Lokal I18n
//!
//! Lazy-loading internationalization engine for the lokal workspace.
//!
//! Translation text is split into independently addressable bundles, one per
//! `(feature, locale)` pair. Bundles are fetched on demand, de-duplicated
//! against concurrent requests, and merged into a process-wide translation
//! table. This crate includes:
//!
//! - A static bundle index built once at startup
//! - Load-state caching with in-flight de-duplication and cancellation
//! - A missing-key autoload batcher with a fixed quiet period
//! - Per-consumer feature translation handles
//! - Fallback to the default locale for unloaded keys
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use lokal_common::SupportedLocales;
//! use lokal_i18n::{BundleIndex, I18nContext, JsonFileFetcher};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let locales = SupportedLocales::new(["en", "fr"], "en");
//! let index = BundleIndex::scan("src/features".as_ref())?;
//! let ctx = Arc::new(I18nContext::new(locales, index, Arc::new(JsonFileFetcher)));
//!
//! ctx.load("example").await?;
//! println!("{}", ctx.translate("example.greeting"));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod autoload;
pub mod cache;
pub mod context;
pub mod error;
pub mod feature;
pub mod fetcher;
pub mod index;
pub mod loader;
pub mod locale;
pub mod manifest;
pub mod table;

pub use autoload::AutoloadBatcher;
pub use cache::{InFlight, LoadState, LoadStateCache};
pub use context::I18nContext;
pub use error::{LoadError, LoadResult};
pub use feature::FeatureTranslations;
pub use fetcher::{BundleFetcher, JsonFileFetcher};
pub use index::{scan_common_bundles, BundleHandle, BundleIndex};
pub use loader::BundleLoader;
pub use locale::ActiveLocale;
pub use manifest::LanguageManifest;
pub use table::{MissingKeyHandler, TranslationTable};
