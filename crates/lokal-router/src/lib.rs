//! Locale-aware routing for lokal.
//!
//! This crate turns a raw URL into a navigation: it resolves the canonical
//! locale for a request (URL segment, persisted preference, client language,
//! default — in that order), canonicalizes the URL so the default locale
//! never carries a prefix, persists the choice, and only then awaits the
//! matched route's lazily loaded views.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod guard;
pub mod resolver;
pub mod routes;
pub mod store;

pub use error::NavigationError;
pub use guard::{GuardOutcome, NavigationGuard};
pub use resolver::{
    decide, is_locale_segment, resolve_locale, strip_locale_prefix, NavigationDecision,
    NavigationRequest,
};
pub use routes::{Navigation, Route, RouteMatch, Router, SectionMatcher, ViewLoader};
pub use store::{FileStore, MemoryStore, PreferenceStore, PREFERRED_LOCALE_KEY};
