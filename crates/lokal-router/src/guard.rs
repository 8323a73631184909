//! The per-navigation locale guard.
//!
//! Runs before every navigation: it resolves the canonical locale, redirects
//! when the URL shape disagrees, and on a proceeding navigation commits the
//! locale (active state and persisted preference) strictly before the matched
//! route's views are awaited, so view code always observes the final locale.

use crate::error::NavigationError;
use crate::resolver::{decide, NavigationDecision, NavigationRequest};
use crate::routes::RouteMatch;
use crate::store::{PreferenceStore, PREFERRED_LOCALE_KEY};
use lokal_common::SupportedLocales;
use lokal_i18n::ActiveLocale;
use std::sync::Arc;
use tracing::{debug, error};

/// What the guard decided for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Replace the URL and navigate again.
    Redirect {
        /// Target URL.
        path: String,
    },
    /// Views are loaded; the navigation may complete.
    Proceed {
        /// The locale committed for this navigation.
        locale: String,
    },
}

/// Locale resolution guard applied to every route match.
pub struct NavigationGuard {
    locales: SupportedLocales,
    active: ActiveLocale,
    store: Arc<dyn PreferenceStore>,
    client_locale: String,
}

impl NavigationGuard {
    /// Creates the guard.
    pub fn new(
        locales: SupportedLocales,
        active: ActiveLocale,
        store: Arc<dyn PreferenceStore>,
        client_locale: impl Into<String>,
    ) -> Self {
        Self {
            locales,
            active,
            store,
            client_locale: client_locale.into(),
        }
    }

    /// Runs the guard for one matched route.
    ///
    /// On a proceeding navigation the active locale and the persisted
    /// preference are updated before any view loader is polled. A failing
    /// view loader aborts the navigation.
    pub async fn before_each(&self, matched: &RouteMatch<'_>) -> Result<GuardOutcome, NavigationError> {
        let persisted = self.store.get(PREFERRED_LOCALE_KEY);
        let request = NavigationRequest {
            path: &matched.path,
            query: matched.query.as_deref(),
            fragment: matched.fragment.as_deref(),
            url_locale: matched.url_locale.as_deref(),
            persisted_locale: persisted.as_deref(),
            client_locale: &self.client_locale,
        };

        match decide(&request, &self.locales) {
            NavigationDecision::Redirect { path } => {
                debug!("Rewriting {} to {}", matched.path, path);
                Ok(GuardOutcome::Redirect { path })
            }
            NavigationDecision::Proceed { locale } => {
                if self.active.set(&locale) {
                    debug!("Active locale switched to {}", locale);
                }
                if persisted.as_deref() != Some(locale.as_str()) {
                    self.store.set(PREFERRED_LOCALE_KEY, &locale);
                }

                if let Err(cause) = matched.route.load_views().await {
                    error!(
                        "View load for route '{}' failed: {}",
                        matched.route.name(),
                        cause
                    );
                    return Err(NavigationError::Aborted {
                        route: matched.route.name().to_string(),
                        message: cause.to_string(),
                    });
                }
                Ok(GuardOutcome::Proceed { locale })
            }
        }
    }

    /// The live active-locale state this guard writes to.
    pub fn active_locale(&self) -> &ActiveLocale {
        &self.active
    }
}

impl std::fmt::Debug for NavigationGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationGuard")
            .field("locales", &self.locales)
            .field("client_locale", &self.client_locale)
            .finish_non_exhaustive()
    }
}
