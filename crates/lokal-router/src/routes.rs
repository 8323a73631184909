//! Route table, URL matching and the navigation loop.
//!
//! URLs have the shape `/:locale?/:section?` — an optional two-letter locale
//! prefix followed by at most one section segment. Deeper paths fall through
//! to a wildcard redirect that keeps a recognizable locale and drops the
//! rest.

use crate::error::NavigationError;
use crate::guard::{GuardOutcome, NavigationGuard};
use crate::resolver::is_locale_segment;
use futures::future::{try_join_all, BoxFuture};
use futures::FutureExt;
use lokal_common::SupportedLocales;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Upper bound on guard-driven rewrites for a single navigation. Canonical
/// rewrites converge in at most three hops; anything longer is a loop.
const MAX_REDIRECTS: usize = 8;

/// A lazily loaded view attached to a route.
pub type ViewLoader = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

/// How a route matches the section segment of a URL.
#[derive(Debug, Clone)]
pub enum SectionMatcher {
    /// Matches any section, including none.
    Optional,
    /// Matches exactly this section segment.
    Literal(String),
}

/// One entry of the route table.
pub struct Route {
    name: String,
    section: SectionMatcher,
    views: Vec<ViewLoader>,
}

impl Route {
    /// Creates a route.
    pub fn new(name: impl Into<String>, section: SectionMatcher) -> Self {
        Self {
            name: name.into(),
            section,
            views: Vec::new(),
        }
    }

    /// Attaches a view that is loaded when the route is navigated to.
    #[must_use]
    pub fn with_view<F, Fut>(mut self, load: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.views.push(Arc::new(move || load().boxed()));
        self
    }

    /// The route's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, section: Option<&str>) -> bool {
        match &self.section {
            SectionMatcher::Optional => true,
            SectionMatcher::Literal(expected) => section == Some(expected.as_str()),
        }
    }

    fn is_literal(&self) -> bool {
        matches!(self.section, SectionMatcher::Literal(_))
    }

    /// Awaits every view attached to this route.
    pub(crate) async fn load_views(&self) -> anyhow::Result<()> {
        try_join_all(self.views.iter().map(|load| load())).await?;
        Ok(())
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("section", &self.section)
            .field("views", &self.views.len())
            .finish()
    }
}

/// A URL matched against the route table.
#[derive(Debug)]
pub struct RouteMatch<'r> {
    /// The matched route.
    pub route: &'r Route,
    /// The path portion of the URL.
    pub path: String,
    /// Query string without the leading `?`.
    pub query: Option<String>,
    /// Fragment without the leading `#`.
    pub fragment: Option<String>,
    /// Locale-shaped first segment, if the path carried one.
    pub url_locale: Option<String>,
    /// The section segment, if any.
    pub section: Option<String>,
}

/// A completed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Name of the route that was entered.
    pub route: String,
    /// The canonical path that was entered.
    pub path: String,
    /// The locale the navigation committed.
    pub locale: String,
}

/// Route table plus the locale guard.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
    guard: NavigationGuard,
    locales: SupportedLocales,
}

impl Router {
    /// Creates a router over `routes`.
    pub fn new(routes: Vec<Route>, guard: NavigationGuard, locales: SupportedLocales) -> Self {
        Self {
            routes,
            guard,
            locales,
        }
    }

    /// Matches a URL against the route table. Literal sections outrank the
    /// optional catch-all regardless of table order. Paths deeper than
    /// `/:locale?/:section?` match nothing.
    pub fn match_url(&self, url: &str) -> Option<RouteMatch<'_>> {
        let (path, query, fragment) = split_url(url);
        let mut segments = path.split('/').filter(|segment| !segment.is_empty());

        let first = segments.next();
        let (url_locale, section) = match first {
            Some(segment) if is_locale_segment(segment) => (Some(segment), segments.next()),
            other => (None, other),
        };
        if segments.next().is_some() {
            return None;
        }

        let route = self
            .routes
            .iter()
            .find(|route| route.is_literal() && route.matches(section))
            .or_else(|| self.routes.iter().find(|route| route.matches(section)))?;

        Some(RouteMatch {
            route,
            path: path.to_string(),
            query: query.map(str::to_string),
            fragment: fragment.map(str::to_string),
            url_locale: url_locale.map(str::to_string),
            section: section.map(str::to_string),
        })
    }

    /// Target for URLs no route matches: the root of the URL's recognizable
    /// locale, or of the default locale.
    pub fn fallback_redirect(&self, url: &str) -> String {
        let (path, _, _) = split_url(url);
        let locale = path
            .split('/')
            .find(|segment| !segment.is_empty())
            .filter(|segment| self.locales.is_supported(segment))
            .unwrap_or_else(|| self.locales.default_locale());
        format!("/{locale}")
    }

    /// Navigates to `url`, following guard redirects and the wildcard
    /// fallback until a route is entered.
    pub async fn navigate(&self, url: &str) -> Result<Navigation, NavigationError> {
        let mut current = url.to_string();
        for _ in 0..MAX_REDIRECTS {
            let Some(matched) = self.match_url(&current) else {
                let target = self.fallback_redirect(&current);
                debug!("No route for {}, normalizing to {}", current, target);
                current = target;
                continue;
            };
            match self.guard.before_each(&matched).await? {
                GuardOutcome::Redirect { path } => {
                    debug!("Replacing {} with {}", current, path);
                    current = path;
                }
                GuardOutcome::Proceed { locale } => {
                    return Ok(Navigation {
                        route: matched.route.name().to_string(),
                        path: matched.path,
                        locale,
                    });
                }
            }
        }
        Err(NavigationError::RedirectLoop { url: current })
    }

    /// The guard applied to every navigation.
    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }
}

fn split_url(url: &str) -> (&str, Option<&str>, Option<&str>) {
    let (rest, fragment) = match url.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (url, None),
    };
    let (path, query) = match rest.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (rest, None),
    };
    (path, query, fragment)
}
