//! Pure locale resolution and URL canonicalization.
//!
//! Resolution order for the canonical locale: a supported URL prefix wins,
//! then the persisted preference, then the normalized client language, then
//! the default. The canonical URL shape carries a `/xx` prefix for every
//! locale except the default, which always lives at the bare path.

use lokal_common::SupportedLocales;

/// Everything the resolver needs to know about one navigation.
#[derive(Debug, Clone)]
pub struct NavigationRequest<'a> {
    /// Path portion of the URL, starting with `/`.
    pub path: &'a str,
    /// Query string without the leading `?`, if present.
    pub query: Option<&'a str>,
    /// Fragment without the leading `#`, if present.
    pub fragment: Option<&'a str>,
    /// Locale-shaped first path segment, not yet validated.
    pub url_locale: Option<&'a str>,
    /// The persisted preference, possibly absent or stale.
    pub persisted_locale: Option<&'a str>,
    /// The client-reported language tag, e.g. `"en-US"`.
    pub client_locale: &'a str,
}

/// Outcome of the redirect decision for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Replace the current URL and re-enter navigation.
    Redirect {
        /// Target URL with query and fragment preserved.
        path: String,
    },
    /// The URL is already canonical; proceed under this locale.
    Proceed {
        /// The resolved canonical locale.
        locale: String,
    },
}

/// Resolves the canonical locale for a request.
///
/// The first supported candidate wins: URL prefix, persisted preference,
/// normalized client language, default.
pub fn resolve_locale(request: &NavigationRequest<'_>, locales: &SupportedLocales) -> String {
    let client = SupportedLocales::normalize_client_locale(request.client_locale);
    let resolved = [
        request.url_locale,
        request.persisted_locale,
        Some(client.as_str()),
    ]
    .into_iter()
    .flatten()
    .find(|candidate| locales.is_supported(candidate))
    .map_or_else(|| locales.default_locale().to_string(), str::to_string);
    resolved
}

/// Decides whether the navigation proceeds or the URL must be rewritten.
///
/// A redirect is issued when the URL carries an unsupported locale segment,
/// lacks the prefix a non-default locale requires, or carries a redundant
/// prefix for the default locale. Rewrites that only differ by a trailing
/// slash proceed instead, so canonicalization can never oscillate.
pub fn decide(request: &NavigationRequest<'_>, locales: &SupportedLocales) -> NavigationDecision {
    let target = resolve_locale(request, locales);
    let default = locales.default_locale();

    let invalid_prefix = request
        .url_locale
        .is_some_and(|code| !locales.is_supported(code));
    let missing_prefix = target != default && request.url_locale != Some(target.as_str());
    let redundant_prefix = target == default && request.url_locale.is_some();

    if !(invalid_prefix || missing_prefix || redundant_prefix) {
        return NavigationDecision::Proceed { locale: target };
    }

    let base = strip_locale_prefix(request.path);
    let rewritten = if target == default {
        base
    } else if base == "/" {
        format!("/{target}")
    } else {
        format!("/{target}{base}")
    };

    // Loop guard: never redirect to a path equal modulo trailing slash
    if trimmed(&rewritten) == trimmed(request.path) {
        return NavigationDecision::Proceed { locale: target };
    }

    NavigationDecision::Redirect {
        path: with_suffix(rewritten, request),
    }
}

/// Removes a locale-shaped first segment from `path`, keeping the rest.
pub fn strip_locale_prefix(path: &str) -> String {
    let rest = path.strip_prefix('/').unwrap_or(path);
    let (first, tail) = match rest.split_once('/') {
        Some((first, tail)) => (first, Some(tail)),
        None => (rest, None),
    };
    if !is_locale_segment(first) {
        return path.to_string();
    }
    match tail {
        Some(tail) if !tail.is_empty() => format!("/{tail}"),
        _ => "/".to_string(),
    }
}

/// Whether a path segment has the shape of a locale prefix: exactly two
/// ASCII lowercase letters.
pub fn is_locale_segment(segment: &str) -> bool {
    segment.len() == 2 && segment.bytes().all(|b| b.is_ascii_lowercase())
}

fn trimmed(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn with_suffix(path: String, request: &NavigationRequest<'_>) -> String {
    let mut url = path;
    if let Some(query) = request.query {
        url.push('?');
        url.push_str(query);
    }
    if let Some(fragment) = request.fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}
