//! Navigation error types.

use thiserror::Error;

/// Errors surfaced by a navigation attempt.
#[derive(Error, Debug)]
pub enum NavigationError {
    /// A matched route's view loader failed, aborting the navigation.
    #[error("navigation to '{route}' aborted: {message}")]
    Aborted {
        /// Name of the route whose view failed to load.
        route: String,
        /// The underlying loader failure.
        message: String,
    },

    /// Redirect canonicalization failed to converge.
    #[error("redirect loop detected at '{url}'")]
    RedirectLoop {
        /// The URL at which the loop guard tripped.
        url: String,
    },
}
