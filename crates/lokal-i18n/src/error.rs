//! Error types for bundle loading operations.

use lokal_common::BundleKey;
use thiserror::Error;

/// Errors produced by the bundle load pipeline.
///
/// None of these are fatal: a `NotFound` is an expected outcome for optional
/// locale variants, a `Fetch` failure leaves the key untranslated until an
/// explicit reload, and a `Cancelled` load simply had its result discarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// No bundle exists for the requested feature and locale.
    #[error("no bundle available for {0}")]
    NotFound(BundleKey),

    /// The fetch collaborator failed for a reason other than cancellation.
    #[error("bundle fetch failed for {key}: {message}")]
    Fetch {
        /// The bundle the fetch was addressing.
        key: BundleKey,
        /// The collaborator's failure, flattened for caching.
        message: String,
    },

    /// The load was superseded by a newer request and its result discarded.
    #[error("bundle load cancelled for {0}")]
    Cancelled(BundleKey),
}

/// Result type for bundle load operations.
pub type LoadResult<T> = Result<T, LoadError>;
