//! Bundle loading with de-duplication and cooperative cancellation.
//!
//! One loader drives every bundle load in the process. A load consults the
//! load-state cache, joins any operation already in flight for the same key,
//! and otherwise fetches, merges into the translation table and records the
//! outcome. Failures in one feature's bundle never abort unrelated work.

use crate::cache::{InFlight, LoadState, LoadStateCache};
use crate::error::{LoadError, LoadResult};
use crate::fetcher::BundleFetcher;
use crate::index::BundleIndex;
use crate::table::TranslationTable;
use futures::FutureExt;
use lokal_common::BundleKey;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

/// Upper bound on one fetch; an elapsed timeout is recorded as an error so
/// de-duplicated callers are not held on a stuck key forever.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Drives bundle loads against the cache, index, table and fetcher.
///
/// Cloning is cheap; all clones share the same state.
#[derive(Clone)]
pub struct BundleLoader {
    index: Arc<BundleIndex>,
    cache: Arc<LoadStateCache>,
    table: Arc<TranslationTable>,
    fetcher: Arc<dyn BundleFetcher>,
    fetch_timeout: Duration,
}

impl BundleLoader {
    /// Creates a loader with the default fetch timeout.
    pub fn new(
        index: Arc<BundleIndex>,
        cache: Arc<LoadStateCache>,
        table: Arc<TranslationTable>,
        fetcher: Arc<dyn BundleFetcher>,
    ) -> Self {
        Self {
            index,
            cache,
            table,
            fetcher,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Overrides the fetch timeout.
    #[must_use]
    pub fn with_fetch_timeout(mut self, fetch_timeout: Duration) -> Self {
        self.fetch_timeout = fetch_timeout;
        self
    }

    /// Loads one bundle with a token that is never cancelled.
    pub async fn load(&self, feature: &str, locale: &str) -> LoadResult<()> {
        self.load_with_token(feature, locale, &CancellationToken::new())
            .await
    }

    /// Loads one bundle, de-duplicating against concurrent callers.
    ///
    /// - `Loaded` returns success without a fetch (idempotent no-op).
    /// - `Pending` joins the existing in-flight operation.
    /// - `Missing` and `Error` short-circuit with the recorded outcome; only
    ///   an explicit [`reload`](Self::reload) re-runs the fetch.
    /// - Otherwise the key is atomically marked pending and the fetch runs
    ///   on a detached task, so it settles even if `caller` walks away.
    ///
    /// Cancelling `caller` detaches this caller only; the operation itself
    /// is cancelled when its last waiter detaches, and a cancelled operation
    /// commits nothing to the cache or the table.
    pub async fn load_with_token(
        &self,
        feature: &str,
        locale: &str,
        caller: &CancellationToken,
    ) -> LoadResult<()> {
        let key = BundleKey::new(feature, locale);
        let op_token = CancellationToken::new();
        let operation = {
            let loader = self.clone();
            let key = key.clone();
            let op_token = op_token.clone();
            async move { loader.run_load(key, op_token).await }.boxed()
        };
        let inflight = InFlight::new(key.clone(), op_token, operation);

        // `begin` registered this caller as a waiter on whichever pending
        // operation it returns, so both paths settle via `join_registered`.
        match self.cache.begin(&key, inflight.clone()) {
            None => {
                tokio::spawn(inflight.driver());
                inflight.join_registered(caller).await
            }
            Some(LoadState::Loaded) => Ok(()),
            Some(LoadState::Missing) => Err(LoadError::NotFound(key)),
            Some(LoadState::Error(message)) => Err(LoadError::Fetch { key, message }),
            Some(LoadState::Pending(existing)) => existing.join_registered(caller).await,
        }
    }

    /// Invalidates the key's recorded state and loads again. Previously
    /// merged table entries survive until the new merge overwrites them.
    pub async fn reload(&self, feature: &str, locale: &str) -> LoadResult<()> {
        self.cache.clear(&BundleKey::new(feature, locale));
        self.load(feature, locale).await
    }

    async fn run_load(self, key: BundleKey, op_token: CancellationToken) -> LoadResult<()> {
        if op_token.is_cancelled() {
            self.cache.clear(&key);
            return Err(LoadError::Cancelled(key));
        }

        let Some(handle) = self.index.handle(&key).cloned() else {
            warn!("Translation bundle not found: {}", key);
            self.cache.set(key.clone(), LoadState::Missing);
            return Err(LoadError::NotFound(key));
        };

        let fetched = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch(&handle)).await;

        // Resumption point: a superseded operation must not touch the cache
        // or the table. Its effects are suppressed, never rolled back.
        if op_token.is_cancelled() {
            self.cache.clear(&key);
            return Err(LoadError::Cancelled(key));
        }

        match fetched {
            Ok(Ok(entries)) => {
                self.table.merge(key.locale(), key.feature(), entries);
                self.cache.set(key.clone(), LoadState::Loaded);
                debug!("Loaded translation bundle {}", key);
                Ok(())
            }
            Ok(Err(source)) => {
                let message = source.to_string();
                error!("Failed loading {}: {}", key, message);
                self.cache.set(key.clone(), LoadState::Error(message.clone()));
                Err(LoadError::Fetch { key, message })
            }
            Err(_elapsed) => {
                let message = format!("fetch timed out after {:?}", self.fetch_timeout);
                error!("Failed loading {}: {}", key, message);
                self.cache.set(key.clone(), LoadState::Error(message.clone()));
                Err(LoadError::Fetch { key, message })
            }
        }
    }
}

impl std::fmt::Debug for BundleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleLoader")
            .field("fetch_timeout", &self.fetch_timeout)
            .finish_non_exhaustive()
    }
}
