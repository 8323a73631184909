//! Load-state tracking with atomic check-then-set de-duplication.
//!
//! The cache is the single source of truth for "has this bundle been
//! fetched". Between the moment a load begins and the moment it resolves,
//! the key's state is [`LoadState::Pending`] and every caller requesting the
//! same key joins the *same* in-flight operation instead of starting a
//! second fetch.

use crate::error::{LoadError, LoadResult};
use futures::future::{BoxFuture, FutureExt, Shared};
use lokal_common::BundleKey;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

type SharedLoad = Shared<BoxFuture<'static, LoadResult<()>>>;

/// A live load operation shared between every caller awaiting the same key.
///
/// The handle is cheap to clone. It carries the operation's own cancellation
/// token: the operation checks it after the fetch settles and commits
/// nothing when it has been cancelled.
#[derive(Clone)]
pub struct InFlight {
    key: BundleKey,
    future: SharedLoad,
    token: CancellationToken,
    waiters: Arc<AtomicUsize>,
}

impl InFlight {
    pub(crate) fn new(
        key: BundleKey,
        token: CancellationToken,
        future: BoxFuture<'static, LoadResult<()>>,
    ) -> Self {
        Self {
            key,
            future: future.shared(),
            token,
            waiters: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counts a caller as awaiting this operation. Registration happens in
    /// [`LoadStateCache::begin`] under the cache lock, so a caller that was
    /// handed the pending state is already counted before any earlier waiter
    /// can detach and decide it was the last one.
    pub(crate) fn register(&self) {
        self.waiters.fetch_add(1, Ordering::SeqCst);
    }

    /// Awaits the shared operation on behalf of an already registered
    /// caller, detaching early if `caller` is cancelled.
    ///
    /// A caller detaching never cancels an operation other callers are
    /// still awaiting; only the *last* waiter to walk away cancels the
    /// operation token, letting the operation discard its result.
    pub(crate) async fn join_registered(&self, caller: &CancellationToken) -> LoadResult<()> {
        let outcome = tokio::select! {
            result = self.future.clone() => Some(result),
            () = caller.cancelled() => None,
        };
        let previous_waiters = self.waiters.fetch_sub(1, Ordering::SeqCst);
        match outcome {
            Some(result) => result,
            None => {
                if previous_waiters == 1 {
                    self.token.cancel();
                }
                Err(LoadError::Cancelled(self.key.clone()))
            }
        }
    }

    /// Registers and awaits in one step, for callers outside the cache's
    /// begin protocol.
    pub(crate) async fn join(&self, caller: &CancellationToken) -> LoadResult<()> {
        self.register();
        self.join_registered(caller).await
    }

    /// A detached driver that keeps the operation progressing even when
    /// every caller has walked away before it settled.
    pub(crate) fn driver(&self) -> impl Future<Output = ()> + Send + 'static {
        let future = self.future.clone();
        async move {
            let _ = future.await;
        }
    }
}

impl fmt::Debug for InFlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFlight")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// Cached load outcome for one bundle key.
#[derive(Debug, Clone)]
pub enum LoadState {
    /// The bundle was fetched and merged into the translation table.
    Loaded,
    /// No bundle exists for this key. Expected for optional locale variants.
    Missing,
    /// The last fetch attempt failed with the recorded message.
    Error(String),
    /// A load is currently in flight.
    Pending(InFlight),
}

/// Process-wide mapping from bundle key to load state.
#[derive(Debug, Default)]
pub struct LoadStateCache {
    states: Mutex<HashMap<BundleKey, LoadState>>,
}

impl LoadStateCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for a key, if any attempt has been recorded.
    pub fn get(&self, key: &BundleKey) -> Option<LoadState> {
        self.states.lock().get(key).cloned()
    }

    /// Records a state, replacing whatever was there.
    pub fn set(&self, key: BundleKey, state: LoadState) {
        self.states.lock().insert(key, state);
    }

    /// Forces a key back to absent, re-arming de-duplication for it. The
    /// next load runs as if the key had never been attempted.
    pub fn clear(&self, key: &BundleKey) {
        self.states.lock().remove(key);
    }

    /// Atomically records `inflight` as the key's pending operation unless
    /// some state already exists, in which case that state is returned and
    /// nothing is written. The check and the write happen under one lock
    /// guard, so no second operation can slip in between them.
    ///
    /// Whenever the outcome is a pending operation (newly inserted or
    /// already in flight), the caller is registered as one of its waiters
    /// under the same guard and must settle through
    /// [`InFlight::join_registered`].
    pub(crate) fn begin(&self, key: &BundleKey, inflight: InFlight) -> Option<LoadState> {
        let mut states = self.states.lock();
        if let Some(existing) = states.get(key) {
            if let LoadState::Pending(pending) = existing {
                pending.register();
            }
            return Some(existing.clone());
        }
        inflight.register();
        states.insert(key.clone(), LoadState::Pending(inflight));
        None
    }
}
