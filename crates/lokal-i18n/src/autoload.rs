//! Missing-key autoload batching.
//!
//! A translation lookup that misses marks its feature bundle for loading,
//! but the load itself is deferred: misses observed within one quiet period
//! are collapsed into a single de-duplicated batch, so an initial render
//! requesting dozens of keys across a handful of features produces one load
//! per distinct `(feature, locale)` pair.

use crate::cache::LoadStateCache;
use crate::error::LoadError;
use crate::loader::BundleLoader;
use futures::future::join_all;
use lokal_common::{split_key, BundleKey};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::{debug, warn};

/// Quiet period between the first batched miss and the flush.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(50);

/// Collects missing-key observations and flushes them as one batch of load
/// requests after a quiet period.
pub struct AutoloadBatcher {
    loader: BundleLoader,
    cache: Arc<LoadStateCache>,
    pending: Mutex<HashSet<BundleKey>>,
    timer_armed: AtomicBool,
    quiet_period: Duration,
    this: Weak<Self>,
}

impl AutoloadBatcher {
    /// Creates a batcher with the default quiet period.
    pub fn new(loader: BundleLoader, cache: Arc<LoadStateCache>) -> Arc<Self> {
        Self::with_quiet_period(loader, cache, DEFAULT_QUIET_PERIOD)
    }

    /// Creates a batcher flushing after `quiet_period`.
    pub fn with_quiet_period(
        loader: BundleLoader,
        cache: Arc<LoadStateCache>,
        quiet_period: Duration,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            loader,
            cache,
            pending: Mutex::new(HashSet::new()),
            timer_armed: AtomicBool::new(false),
            quiet_period,
            this: this.clone(),
        })
    }

    /// Records a lookup miss for `full_key` under `locale` and arms the
    /// flush timer if none is outstanding. Keys whose feature bundle already
    /// has any recorded state (including `Missing` and `Error`) are ignored;
    /// there is no automatic retry.
    pub fn note_miss(&self, locale: &str, full_key: &str) {
        let Some((feature, _)) = split_key(full_key) else {
            return;
        };
        let key = BundleKey::new(feature, locale);
        if self.cache.get(&key).is_some() {
            return;
        }
        self.pending.lock().insert(key);

        if !self.timer_armed.swap(true, Ordering::SeqCst) {
            let Some(batcher) = self.this.upgrade() else {
                return;
            };
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        tokio::time::sleep(batcher.quiet_period).await;
                        batcher.flush().await;
                    });
                }
                Err(_) => {
                    self.timer_armed.store(false, Ordering::SeqCst);
                    warn!("Autoload for {} skipped: no async runtime", full_key);
                }
            }
        }
    }

    /// Drains the pending set and loads every pair that is still untracked.
    /// A direct load may have raced ahead; those keys are skipped.
    pub async fn flush(&self) {
        // Un-arm and drain under one guard: a miss racing this flush either
        // lands in the drained batch or observes the cleared flag and arms
        // its own timer. No key can be left stranded in the set.
        let batch: Vec<BundleKey> = {
            let mut pending = self.pending.lock();
            self.timer_armed.store(false, Ordering::SeqCst);
            pending.drain().collect()
        };
        if batch.is_empty() {
            return;
        }
        debug!("Autoloading {} translation bundles", batch.len());

        let loads = batch
            .into_iter()
            .filter(|key| self.cache.get(key).is_none())
            .map(|key| {
                let loader = self.loader.clone();
                async move {
                    // The loader records and logs every outcome; cancellation
                    // cannot happen here because the token is never cancelled.
                    if let Err(LoadError::Cancelled(key)) =
                        loader.load(key.feature(), key.locale()).await
                    {
                        debug!("Autoload for {} discarded", key);
                    }
                }
            });
        join_all(loads).await;
    }

    /// Number of misses waiting for the next flush.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}

impl std::fmt::Debug for AutoloadBatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoloadBatcher")
            .field("quiet_period", &self.quiet_period)
            .field("pending", &self.pending.lock().len())
            .finish_non_exhaustive()
    }
}
