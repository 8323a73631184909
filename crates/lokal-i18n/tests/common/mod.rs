//! Shared fixtures for lokal-i18n integration tests.

use async_trait::async_trait;
use lokal_common::BundleKey;
use lokal_i18n::{BundleFetcher, BundleHandle, BundleIndex};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// In-memory fetcher that records every invocation and can block, delay or
/// fail individual bundles.
#[derive(Default)]
pub struct FakeFetcher {
    bundles: HashMap<String, HashMap<String, String>>,
    gates: HashMap<String, CancellationToken>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bundle(mut self, name: &str, pairs: &[(&str, &str)]) -> Self {
        self.bundles.insert(name.to_string(), entries(pairs));
        self
    }

    /// Blocks fetches of `name` until the returned latch is released with
    /// `cancel()`.
    pub fn with_gate(mut self, name: &str) -> (Self, CancellationToken) {
        let gate = CancellationToken::new();
        self.gates.insert(name.to_string(), gate.clone());
        (self, gate)
    }

    pub fn with_failure(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BundleFetcher for FakeFetcher {
    async fn fetch(&self, handle: &BundleHandle) -> anyhow::Result<HashMap<String, String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let name = handle.path().to_string_lossy().into_owned();
        if let Some(gate) = self.gates.get(&name) {
            gate.cancelled().await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(&name) {
            anyhow::bail!("synthetic fetch failure for {name}");
        }
        self.bundles
            .get(&name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no bundle named {name}"))
    }
}

/// Builds an index whose handle for each `(feature, locale)` is the string
/// `"<feature>/<locale>"`, matching [`FakeFetcher`] bundle names.
pub fn index_of(keys: &[(&str, &str)]) -> BundleIndex {
    BundleIndex::from_entries(keys.iter().map(|(feature, locale)| {
        (
            BundleKey::new(*feature, *locale),
            BundleHandle::new(format!("{feature}/{locale}")),
        )
    }))
}

pub fn entries(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Yields until `condition` holds, panicking after a bounded number of
/// scheduler turns so a broken invariant fails fast instead of hanging.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached within bounded scheduler turns");
}

/// Convenience alias used by tests building fetchers into contexts.
pub fn shared(fetcher: FakeFetcher) -> Arc<FakeFetcher> {
    Arc::new(fetcher)
}
