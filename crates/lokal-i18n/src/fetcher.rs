//! Fetch collaborator boundary.
//!
//! The transport that materializes a bundle's contents is external to this
//! crate. The loader only sees the [`BundleFetcher`] trait; the reference
//! implementation reads flat JSON files from disk.

use crate::index::BundleHandle;
use async_trait::async_trait;
use std::collections::HashMap;

/// Transport that materializes one bundle's key-value contents.
///
/// Implementations report hard failures through `Err`; "the bundle does not
/// exist" is never the fetcher's concern because the bundle index filters
/// unknown keys before a fetch is attempted.
#[async_trait]
pub trait BundleFetcher: Send + Sync {
    /// Fetches the bundle addressed by `handle`.
    async fn fetch(&self, handle: &BundleHandle) -> anyhow::Result<HashMap<String, String>>;
}

/// Fetcher reading flat JSON object files from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFileFetcher;

#[async_trait]
impl BundleFetcher for JsonFileFetcher {
    async fn fetch(&self, handle: &BundleHandle) -> anyhow::Result<HashMap<String, String>> {
        let raw = tokio::fs::read_to_string(handle.path()).await?;
        let entries = serde_json::from_str(&raw)?;
        Ok(entries)
    }
}
