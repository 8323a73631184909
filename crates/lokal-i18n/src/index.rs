//! Static bundle index built once at startup.
//!
//! The index maps every `(feature, locale)` pair to the opaque handle the
//! fetch collaborator needs to materialize the bundle. It is scanned from a
//! fixed directory convention and immutable thereafter.

use lokal_common::BundleKey;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Opaque handle addressing one bundle's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleHandle(PathBuf);

impl BundleHandle {
    /// Creates a handle from anything path-like.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// The location this handle addresses.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Immutable mapping from bundle key to bundle handle.
#[derive(Debug, Default)]
pub struct BundleIndex {
    entries: HashMap<BundleKey, BundleHandle>,
}

impl BundleIndex {
    /// Builds an index from explicit entries, mainly for tests and
    /// non-filesystem transports.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (BundleKey, BundleHandle)>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Scans the `<features_root>/<feature>/locales/<locale>.json`
    /// convention. Feature directories may be nested; the feature name is
    /// the path relative to `features_root`, joined with `/`.
    ///
    /// A missing root yields an empty index rather than an error, matching
    /// an application that ships no lazily loadable features.
    pub fn scan(features_root: &Path) -> io::Result<Self> {
        let mut entries = HashMap::new();

        if features_root.is_dir() {
            let mut stack = vec![features_root.to_path_buf()];
            while let Some(dir) = stack.pop() {
                for entry in fs::read_dir(&dir)? {
                    let path = entry?.path();
                    if !path.is_dir() {
                        continue;
                    }
                    if path.file_name().is_some_and(|name| name == "locales") {
                        match feature_name(features_root, &dir) {
                            Some(feature) => {
                                collect_locale_files(&feature, &path, &mut entries)?;
                            }
                            None => {
                                warn!(
                                    "Ignoring locales directory outside any feature: {}",
                                    path.display()
                                );
                            }
                        }
                    } else {
                        stack.push(path);
                    }
                }
            }
        }

        debug!("Bundle index built with {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Looks up the handle for a bundle key.
    pub fn handle(&self, key: &BundleKey) -> Option<&BundleHandle> {
        self.entries.get(key)
    }

    /// Number of indexed bundles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no bundles.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Scans the locale-independent common-string convention
/// `<dir>/<locale>.json`. These bundles are loaded eagerly at startup.
pub fn scan_common_bundles(dir: &Path) -> io::Result<Vec<(String, BundleHandle)>> {
    let mut bundles = Vec::new();
    if dir.is_dir() {
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if let Some(locale) = locale_stem(&path) {
                bundles.push((locale, BundleHandle::new(path)));
            }
        }
    }
    Ok(bundles)
}

fn feature_name(features_root: &Path, dir: &Path) -> Option<String> {
    let relative = dir.strip_prefix(features_root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    let feature = relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/");
    Some(feature)
}

fn collect_locale_files(
    feature: &str,
    locales_dir: &Path,
    entries: &mut HashMap<BundleKey, BundleHandle>,
) -> io::Result<()> {
    for entry in fs::read_dir(locales_dir)? {
        let path = entry?.path();
        if let Some(locale) = locale_stem(&path) {
            entries.insert(
                BundleKey::new(feature, locale),
                BundleHandle::new(path),
            );
        }
    }
    Ok(())
}

fn locale_stem(path: &Path) -> Option<String> {
    if !path.is_file() || path.extension()? != "json" {
        return None;
    }
    Some(path.file_stem()?.to_string_lossy().into_owned())
}
