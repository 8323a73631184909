//! Test utilities and shared test helpers for the lokal workspace.
//!
//! This module provides common testing utilities that can be used across
//! all crates in the workspace for unit and integration testing.

use std::fs;
use std::path::Path;
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize test logging once per test run.
static INIT: Once = Once::new();

/// Initialize logging for tests with a sensible default configuration.
/// This function is safe to call multiple times and will only initialize once.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        fmt().with_test_writer().with_env_filter(filter).init();
    });
}

/// Create a temporary directory for tests that automatically cleans up.
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Writes one bundle file under the conventional
/// `<root>/<feature>/locales/<locale>.json` layout and returns its path.
pub fn write_bundle_file(
    root: &Path,
    feature: &str,
    locale: &str,
    json: &str,
) -> std::path::PathBuf {
    let dir = root.join(feature).join("locales");
    fs::create_dir_all(&dir).expect("Failed to create bundle directory");
    let path = dir.join(format!("{locale}.json"));
    fs::write(&path, json).expect("Failed to write bundle file");
    path
}
