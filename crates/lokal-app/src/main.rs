//! Main entry point for lokal.

use lokal_app::App;
use lokal_router::{FileStore, MemoryStore, PreferenceStore};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lokal=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting lokal");

    let assets_root = assets_root();
    let client_locale = env::var("LANG").unwrap_or_else(|_| "en".to_string());
    let store = preference_store();

    let app = App::bootstrap(&assets_root, &client_locale, store).await?;

    let url = env::args().nth(2).unwrap_or_else(|| "/".to_string());
    match app.navigate(&url).await {
        Ok(nav) => {
            info!(
                "Entered route '{}' at {} under locale '{}'",
                nav.route, nav.path, nav.locale
            );
        }
        Err(e) => {
            error!("Navigation to {} failed: {}", url, e);
            return Err(e.into());
        }
    }

    Ok(())
}

fn assets_root() -> PathBuf {
    env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from("assets"), PathBuf::from)
}

fn preference_store() -> Arc<dyn PreferenceStore> {
    match env::var("LOKAL_PREFERENCES") {
        Ok(path) => Arc::new(FileStore::open(path)),
        Err(_) => Arc::new(MemoryStore::new()),
    }
}
