//! Live active-locale state.

use tokio::sync::watch;
use std::sync::Arc;

/// The currently active display locale, observable for changes.
///
/// The navigation guard is the writer; translation consumers read the value
/// synchronously and feature handles subscribe to re-load their bundles when
/// the locale changes.
#[derive(Debug, Clone)]
pub struct ActiveLocale {
    tx: Arc<watch::Sender<String>>,
}

impl ActiveLocale {
    /// Creates the state with an initial locale.
    pub fn new(initial: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(initial.into());
        Self { tx: Arc::new(tx) }
    }

    /// The current locale.
    pub fn get(&self) -> String {
        self.tx.borrow().clone()
    }

    /// Sets the locale, notifying subscribers only when the value actually
    /// changed. Returns whether it did.
    pub fn set(&self, locale: &str) -> bool {
        self.tx.send_if_modified(|current| {
            if current == locale {
                false
            } else {
                locale.clone_into(current);
                true
            }
        })
    }

    /// Subscribes to locale changes.
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }
}
