//! Runtime config file watcher for change-triggered reloads.

use std::path::{Path, PathBuf};
use std::time::Duration;
use notify::{Watcher, RecursiveMode, Event, RecommendedWatcher, Config};
use tokio::sync::mpsc;

use crate::runtime::Manager;

/// Notifies when the runtime config file changes on disk.
///
/// The watcher only signals; reloading (and therefore decoding and
/// validation) stays inside the manager.
pub struct FileWatcher {
    path: PathBuf,
    change_tx: mpsc::UnboundedSender<()>,
}

impl FileWatcher {
    /// Create a new FileWatcher.
    ///
    /// Returns the watcher and a receiver yielding one item per change.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        (Self {
            path: path.to_path_buf(),
            change_tx,
        }, change_rx)
    }

    /// Start watching the file in a background thread. The returned watcher
    /// must be kept alive for as long as events are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.change_tx.clone();

        let mut watcher = RecommendedWatcher::new(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::debug!(paths = ?event.paths, "Runtime config file change detected");
                        let _ = tx.send(());
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            }
        }, Config::default().with_poll_interval(Duration::from_secs(2)))?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Runtime config watcher started");
        Ok(watcher)
    }
}

/// Reload `manager` for every change reported on `changes`. Bursts of events
/// collapse into one reload. Returns when the channel closes or the manager
/// stops.
pub async fn reload_on_change<T: Send + Sync + 'static>(
    manager: Manager<T>,
    mut changes: mpsc::UnboundedReceiver<()>,
) {
    while changes.recv().await.is_some() {
        while changes.try_recv().is_ok() {}

        match manager.reload().await {
            Ok(outcome) => tracing::debug!(?outcome, "Reloaded runtime config after file change"),
            Err(crate::runtime::ManagerError::NotRunning) => break,
            // Already reported by the manager.
            Err(_) => {}
        }
    }
}
