//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};

use runtime_config::overrides::{RoleSet, RuntimeConfigLoader, RuntimeConfigValues};
use runtime_config::runtime::{Manager, ManagerConfig};
use runtime_config::source::{ObjectStoreSource, SourceReader, WorkingDir};

/// Write `contents` to `dir/name` and return the full path.
pub fn write_document(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Store `contents` under `key` in an in-memory object store.
pub async fn put_object(store: &InMemory, key: &str, contents: &str) {
    store
        .put(&ObjectPath::from(key), PutPayload::from(contents.to_string()))
        .await
        .unwrap();
}

pub fn memory_source(store: Arc<InMemory>) -> Arc<dyn SourceReader> {
    Arc::new(ObjectStoreSource::new(store, "memory"))
}

pub fn manager_config(path: &str, working_dir: WorkingDir, period: Duration) -> ManagerConfig {
    ManagerConfig {
        path: Some(path.to_string()),
        working_dir,
        reload_period: period,
        ..ManagerConfig::default()
    }
}

/// Manager over the override document with every role enabled.
pub fn overrides_manager(
    config: ManagerConfig,
    source: Arc<dyn SourceReader>,
) -> Manager<RuntimeConfigValues> {
    let loader = RuntimeConfigLoader::new(RoleSet::from_iter([runtime_config::overrides::Role::All]), true, true);
    Manager::new(config, source, Arc::new(loader))
}

/// Poll `condition` until it holds or `timeout` elapses.
pub async fn wait_until<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

/// Run `fut`, failing the test if it takes longer than `timeout`.
pub async fn within<T>(timeout: Duration, fut: impl Future<Output = T>) -> T {
    tokio::time::timeout(timeout, fut).await.expect("timed out")
}
