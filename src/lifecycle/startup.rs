//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the runtime config source, loader and manager from process config
//! - Perform the mandatory first load
//! - Start the optional file watcher
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The HTTP listener starts after the first load (traffic only when ready)

use std::sync::Arc;

use notify::RecommendedWatcher;
use thiserror::Error;

use crate::config::schema::{ProcessConfig, StorageBackend};
use crate::config::watcher::{reload_on_change, FileWatcher};
use crate::overrides::roles::UnknownRole;
use crate::overrides::{RuntimeConfigLoader, RuntimeConfigValues};
use crate::runtime::{LoadError, Manager, ManagerError};
use crate::source::{self, SourceError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid target: {0}")]
    Target(#[from] UnknownRole),

    #[error("runtime config source: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Manager(#[from] ManagerError),

    #[error("runtime config watcher: {0}")]
    Watch(#[from] notify::Error),

    #[error("resolving runtime config path: {0}")]
    Path(#[from] std::io::Error),
}

/// Build and start the runtime config manager described by `config`.
pub async fn start_runtime_config(
    config: &ProcessConfig,
) -> Result<Manager<RuntimeConfigValues>, StartupError> {
    let loader = RuntimeConfigLoader::from_config(config)?;
    tracing::info!(roles = %loader.roles(), "Tenant limit validation configured");

    let settings = &config.runtime_config;
    let source = source::from_config(settings)?;

    let manager = Manager::with_error_sink(
        settings.manager_config(),
        source,
        Arc::new(loader),
        Arc::new(|e: &LoadError| {
            tracing::debug!(kind = e.kind(), retryable = e.is_retryable(), "Runtime config reload error reported");
        }),
    );
    manager.start().await?;
    Ok(manager)
}

/// Start the file watcher when enabled. The returned watcher must be kept
/// alive for as long as change-triggered reloads are wanted.
pub fn spawn_file_watcher(
    config: &ProcessConfig,
    manager: &Manager<RuntimeConfigValues>,
) -> Result<Option<RecommendedWatcher>, StartupError> {
    let settings = &config.runtime_config;
    if !settings.watch_file || settings.file.is_empty() || settings.backend != StorageBackend::Filesystem {
        return Ok(None);
    }

    let path = settings.manager_config().working_dir.resolve(&settings.file)?;
    let (watcher, changes) = FileWatcher::new(&path);
    let watcher = watcher.run()?;
    tokio::spawn(reload_on_change(manager.clone(), changes));
    Ok(Some(watcher))
}
