//! Source Reader: fetch the raw runtime configuration document.
//!
//! # Data Flow
//! ```text
//! (path, working dir)
//!     → filesystem.rs (resolve relative path, read local disk)
//!     → object.rs     (read object keyed by the unresolved path)
//!     → raw bytes handed to the Loader
//! ```
//!
//! # Design Decisions
//! - Backend selection is independent of path shape
//! - The working directory is evaluated on every read, never cached
//! - Missing documents and transport failures are both retryable

pub mod filesystem;
pub mod object;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use crate::config::schema::{RuntimeConfigSettings, StorageBackend};

pub use filesystem::FilesystemSource;
pub use object::ObjectStoreSource;

/// Why a document could not be fetched.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("runtime config {path:?} not found")]
    NotFound { path: String },

    #[error("failed to read runtime config {path:?}: {reason}")]
    Transient { path: String, reason: String },

    #[error("failed to configure runtime config backend: {0}")]
    Backend(String),
}

/// Directory relative paths are resolved against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WorkingDir {
    /// The process's current directory at the time of each read.
    #[default]
    Process,
    /// A fixed directory.
    Fixed(PathBuf),
}

impl WorkingDir {
    /// Resolve `path` against this working directory.
    pub fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let path = Path::new(path);
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }
        match self {
            WorkingDir::Process => Ok(std::env::current_dir()?.join(path)),
            WorkingDir::Fixed(dir) => Ok(dir.join(path)),
        }
    }
}

/// A backend the runtime configuration document can be fetched from.
#[async_trait]
pub trait SourceReader: Send + Sync {
    /// Read the whole document stored at `path`.
    async fn open(&self, path: &str, working_dir: &WorkingDir) -> Result<Bytes, SourceError>;

    /// Backend name for logs.
    fn name(&self) -> &'static str;
}

/// Build the source reader selected by the process configuration.
pub fn from_config(settings: &RuntimeConfigSettings) -> Result<Arc<dyn SourceReader>, SourceError> {
    let source: Arc<dyn SourceReader> = match settings.backend {
        StorageBackend::Filesystem => Arc::new(FilesystemSource),
        StorageBackend::S3 => Arc::new(ObjectStoreSource::s3(&settings.s3)?),
    };
    tracing::info!(backend = source.name(), "Runtime config source configured");
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_ignores_working_dir() {
        let dir = WorkingDir::Fixed(PathBuf::from("/var/lib/runtime-config"));
        assert_eq!(
            dir.resolve("/etc/runtime.yaml").unwrap(),
            PathBuf::from("/etc/runtime.yaml")
        );
    }

    #[test]
    fn test_relative_path_joins_fixed_dir() {
        let dir = WorkingDir::Fixed(PathBuf::from("/shared"));
        assert_eq!(
            dir.resolve("runtime.yaml").unwrap(),
            PathBuf::from("/shared/runtime.yaml")
        );
    }

    #[test]
    fn test_relative_path_uses_current_dir() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            WorkingDir::Process.resolve("runtime.yaml").unwrap(),
            cwd.join("runtime.yaml")
        );
    }
}
