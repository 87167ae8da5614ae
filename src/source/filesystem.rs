//! Local disk backend.

use std::io::ErrorKind;

use async_trait::async_trait;
use bytes::Bytes;

use super::{SourceError, SourceReader, WorkingDir};

/// Reads the document from local disk, resolving relative paths against the
/// working directory on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemSource;

#[async_trait]
impl SourceReader for FilesystemSource {
    async fn open(&self, path: &str, working_dir: &WorkingDir) -> Result<Bytes, SourceError> {
        let resolved = working_dir.resolve(path).map_err(|e| SourceError::Transient {
            path: path.to_string(),
            reason: format!("cannot resolve working directory: {e}"),
        })?;

        match tokio::fs::read(&resolved).await {
            Ok(content) => Ok(Bytes::from(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(SourceError::NotFound {
                path: resolved.display().to_string(),
            }),
            Err(e) => Err(SourceError::Transient {
                path: resolved.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}
