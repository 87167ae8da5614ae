//! Error types shared by the reload pipeline.

use std::time::Duration;

use thiserror::Error;

use crate::overrides::limits::LimitsError;
use crate::source::SourceError;

/// Why a single load attempt failed.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Backend unreachable or object missing. Expected to heal on its own.
    #[error("runtime config source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    /// The document is not valid structured text for the payload type.
    #[error("failed to decode runtime config: {0}")]
    Decode(#[from] serde_yaml::Error),

    /// More than one YAML document was found in the stream.
    #[error("the provided runtime configuration contains multiple documents")]
    MultipleDocuments,

    /// A tenant override failed its semantic checks.
    #[error("invalid overrides for tenant {tenant:?}: {source}")]
    Validation {
        tenant: String,
        #[source]
        source: LimitsError,
    },

    /// The fetch + decode did not finish within the reload timeout.
    #[error("runtime config load timed out after {0:?}")]
    Timeout(Duration),
}

impl LoadError {
    /// Whether the next tick has a reasonable chance of succeeding without
    /// operator intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LoadError::SourceUnavailable(_) | LoadError::Timeout(_))
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::SourceUnavailable(_) => "source_unavailable",
            LoadError::Decode(_) => "decode",
            LoadError::MultipleDocuments => "multiple_documents",
            LoadError::Validation { .. } => "validation",
            LoadError::Timeout(_) => "timeout",
        }
    }
}

/// Errors returned by [`Manager`](crate::runtime::Manager) lifecycle calls.
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("runtime config manager already started")]
    AlreadyStarted,

    #[error("runtime config manager is not running")]
    NotRunning,

    /// The mandatory first load failed; the embedding process must not
    /// become ready.
    #[error("initial runtime config load failed: {0}")]
    InitialLoad(#[source] LoadError),

    /// A manual reload was accepted but the load itself failed. The previous
    /// snapshot stays authoritative.
    #[error(transparent)]
    Reload(LoadError),
}
