//! Configuration schema definitions.
//!
//! This module defines the static configuration of a process embedding the
//! runtime config manager. It is read once at startup from TOML; the runtime
//! config document itself is described in [`crate::overrides`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::overrides::limits::Limits;
use crate::overrides::roles::{RoleSet, UnknownRole};
use crate::resilience::backoff::RetryPolicy;
use crate::runtime::manager::ManagerConfig;
use crate::source::WorkingDir;

/// Root configuration for the process.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Comma-separated roles this process runs (e.g. `distributor,querier`).
    pub target: String,

    /// HTTP server settings.
    pub server: ServerConfig,

    /// Where and how often to load the runtime config document.
    pub runtime_config: RuntimeConfigSettings,

    pub distributor: DistributorConfig,

    pub ingester: IngesterConfig,

    /// Default tenant limits, the baseline of the diff view.
    #[serde(default = "Limits::process_defaults")]
    pub limits: Limits,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            target: "all".to_string(),
            server: ServerConfig::default(),
            runtime_config: RuntimeConfigSettings::default(),
            distributor: DistributorConfig::default(),
            ingester: IngesterConfig::default(),
            limits: Limits::process_defaults(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ProcessConfig {
    pub fn roles(&self) -> Result<RoleSet, UnknownRole> {
        self.target.parse()
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:9009").
    pub http_listen_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_listen_address: "0.0.0.0:9009".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Storage backend holding the runtime config document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Filesystem,
    S3,
}

/// Runtime config reload settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfigSettings {
    /// Document path (filesystem) or object key (s3). Empty disables
    /// runtime overrides.
    pub file: String,

    pub backend: StorageBackend,

    /// Reload period in seconds. Zero disables periodic reloads.
    pub reload_period_secs: u64,

    /// Deadline for one fetch + decode, in seconds.
    pub reload_timeout_secs: u64,

    /// Directory relative `file` paths resolve against. Defaults to the
    /// process's current directory at each reload.
    pub working_dir: Option<String>,

    /// Also reload when the (filesystem) document changes on disk.
    pub watch_file: bool,

    pub s3: S3Config,

    pub retry: RetryConfig,
}

impl Default for RuntimeConfigSettings {
    fn default() -> Self {
        Self {
            file: String::new(),
            backend: StorageBackend::Filesystem,
            reload_period_secs: 10,
            reload_timeout_secs: 30,
            working_dir: None,
            watch_file: false,
            s3: S3Config::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl RuntimeConfigSettings {
    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            path: Some(self.file.clone()).filter(|f| !f.is_empty()),
            working_dir: match &self.working_dir {
                Some(dir) => WorkingDir::Fixed(dir.into()),
                None => WorkingDir::Process,
            },
            reload_period: Duration::from_secs(self.reload_period_secs),
            reload_timeout: Duration::from_secs(self.reload_timeout_secs),
            retry: self.retry.policy(),
        }
    }
}

/// S3 (or S3-compatible) backend parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct S3Config {
    /// Host[:port] or full URL. Unset uses AWS.
    pub endpoint: Option<String>,
    pub bucket_name: String,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    /// Use plain HTTP for endpoints given without a scheme.
    pub insecure: bool,
}

impl Default for S3Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            bucket_name: String::new(),
            region: "us-east-1".to_string(),
            access_key_id: None,
            secret_access_key: None,
            insecure: false,
        }
    }
}

/// Retry configuration after failed reloads.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            base_delay_ms: policy.base_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DistributorConfig {
    /// Distribute series by all labels instead of metric name only.
    pub shard_by_all_labels: bool,
}

impl Default for DistributorConfig {
    fn default() -> Self {
        Self {
            shard_by_all_labels: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IngesterConfig {
    /// Track active series per tenant.
    pub active_series_metrics_enabled: bool,
}

impl Default for IngesterConfig {
    fn default() -> Self {
        Self {
            active_series_metrics_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let cfg: ProcessConfig = toml::from_str("[runtime_config]\nfile = \"runtime.yaml\"\n").unwrap();
        assert_eq!(cfg.target, "all");
        assert_eq!(cfg.runtime_config.backend, StorageBackend::Filesystem);
        assert_eq!(cfg.limits, Limits::process_defaults());

        let manager = cfg.runtime_config.manager_config();
        assert_eq!(manager.path.as_deref(), Some("runtime.yaml"));
        assert_eq!(manager.working_dir, WorkingDir::Process);
        assert_eq!(manager.reload_period, Duration::from_secs(10));
    }

    #[test]
    fn test_s3_backend_and_working_dir() {
        let cfg: ProcessConfig = toml::from_str(
            r#"
target = "querier"

[runtime_config]
file = "runtime-config.yaml"
backend = "s3"
reload_period_secs = 0
working_dir = "/var/lib/runtime-config"

[runtime_config.s3]
endpoint = "minio:9000"
bucket_name = "runtime-config"
insecure = true
"#,
        )
        .unwrap();

        assert_eq!(cfg.runtime_config.backend, StorageBackend::S3);
        assert_eq!(cfg.runtime_config.s3.bucket_name, "runtime-config");
        let manager = cfg.runtime_config.manager_config();
        assert!(manager.reload_period.is_zero());
        assert_eq!(manager.working_dir, WorkingDir::Fixed("/var/lib/runtime-config".into()));
    }

    #[test]
    fn test_empty_file_disables_path() {
        let manager = RuntimeConfigSettings::default().manager_config();
        assert!(manager.path.is_none());
    }
}
