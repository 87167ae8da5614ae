//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the target names known roles
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check backend-specific parameters are present
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProcessConfig → Result<(), Vec<ValidationError>>
//! - Runs before the runtime config manager is built

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{ProcessConfig, StorageBackend};

/// One semantic problem in the process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &ProcessConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.roles() {
        Ok(roles) if roles.iter().next().is_none() => {
            errors.push(ValidationError::new("target", "at least one role is required"));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new("target", e.to_string())),
    }

    if config.server.http_listen_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.http_listen_address",
            format!("invalid socket address {:?}", config.server.http_listen_address),
        ));
    }

    let runtime = &config.runtime_config;
    if runtime.reload_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "runtime_config.reload_timeout_secs",
            "must be greater than zero",
        ));
    }
    if runtime.retry.base_delay_ms == 0 {
        errors.push(ValidationError::new(
            "runtime_config.retry.base_delay_ms",
            "must be greater than zero",
        ));
    }
    if runtime.retry.base_delay_ms > runtime.retry.max_delay_ms {
        errors.push(ValidationError::new(
            "runtime_config.retry",
            "base_delay_ms must not exceed max_delay_ms",
        ));
    }
    if runtime.backend == StorageBackend::S3 {
        if runtime.s3.bucket_name.is_empty() {
            errors.push(ValidationError::new(
                "runtime_config.s3.bucket_name",
                "required when backend is s3",
            ));
        }
        if runtime.file.is_empty() {
            errors.push(ValidationError::new(
                "runtime_config.file",
                "object key required when backend is s3",
            ));
        }
        if runtime.watch_file {
            errors.push(ValidationError::new(
                "runtime_config.watch_file",
                "only supported with the filesystem backend",
            ));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("invalid socket address {:?}", config.observability.metrics_address),
        ));
    }

    if config.limits.validate(true, true).is_err() {
        errors.push(ValidationError::new("limits", "default limits must not be negative"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ProcessConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_error() {
        let mut cfg = ProcessConfig::default();
        cfg.target = "querier,frontend".into();
        cfg.server.http_listen_address = "not-an-address".into();
        cfg.runtime_config.backend = StorageBackend::S3;
        cfg.runtime_config.reload_timeout_secs = 0;

        let errors = validate_config(&cfg).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "target",
                "server.http_listen_address",
                "runtime_config.reload_timeout_secs",
                "runtime_config.s3.bucket_name",
                "runtime_config.file",
            ]
        );
    }

    #[test]
    fn test_zero_retry_base_delay_rejected() {
        let mut cfg = ProcessConfig::default();
        cfg.runtime_config.retry.base_delay_ms = 0;
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "runtime_config.retry.base_delay_ms");
    }

    #[test]
    fn test_empty_target_rejected() {
        let mut cfg = ProcessConfig::default();
        cfg.target = " ".into();
        let errors = validate_config(&cfg).unwrap_err();
        assert_eq!(errors[0].field, "target");
    }
}
