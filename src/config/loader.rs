//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ProcessConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ProcessConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: ProcessConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("process.toml");
        fs::write(&path, "target = \"ingester\"\n[runtime_config]\nfile = \"runtime.yaml\"\n").unwrap();

        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.target, "ingester");
    }

    #[test]
    fn test_validation_errors_joined() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("process.toml");
        fs::write(&path, "target = \"nope\"\n[server]\nhttp_listen_address = \"x\"\n").unwrap();

        let err = load_config(&path).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Validation failed: target"), "{msg}");
        assert!(msg.contains("server.http_listen_address"), "{msg}");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
