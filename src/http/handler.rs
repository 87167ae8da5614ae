//! Rendering of the current runtime config for operators.

use std::sync::Arc;

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::http::diff::diff_config;
use crate::overrides::limits::Limits;
use crate::overrides::values::RuntimeConfigValues;
use crate::runtime::Manager;

/// Body served while no snapshot has loaded.
pub const PLACEHOLDER: &str = "runtime config file doesn't exist";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// The snapshot as loaded.
    #[default]
    Full,
    /// Only what differs from the process default limits.
    Diff,
}

impl RenderMode {
    /// Parse the `mode` query parameter; anything but `diff` renders in full.
    pub fn from_query(mode: Option<&str>) -> Self {
        match mode {
            Some("diff") => RenderMode::Diff,
            _ => RenderMode::Full,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Full => "full",
            RenderMode::Diff => "diff",
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to serialize runtime config: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("runtime config did not serialize to a mapping")]
    NotAMapping,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered {
    /// Nothing has loaded yet.
    Placeholder,
    Yaml(String),
}

impl Rendered {
    pub fn body(&self) -> &str {
        match self {
            Rendered::Placeholder => PLACEHOLDER,
            Rendered::Yaml(body) => body,
        }
    }
}

/// Renders the manager's current snapshot. Never triggers a load.
#[derive(Clone)]
pub struct RuntimeConfigHandler {
    manager: Manager<RuntimeConfigValues>,
    default_limits: Arc<Limits>,
}

impl RuntimeConfigHandler {
    pub fn new(manager: Manager<RuntimeConfigValues>, default_limits: Limits) -> Self {
        Self {
            manager,
            default_limits: Arc::new(default_limits),
        }
    }

    pub fn manager(&self) -> &Manager<RuntimeConfigValues> {
        &self.manager
    }

    pub fn render(&self, mode: RenderMode) -> Result<Rendered, RenderError> {
        let Some(cfg) = self.manager.current() else {
            return Ok(Rendered::Placeholder);
        };

        let body = match mode {
            RenderMode::Full => serde_yaml::to_string(cfg.as_ref())?,
            RenderMode::Diff => {
                let baseline = self.baseline(&cfg);
                let diff = diff_config(&to_mapping(&baseline)?, &to_mapping(cfg.as_ref())?);
                serde_yaml::to_string(&diff)?
            }
        };
        Ok(Rendered::Yaml(body))
    }

    /// Every tenant with an override mapped to the process defaults, so the
    /// diff shows only per-tenant differences.
    fn baseline(&self, cfg: &RuntimeConfigValues) -> RuntimeConfigValues {
        RuntimeConfigValues {
            tenant_limits: cfg
                .tenant_limits
                .iter()
                .filter(|(_, limits)| limits.is_some())
                .map(|(tenant, _)| (tenant.clone(), Some(self.default_limits.as_ref().clone())))
                .collect(),
            ..RuntimeConfigValues::default()
        }
    }
}

fn to_mapping<T: Serialize>(value: &T) -> Result<Mapping, RenderError> {
    match serde_yaml::to_value(value)? {
        Value::Mapping(mapping) => Ok(mapping),
        _ => Err(RenderError::NotAMapping),
    }
}
