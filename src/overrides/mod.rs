//! Runtime overrides for the monitoring platform.
//!
//! # Data Flow
//! ```text
//! runtime config document (YAML)
//!     → loader.rs (strict decode, role-gated tenant validation)
//!     → RuntimeConfigValues snapshot (values.rs)
//!     → accessors.rs (tenant limits, multi-KV stream, instance limits)
//! ```
//!
//! # Design Decisions
//! - Payload types reject unknown fields at every level
//! - A tenant mapped to null has no override; an empty record overrides with zeros
//! - Validation runs only on processes that enforce tenant limits

pub mod accessors;
pub mod limits;
pub mod loader;
pub mod roles;
pub mod values;

pub use accessors::{
    instance_limits_getter, multi_kv_config_channel, MultiKvConfigProvider, TenantLimitsSource,
    TenantOverrides,
};
pub use limits::{Limits, LimitsError};
pub use loader::RuntimeConfigLoader;
pub use roles::{Role, RoleSet};
pub use values::{InstanceLimits, MultiRuntimeConfig, RuntimeConfigValues};
