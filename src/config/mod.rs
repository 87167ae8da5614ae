//! Static process configuration.
//!
//! # Data Flow
//! ```text
//! process config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProcessConfig (validated, immutable)
//!     → builds the runtime config Manager, loader and HTTP server
//!
//! Optional change-triggered reload:
//!     watcher.rs detects a change to the runtime config document
//!     → Manager::reload()
//! ```
//!
//! # Design Decisions
//! - Process config is loaded once; only the runtime config document reloads
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{ProcessConfig, RuntimeConfigSettings, S3Config, StorageBackend};
