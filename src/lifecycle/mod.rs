//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → First runtime config load → Start listeners
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop HTTP server → Stop manager → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     SIGHUP → Trigger runtime config reload
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then the manager, then listeners
//! - Ordered shutdown: stop accepting, then stop the manager

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{spawn_file_watcher, start_runtime_config, StartupError};
