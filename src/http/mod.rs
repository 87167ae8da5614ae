//! Diagnostic HTTP surface.
//!
//! # Data Flow
//! ```text
//! GET /runtime_config[?mode=diff]
//!     → server.rs (Axum setup, middleware)
//!     → handler.rs (read Manager::current())
//!     → diff.rs (only in diff mode: compare against default limits)
//!     → YAML body, or a placeholder before the first load
//! ```

pub mod diff;
pub mod handler;
pub mod server;

pub use handler::{RenderError, RenderMode, Rendered, RuntimeConfigHandler, PLACEHOLDER};
pub use server::{router, HttpServer};
