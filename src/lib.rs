//! Runtime configuration manager library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod overrides;
pub mod resilience;
pub mod runtime;
pub mod source;

pub use config::schema::ProcessConfig;
pub use http::{HttpServer, RuntimeConfigHandler};
pub use lifecycle::Shutdown;
pub use runtime::{Loader, Manager, ManagerConfig};
