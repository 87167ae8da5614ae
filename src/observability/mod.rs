//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Manager, listeners, HTTP handler produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (reload outcomes, listener lag, endpoint hits)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Reload failures are visible here, never on the config-serving endpoint
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
