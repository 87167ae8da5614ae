//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Reload tick:
//!     → timeouts.rs (bound fetch + decode by the reload timeout)
//!     → On failure: backoff.rs (schedule the next attempt sooner, capped by the period)
//!     → On success: back to the regular reload period
//! ```
//!
//! # Design Decisions
//! - Every fetch has a deadline; a stuck backend cannot delay later ticks forever
//! - Retries never overlap: the next attempt is scheduled only after the previous finished

pub mod backoff;
pub mod timeouts;

pub use backoff::RetryPolicy;
