//! Runtime configuration core.
//!
//! # Data Flow
//! ```text
//! Manager::start()                     poll timer / reload()
//!     → source (fetch raw document)        → same pipeline
//!     → codec.rs (strict, single document)
//!     → Loader (embedding component's validation)
//!     → atomic swap of Arc<T>
//!     → listener.rs (non-blocking fan-out)
//!     → accessors read Manager::current()
//! ```
//!
//! # Design Decisions
//! - Generic over the snapshot type; the manager never interprets payloads
//! - The first load is fatal, later failures are only reported
//! - Readers never block and never block the reload loop

pub mod codec;
pub mod error;
pub mod listener;
pub mod loader;
pub mod manager;

pub use codec::decode_single_document;
pub use error::{LoadError, ManagerError};
pub use listener::{Listener, ListenerId};
pub use loader::Loader;
pub use manager::{ErrorSink, Manager, ManagerConfig, ManagerState, ReloadOutcome};
