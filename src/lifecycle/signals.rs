//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for SIGTERM/SIGINT and hand control back for graceful shutdown
//! - Translate SIGHUP into an immediate runtime config reload
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - SIGHUP triggers a reload, not shutdown

use crate::runtime::{Manager, ManagerError};

/// Resolve once the process is asked to terminate.
pub async fn wait_for_shutdown() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

/// Reload `manager` on every SIGHUP until it stops.
#[cfg(unix)]
pub async fn reload_on_sighup<T: Send + Sync + 'static>(manager: Manager<T>) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(sig) => sig,
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for SIGHUP");
            return;
        }
    };

    while hangup.recv().await.is_some() {
        tracing::info!("Received SIGHUP, reloading runtime config");
        match manager.reload().await {
            Ok(outcome) => tracing::info!(?outcome, "Runtime config reloaded on SIGHUP"),
            Err(ManagerError::NotRunning) => break,
            Err(e) => tracing::warn!(error = %e, "SIGHUP reload failed, keeping previous config"),
        }
    }
}

#[cfg(not(unix))]
pub async fn reload_on_sighup<T: Send + Sync + 'static>(_manager: Manager<T>) {}
