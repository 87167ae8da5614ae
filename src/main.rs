//! Runtime configuration daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   runtime config document          ┌──────────────────────────────────────────┐
//!   (filesystem or S3)               │                 DAEMON                   │
//!   ─────────────────────────────────┼─▶ source ──▶ codec ──▶ loader ──┐        │
//!                                    │      ▲                          ▼        │
//!                                    │  poll timer / SIGHUP /     Manager       │
//!                                    │  file watcher              (snapshot)    │
//!                                    │                             │    │       │
//!                                    │                 listeners ◀─┘    ▼       │
//!   GET /runtime_config              │                          http handler    │
//!   ◀────────────────────────────────┼──────────────────────────────┘           │
//!                                    └──────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use runtime_config::config::load_config;
use runtime_config::http::{HttpServer, RuntimeConfigHandler};
use runtime_config::lifecycle::{signals, spawn_file_watcher, start_runtime_config, Shutdown};
use runtime_config::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "runtime-config", about = "Serves and reloads runtime configuration overrides")]
struct Args {
    /// Path to the process configuration file (TOML).
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the comma-separated role list from the config file.
    #[arg(long)]
    target: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(target) = args.target {
        config.target = target;
    }

    logging::init_logging(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %args.config.display(),
        target = %config.target,
        "runtime-config starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let manager = match start_runtime_config(&config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load runtime config");
            return Err(e.into());
        }
    };
    tracing::info!(
        file = %config.runtime_config.file,
        reload_period_secs = config.runtime_config.reload_period_secs,
        "Runtime config loaded"
    );

    let _watcher = spawn_file_watcher(&config, &manager)?;
    tokio::spawn(signals::reload_on_sighup(manager.clone()));

    let listener = TcpListener::bind(&config.server.http_listen_address).await?;
    let handler = RuntimeConfigHandler::new(manager.clone(), config.limits.clone());
    let server = HttpServer::new(handler, &config.server);

    let shutdown = Shutdown::new();
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::wait_for_shutdown().await;
    tracing::info!("Shutting down");
    shutdown.trigger();

    if let Err(e) = server_task.await? {
        tracing::error!(error = %e, "HTTP server exited with error");
    }
    manager.stop().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
