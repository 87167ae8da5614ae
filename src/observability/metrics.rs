//! Metrics collection and exposition.
//!
//! # Metrics
//! - `runtime_config_last_reload_successful` (gauge): 1 if the last load succeeded
//! - `runtime_config_last_reload_success_timestamp_seconds` (gauge)
//! - `runtime_config_reloads_total` (counter): by `outcome` (updated, unchanged, or the error kind)
//! - `runtime_config_listener_lagged_total` (counter): pending snapshots replaced in slow listeners
//! - `runtime_config_http_requests_total` (counter): endpoint renders by `mode`
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; nothing is recorded until an exporter is installed
//! - Prometheus exporter serves its own HTTP listener

use std::net::SocketAddr;
use std::time::{SystemTime, UNIX_EPOCH};

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_reload_success(outcome: &'static str) {
    gauge!("runtime_config_last_reload_successful").set(1.0);
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();
    gauge!("runtime_config_last_reload_success_timestamp_seconds").set(now);
    counter!("runtime_config_reloads_total", "outcome" => outcome).increment(1);
}

pub fn record_reload_failure(kind: &'static str) {
    gauge!("runtime_config_last_reload_successful").set(0.0);
    counter!("runtime_config_reloads_total", "outcome" => kind).increment(1);
}

pub fn record_listener_lag() {
    counter!("runtime_config_listener_lagged_total").increment(1);
}

pub fn record_http_request(mode: &'static str) {
    counter!("runtime_config_http_requests_total", "mode" => mode).increment(1);
}
