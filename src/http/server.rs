//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the diagnostic handlers
//! - Wire up middleware (tracing, request timeout)
//! - Bind server to listener and stop on shutdown

use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::schema::ServerConfig;
use crate::http::handler::{Rendered, RenderMode, RuntimeConfigHandler};
use crate::observability::metrics;
use crate::runtime::ManagerState;

#[derive(Debug, Default, Deserialize)]
pub struct ConfigQuery {
    pub mode: Option<String>,
}

/// HTTP server exposing the runtime config endpoint.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(handler: RuntimeConfigHandler, config: &ServerConfig) -> Self {
        Self {
            router: Self::build_router(handler, config),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(handler: RuntimeConfigHandler, config: &ServerConfig) -> Router {
        router(handler)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Routes without middleware.
pub fn router(handler: RuntimeConfigHandler) -> Router {
    Router::new()
        .route("/runtime_config", get(runtime_config))
        .route("/ready", get(ready))
        .with_state(handler)
}

async fn runtime_config(
    State(handler): State<RuntimeConfigHandler>,
    Query(query): Query<ConfigQuery>,
) -> Response {
    let mode = RenderMode::from_query(query.mode.as_deref());
    metrics::record_http_request(mode.as_str());

    match handler.render(mode) {
        Ok(Rendered::Yaml(body)) => ([(header::CONTENT_TYPE, "text/yaml")], body).into_response(),
        Ok(rendered @ Rendered::Placeholder) => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            rendered.body().to_string(),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, mode = mode.as_str(), "Failed to render runtime config");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn ready(State(handler): State<RuntimeConfigHandler>) -> Response {
    let state = handler.manager().state();
    let status = if state == ManagerState::Running {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = serde_json::json!({
        "state": format!("{state:?}"),
        "sha256": handler.manager().last_reload_hash(),
    });
    (status, Json(body)).into_response()
}
