//! Tests for the diagnostic HTTP endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use object_store::memory::InMemory;
use tower::ServiceExt;

use runtime_config::http::{router, RuntimeConfigHandler, PLACEHOLDER};
use runtime_config::overrides::{Limits, RuntimeConfigValues};
use runtime_config::runtime::Manager;
use runtime_config::source::WorkingDir;

mod common;

const DOCUMENT: &str = r#"
overrides:
  tenant1:
    ingestion_rate: 10000
    max_exemplars: 1
  tenant2: ~
"#;

async fn started_manager(doc: &str) -> Manager<RuntimeConfigValues> {
    let store = Arc::new(InMemory::new());
    common::put_object(&store, "runtime.yaml", doc).await;
    let manager = common::overrides_manager(
        common::manager_config("runtime.yaml", WorkingDir::Process, Duration::ZERO),
        common::memory_source(store),
    );
    manager.start().await.unwrap();
    manager
}

async fn get(manager: &Manager<RuntimeConfigValues>, uri: &str) -> (StatusCode, Option<String>, String) {
    get_with_defaults(manager, uri, Limits::default()).await
}

async fn get_with_defaults(
    manager: &Manager<RuntimeConfigValues>,
    uri: &str,
    defaults: Limits,
) -> (StatusCode, Option<String>, String) {
    let app = router(RuntimeConfigHandler::new(manager.clone(), defaults));
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(body.to_vec()).unwrap())
}

#[tokio::test]
async fn test_full_mode_serves_current_snapshot() {
    let manager = started_manager(DOCUMENT).await;

    let (status, content_type, body) = get(&manager, "/runtime_config").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/yaml"));

    let served: RuntimeConfigValues = serde_yaml::from_str(&body).unwrap();
    assert_eq!(&served, manager.current().unwrap().as_ref());

    manager.stop().await;
}

#[tokio::test]
async fn test_diff_mode_shows_only_overrides() {
    let manager = started_manager(DOCUMENT).await;

    let (status, _, body) = get(&manager, "/runtime_config?mode=diff").await;
    assert_eq!(status, StatusCode::OK);

    let served: serde_yaml::Value = serde_yaml::from_str(&body).unwrap();
    let expected: serde_yaml::Value = serde_yaml::from_str(
        "overrides:\n  tenant1:\n    ingestion_rate: 10000.0\n    max_exemplars: 1\n  tenant2: ~\n",
    )
    .unwrap();
    assert_eq!(served, expected);

    manager.stop().await;
}

/// Fields a tenant record leaves out decode to zero, so against non-zero
/// process defaults they show up in the diff as effective overrides.
#[tokio::test]
async fn test_diff_against_process_defaults_shows_zeroed_fields() {
    let manager = started_manager(DOCUMENT).await;

    let (status, _, body) =
        get_with_defaults(&manager, "/runtime_config?mode=diff", Limits::process_defaults()).await;
    assert_eq!(status, StatusCode::OK);

    let served: serde_yaml::Value = serde_yaml::from_str(&body).unwrap();
    let expected: serde_yaml::Value = serde_yaml::from_str(
        "overrides:\n  tenant1:\n    ingestion_rate: 10000.0\n    ingestion_burst_size: 0\n    max_label_names_per_series: 0\n    max_label_value_length: 0\n    max_exemplars: 1\n  tenant2: ~\n",
    )
    .unwrap();
    assert_eq!(served, expected);

    manager.stop().await;
}

#[tokio::test]
async fn test_unknown_mode_renders_in_full() {
    let manager = started_manager(DOCUMENT).await;

    let (_, _, full) = get(&manager, "/runtime_config").await;
    let (status, _, other) = get(&manager, "/runtime_config?mode=everything").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(full, other);

    manager.stop().await;
}

#[tokio::test]
async fn test_placeholder_before_first_load() {
    let manager = common::overrides_manager(
        common::manager_config("runtime.yaml", WorkingDir::Process, Duration::ZERO),
        common::memory_source(Arc::new(InMemory::new())),
    );

    let (status, content_type, body) = get(&manager, "/runtime_config").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert_eq!(body, PLACEHOLDER);

    let (status, _, body) = get(&manager, "/runtime_config?mode=diff").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, PLACEHOLDER);
}

#[tokio::test]
async fn test_ready_tracks_manager_state() {
    let manager = started_manager(DOCUMENT).await;

    let (status, _, body) = get(&manager, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["state"], "Running");
    assert_eq!(json["sha256"].as_str().map(str::len), Some(64));

    manager.stop().await;
    let (status, _, _) = get(&manager, "/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
