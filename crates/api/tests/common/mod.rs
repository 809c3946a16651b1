#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use fortidash_events::EventBus;
use fortidash_fortimanager::config::MonitorConfig;
use fortidash_fortimanager::{FortiManagerApi, MockFortiManager};
use http_body_util::BodyExt;
use tower::ServiceExt;

use fortidash_api::config::ServerConfig;
use fortidash_api::router::build_app_router;
use fortidash_api::state::AppState;

pub const TEST_SEED: u64 = 11;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        event_log_capacity: 50,
    }
}

/// A mock backend whose devices never flap on their own.
pub fn quiet_mock() -> Arc<MockFortiManager> {
    Arc::new(MockFortiManager::new(TEST_SEED).with_flap_probability(0.0))
}

/// App state over `backend`, with mock widgets enabled when `mock_widgets`.
pub fn test_state(backend: Arc<dyn FortiManagerApi>, mock_widgets: bool) -> AppState {
    AppState::new(
        test_config(),
        backend,
        Arc::new(EventBus::default()),
        MonitorConfig::new("root", Duration::from_secs(60)),
        mock_widgets.then_some(TEST_SEED),
    )
}

/// Build the full application router with all middleware layers.
pub fn build_test_app(state: AppState) -> Router {
    build_app_router(state, &test_config())
}

/// Router over a quiet mock backend in mock mode.
pub fn mock_app() -> Router {
    build_test_app(test_state(quiet_mock(), true))
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post(app: Router, uri: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
