//! Integration tests for monitor control and the event feed.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, post, quiet_mock, test_state};
use fortidash_core::event_names;

#[tokio::test]
async fn status_before_start() {
    let app = build_test_app(test_state(quiet_mock(), true));

    let response = get(app, "/api/v1/monitor").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["running"], false);
    assert_eq!(json["data"]["adom"], "root");
    assert_eq!(json["data"]["interval_secs"], 60);
    assert!(json["data"]["last_poll"].is_null());
}

#[tokio::test]
async fn start_and_stop() {
    let app = build_test_app(test_state(quiet_mock(), true));

    let json = body_json(post(app.clone(), "/api/v1/monitor/start").await).await;
    assert_eq!(json["data"]["changed"], true);
    assert_eq!(json["data"]["status"]["running"], true);

    let json = body_json(post(app.clone(), "/api/v1/monitor/start").await).await;
    assert_eq!(json["data"]["changed"], false);

    let json = body_json(get(app.clone(), "/health").await).await;
    assert_eq!(json["monitor_running"], true);

    let json = body_json(post(app.clone(), "/api/v1/monitor/stop").await).await;
    assert_eq!(json["data"]["changed"], true);
    assert_eq!(json["data"]["status"]["running"], false);

    let json = body_json(post(app, "/api/v1/monitor/stop").await).await;
    assert_eq!(json["data"]["changed"], false);
}

#[tokio::test]
async fn events_feed_records_monitor_lifecycle() {
    let state = test_state(quiet_mock(), true);
    let log = Arc::clone(&state.event_log);
    let rx = state.event_bus.subscribe();
    tokio::spawn(async move { log.run(rx).await });
    let app = build_test_app(state);

    post(app.clone(), "/api/v1/monitor/start").await;
    post(app.clone(), "/api/v1/monitor/stop").await;

    let mut types = Vec::new();
    for _ in 0..50 {
        let json = body_json(get(app.clone(), "/api/v1/events?limit=10").await).await;
        types = json["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["event_type"].as_str().unwrap().to_string())
            .collect();
        if types.len() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // Newest first.
    assert_eq!(
        types,
        [event_names::MONITOR_STOPPED, event_names::MONITOR_STARTED]
    );
}

#[tokio::test]
async fn events_limit_is_clamped() {
    let state = test_state(quiet_mock(), true);
    for _ in 0..5 {
        state
            .event_log
            .record(fortidash_events::DashboardEvent::new(event_names::MONITOR_POLL_FAILED))
            .await;
    }
    let app = build_test_app(state);

    let json = body_json(get(app.clone(), "/api/v1/events?limit=0").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let json = body_json(get(app, "/api/v1/events?limit=2").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}
