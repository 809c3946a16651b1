//! Integration tests for the dashboard widgets.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, build_test_app, get, mock_app, post, quiet_mock, test_state};
use fortidash_core::device::ConnStatus;
use fortidash_fortimanager::FortiManagerApi;

#[tokio::test]
async fn summary_is_live_without_monitor() {
    let response = get(mock_app(), "/api/v1/dashboard/summary").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["adom"], "root");
    assert_eq!(data["source"], "live");
    let total = data["total_devices"].as_u64().unwrap();
    let up = data["devices_up"].as_u64().unwrap();
    let down = data["devices_down"].as_u64().unwrap();
    let unknown = data["devices_unknown"].as_u64().unwrap();
    assert!(total > 0);
    assert_eq!(up + down + unknown, total);
}

#[tokio::test]
async fn summary_uses_monitor_snapshot_once_polled() {
    let app = build_test_app(test_state(quiet_mock(), true));
    post(app.clone(), "/api/v1/monitor/start").await;

    let mut source = String::new();
    for _ in 0..50 {
        let json = body_json(get(app.clone(), "/api/v1/dashboard/summary").await).await;
        source = json["data"]["source"].as_str().unwrap().to_string();
        if source == "monitor" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(source, "monitor");

    // Other ADOMs still query FortiManager directly.
    let json = body_json(get(app.clone(), "/api/v1/dashboard/summary?adom=datacenter").await).await;
    assert_eq!(json["data"]["source"], "live");
    assert_eq!(json["data"]["adom"], "datacenter");

    post(app, "/api/v1/monitor/stop").await;
}

#[tokio::test]
async fn summary_goes_live_after_monitor_stops() {
    let mock = quiet_mock();
    let app = build_test_app(test_state(Arc::clone(&mock) as Arc<dyn FortiManagerApi>, true));
    post(app.clone(), "/api/v1/monitor/start").await;

    for _ in 0..50 {
        let json = body_json(get(app.clone(), "/api/v1/dashboard/summary").await).await;
        if json["data"]["source"] == "monitor" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    post(app.clone(), "/api/v1/monitor/stop").await;

    let devices = mock.list_devices("root").await.unwrap();
    for device in &devices {
        mock.set_device_status("root", &device.name, ConnStatus::Down).await;
    }

    let json = body_json(get(app, "/api/v1/dashboard/summary").await).await;
    assert_eq!(json["data"]["source"], "live");
    assert_eq!(json["data"]["devices_down"], devices.len());
    assert_eq!(json["data"]["devices_up"], 0);
}

#[tokio::test]
async fn summary_rejects_invalid_adom() {
    let response = get(mock_app(), "/api/v1/dashboard/summary?adom=a%2Fb").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn traffic_series_points_are_clamped() {
    let app = mock_app();

    let json = body_json(get(app.clone(), "/api/v1/dashboard/traffic").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 24);

    let json = body_json(get(app.clone(), "/api/v1/dashboard/traffic?points=5000").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 288);

    let json = body_json(get(app, "/api/v1/dashboard/traffic?points=3").await).await;
    let samples = json["data"].as_array().unwrap();
    assert_eq!(samples.len(), 3);
    assert!(samples[0]["bytes_in"].is_u64());
}

#[tokio::test]
async fn threats_in_mock_mode() {
    let response = get(mock_app(), "/api/v1/dashboard/threats").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["total"].is_u64());
    assert!(json["data"]["by_severity"].is_object());
}

#[tokio::test]
async fn mock_only_widgets_are_unavailable_otherwise() {
    let app = build_test_app(test_state(quiet_mock(), false));

    for uri in ["/api/v1/dashboard/traffic", "/api/v1/dashboard/threats"] {
        let response = get(app.clone(), uri).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE, "{uri}");
        assert_eq!(body_json(response).await["code"], "UNAVAILABLE");
    }

    let response = get(app, "/api/v1/dashboard/summary").await;
    assert_eq!(response.status(), StatusCode::OK);
}
