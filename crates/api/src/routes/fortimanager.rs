use axum::routing::{get, post};
use axum::Router;

use crate::handlers::fortimanager;
use crate::state::AppState;

/// FortiManager proxy routes, merged at the `/api/v1` root.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(fortimanager::system_status))
        .route("/adoms", get(fortimanager::list_adoms))
        .route("/adoms/{adom}/devices", get(fortimanager::list_devices))
        .route("/adoms/{adom}/devices/{name}", get(fortimanager::get_device))
        .route("/adoms/{adom}/packages", get(fortimanager::list_packages))
        .route(
            "/adoms/{adom}/packages/{package}/policies",
            get(fortimanager::list_policies),
        )
        .route(
            "/adoms/{adom}/packages/{package}/install",
            post(fortimanager::install_package),
        )
        .route("/adoms/{adom}/addresses", get(fortimanager::list_addresses))
        .route("/tasks/{id}", get(fortimanager::task_status))
}
