pub mod dashboard;
pub mod diagnostics;
pub mod fortimanager;
pub mod health;
pub mod monitor;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /status                                          FortiManager system status
/// /adoms                                           list ADOMs
/// /adoms/{adom}/devices                            list managed devices
/// /adoms/{adom}/devices/{name}                     single device
/// /adoms/{adom}/packages                           policy packages (folders flattened)
/// /adoms/{adom}/packages/{package}/policies        firewall policies
/// /adoms/{adom}/packages/{package}/install         install package (POST)
/// /adoms/{adom}/addresses                          firewall address objects
/// /tasks/{id}                                      FortiManager task progress
///
/// /monitor                                         monitor status
/// /monitor/start                                   start polling (POST)
/// /monitor/stop                                    stop polling (POST)
/// /events                                          recent events (?limit=)
///
/// /dashboard/summary                               device counts (?adom=)
/// /dashboard/traffic                               traffic chart (?points=, mock mode)
/// /dashboard/threats                               threat counts (mock mode)
///
/// /diagnostics/auth                                auth/permission report (?adoms=)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(fortimanager::router())
        .merge(monitor::router())
        .nest("/dashboard", dashboard::router())
        .nest("/diagnostics", diagnostics::router())
}
