use axum::routing::{get, post};
use axum::Router;

use crate::handlers::monitor;
use crate::state::AppState;

/// ```text
/// GET  /monitor        -> get_status
/// POST /monitor/start  -> start
/// POST /monitor/stop   -> stop
/// GET  /events         -> recent_events
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/monitor", get(monitor::get_status))
        .route("/monitor/start", post(monitor::start))
        .route("/monitor/stop", post(monitor::stop))
        .route("/events", get(monitor::recent_events))
}
