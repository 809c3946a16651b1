//! Device monitor control and the recent-event feed.

use axum::extract::{Query, State};
use axum::Json;
use fortidash_events::DashboardEvent;
use fortidash_fortimanager::monitor::MonitorStatus;
use serde::Serialize;

use crate::error::AppResult;
use crate::query::LimitParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of a start/stop request.
#[derive(Debug, Serialize)]
pub struct MonitorControlResponse {
    /// Whether the request changed anything.
    pub changed: bool,
    pub status: MonitorStatus,
}

/// GET /monitor
pub async fn get_status(State(state): State<AppState>) -> AppResult<Json<DataResponse<MonitorStatus>>> {
    Ok(Json(DataResponse {
        data: state.monitor.status().await,
    }))
}

/// POST /monitor/start
pub async fn start(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MonitorControlResponse>>> {
    let changed = state.monitor.start().await;
    Ok(Json(DataResponse {
        data: MonitorControlResponse {
            changed,
            status: state.monitor.status().await,
        },
    }))
}

/// POST /monitor/stop
pub async fn stop(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MonitorControlResponse>>> {
    let changed = state.monitor.stop().await;
    Ok(Json(DataResponse {
        data: MonitorControlResponse {
            changed,
            status: state.monitor.status().await,
        },
    }))
}

/// GET /events?limit=
///
/// Newest first.
pub async fn recent_events(
    State(state): State<AppState>,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<DashboardEvent>>>> {
    let events = state.event_log.recent(params.clamped()).await;
    Ok(Json(DataResponse { data: events }))
}
