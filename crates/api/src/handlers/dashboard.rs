//! Dashboard widgets: device summary, traffic chart and threat counts.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use fortidash_core::adom::validate_adom_name;
use fortidash_core::dashboard::{summarize, DashboardSummary};
use fortidash_core::error::CoreError;
use fortidash_core::mock::{ThreatSummary, TrafficSample};
use fortidash_core::types::Timestamp;
use serde::Serialize;

use crate::error::AppResult;
use crate::query::{AdomParams, PointsParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Spacing of traffic samples.
const TRAFFIC_STEP_MINUTES: i64 = 5;

/// Where a summary's device list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    /// The monitor's latest snapshot.
    Monitor,
    /// A direct FortiManager query.
    Live,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub adom: String,
    pub source: SummarySource,
    pub generated_at: Timestamp,
    #[serde(flatten)]
    pub summary: DashboardSummary,
}

/// GET /dashboard/summary?adom=
///
/// Uses the monitor snapshot only while the monitor is polling that ADOM.
pub async fn summary(
    State(state): State<AppState>,
    Query(params): Query<AdomParams>,
) -> AppResult<Json<DataResponse<SummaryResponse>>> {
    let adom = params.adom.unwrap_or_else(|| state.default_adom.to_string());
    validate_adom_name(&adom)?;

    let snapshot = if state.monitor.adom() == adom && state.monitor.is_running().await {
        state.monitor.latest().await
    } else {
        None
    };

    let data = match snapshot {
        Some(snapshot) => SummaryResponse {
            adom,
            source: SummarySource::Monitor,
            generated_at: snapshot.polled_at,
            summary: snapshot.summary.clone(),
        },
        None => {
            let devices = state.fortimanager.list_devices(&adom).await?;
            SummaryResponse {
                adom,
                source: SummarySource::Live,
                generated_at: Utc::now(),
                summary: summarize(&devices),
            }
        }
    };

    Ok(Json(DataResponse { data }))
}

/// GET /dashboard/traffic?points=
///
/// Only available in mock mode; FortiManager does not serve interface
/// throughput.
pub async fn traffic(
    State(state): State<AppState>,
    Query(params): Query<PointsParams>,
) -> AppResult<Json<DataResponse<Vec<TrafficSample>>>> {
    let generator = state.mock_data.as_ref().ok_or_else(mock_only)?;
    let samples = generator.lock().await.traffic_series(
        params.clamped(),
        chrono::Duration::minutes(TRAFFIC_STEP_MINUTES),
        Utc::now(),
    );
    Ok(Json(DataResponse { data: samples }))
}

/// GET /dashboard/threats
pub async fn threats(State(state): State<AppState>) -> AppResult<Json<DataResponse<ThreatSummary>>> {
    let generator = state.mock_data.as_ref().ok_or_else(mock_only)?;
    let summary = generator.lock().await.threat_summary();
    Ok(Json(DataResponse { data: summary }))
}

fn mock_only() -> CoreError {
    CoreError::Unavailable("This widget is only available in mock mode".into())
}
