//! Handlers that proxy ADOM-scoped FortiManager queries.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use fortidash_core::adom::{validate_adom_name, validate_object_name, validate_package_path};
use fortidash_core::device::ManagedDevice;
use fortidash_core::error::CoreError;
use fortidash_core::event_names;
use fortidash_core::policy::{
    AddressObject, Adom, FirewallPolicy, InstallTarget, PolicyPackage, SystemStatus, TaskStatus,
};
use fortidash_events::DashboardEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /adoms/{adom}/packages/{package}/install`.
#[derive(Debug, Deserialize)]
pub struct InstallRequest {
    pub targets: Vec<InstallTarget>,
}

#[derive(Debug, Serialize)]
pub struct InstallResponse {
    pub task_id: i64,
    pub adom: String,
    pub package: String,
    pub targets: Vec<InstallTarget>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /status
pub async fn system_status(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<SystemStatus>>> {
    let status = state.fortimanager.system_status().await?;
    Ok(Json(DataResponse { data: status }))
}

/// GET /adoms
pub async fn list_adoms(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Adom>>>> {
    let adoms = state.fortimanager.list_adoms().await?;
    Ok(Json(DataResponse { data: adoms }))
}

/// GET /adoms/{adom}/devices
pub async fn list_devices(
    State(state): State<AppState>,
    Path(adom): Path<String>,
) -> AppResult<Json<DataResponse<Vec<ManagedDevice>>>> {
    validate_adom_name(&adom)?;
    let devices = state.fortimanager.list_devices(&adom).await?;
    Ok(Json(DataResponse { data: devices }))
}

/// GET /adoms/{adom}/devices/{name}
pub async fn get_device(
    State(state): State<AppState>,
    Path((adom, name)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<ManagedDevice>>> {
    validate_adom_name(&adom)?;
    validate_object_name("Device", &name)?;
    let device = state.fortimanager.get_device(&adom, &name).await?;
    Ok(Json(DataResponse { data: device }))
}

/// GET /adoms/{adom}/packages
pub async fn list_packages(
    State(state): State<AppState>,
    Path(adom): Path<String>,
) -> AppResult<Json<DataResponse<Vec<PolicyPackage>>>> {
    validate_adom_name(&adom)?;
    let packages = state.fortimanager.list_policy_packages(&adom).await?;
    Ok(Json(DataResponse { data: packages }))
}

/// GET /adoms/{adom}/packages/{package}/policies
///
/// `package` may be a URL-encoded folder path such as `branch%2Fstandard`.
pub async fn list_policies(
    State(state): State<AppState>,
    Path((adom, package)): Path<(String, String)>,
) -> AppResult<Json<DataResponse<Vec<FirewallPolicy>>>> {
    validate_adom_name(&adom)?;
    validate_package_path(&package)?;
    let policies = state
        .fortimanager
        .list_firewall_policies(&adom, &package)
        .await?;
    Ok(Json(DataResponse { data: policies }))
}

/// POST /adoms/{adom}/packages/{package}/install
///
/// Starts an install and answers `202 Accepted` with the FortiManager
/// task id; poll `/tasks/{id}` for progress.
pub async fn install_package(
    State(state): State<AppState>,
    Path((adom, package)): Path<(String, String)>,
    Json(input): Json<InstallRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<InstallResponse>>)> {
    validate_adom_name(&adom)?;
    validate_package_path(&package)?;
    if input.targets.is_empty() {
        return Err(CoreError::Validation("At least one install target is required".into()).into());
    }
    for target in &input.targets {
        validate_object_name("Device", &target.name)?;
    }

    let task_id = state
        .fortimanager
        .install_package(&adom, &package, &input.targets)
        .await?;

    let device_names: Vec<&str> = input.targets.iter().map(|t| t.name.as_str()).collect();
    state.event_bus.publish(
        DashboardEvent::new(event_names::PACKAGE_INSTALL_REQUESTED)
            .with_source("package", package.clone())
            .with_adom(adom.clone())
            .with_payload(json!({
                "task_id": task_id,
                "targets": device_names,
            })),
    );

    tracing::info!(adom = %adom, package = %package, task_id, "Package install requested");

    Ok((
        StatusCode::ACCEPTED,
        Json(DataResponse {
            data: InstallResponse {
                task_id,
                adom,
                package,
                targets: input.targets,
            },
        }),
    ))
}

/// GET /adoms/{adom}/addresses
pub async fn list_addresses(
    State(state): State<AppState>,
    Path(adom): Path<String>,
) -> AppResult<Json<DataResponse<Vec<AddressObject>>>> {
    validate_adom_name(&adom)?;
    let addresses = state.fortimanager.list_address_objects(&adom).await?;
    Ok(Json(DataResponse { data: addresses }))
}

/// GET /tasks/{id}
pub async fn task_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DataResponse<TaskStatus>>> {
    if id <= 0 {
        return Err(CoreError::Validation("Task id must be positive".into()).into());
    }
    let task = state.fortimanager.task_status(id).await?;
    Ok(Json(DataResponse { data: task }))
}
