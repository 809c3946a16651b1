//! Aggregate device statistics for the dashboard landing page.
//!
//! Pure computation over a device list; the caller decides whether the
//! list comes from the monitor snapshot or a direct FortiManager query.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::device::{ConnStatus, ManagedDevice};

/// Label used for devices without a platform or firmware value.
const UNKNOWN_LABEL: &str = "unknown";

/// Counts shown on the dashboard overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub total_devices: usize,
    pub devices_up: usize,
    pub devices_down: usize,
    pub devices_unknown: usize,
    /// Percentage of devices that are up, rounded to one decimal place.
    /// Zero when there are no devices.
    pub availability_percent: f64,
    pub by_platform: BTreeMap<String, usize>,
    pub by_firmware: BTreeMap<String, usize>,
    /// Names of devices that are down, sorted.
    pub down_devices: Vec<String>,
}

/// Build a [`DashboardSummary`] from a device list.
pub fn summarize<'a, I>(devices: I) -> DashboardSummary
where
    I: IntoIterator<Item = &'a ManagedDevice>,
{
    let mut summary = DashboardSummary {
        total_devices: 0,
        devices_up: 0,
        devices_down: 0,
        devices_unknown: 0,
        availability_percent: 0.0,
        by_platform: BTreeMap::new(),
        by_firmware: BTreeMap::new(),
        down_devices: Vec::new(),
    };

    for device in devices {
        summary.total_devices += 1;
        match device.conn_status {
            ConnStatus::Up => summary.devices_up += 1,
            ConnStatus::Down => {
                summary.devices_down += 1;
                summary.down_devices.push(device.name.clone());
            }
            ConnStatus::Unknown => summary.devices_unknown += 1,
        }

        let platform = device
            .platform
            .clone()
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        *summary.by_platform.entry(platform).or_default() += 1;

        let firmware = device
            .firmware()
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        *summary.by_firmware.entry(firmware).or_default() += 1;
    }

    if summary.total_devices > 0 {
        let ratio = summary.devices_up as f64 / summary.total_devices as f64;
        summary.availability_percent = (ratio * 1000.0).round() / 10.0;
    }
    summary.down_devices.sort();
    summary
}
