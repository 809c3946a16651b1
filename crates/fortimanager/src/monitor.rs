//! Background device monitor.
//!
//! [`FortigateMonitor`] polls one ADOM's device list on a fixed interval,
//! keeps the latest snapshot for the HTTP layer, and turns the difference
//! between consecutive polls into [`DashboardEvent`]s on the shared
//! [`EventBus`]. Listeners subscribe to the bus.
//!
//! Failed polls back off exponentially (see [`crate::backoff`]) and the
//! first success afterwards publishes `monitor.recovered`.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use fortidash_core::dashboard::{summarize, DashboardSummary};
use fortidash_core::device::{ConnStatus, ManagedDevice};
use fortidash_core::event_names;
use fortidash_core::types::Timestamp;
use fortidash_events::{DashboardEvent, EventBus};
use serde::Serialize;
use serde_json::json;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::FortiManagerApi;
use crate::backoff::{delay_for, BackoffConfig};
use crate::config::MonitorConfig;
use crate::error::FortiManagerError;

/// How long [`FortigateMonitor::stop`] waits for the loop to exit.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// One successful poll.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub adom: String,
    pub polled_at: Timestamp,
    /// Keyed by device name.
    pub devices: BTreeMap<String, ManagedDevice>,
    pub summary: DashboardSummary,
}

impl MonitorSnapshot {
    pub fn new(adom: impl Into<String>, devices: Vec<ManagedDevice>) -> Self {
        let devices: BTreeMap<String, ManagedDevice> =
            devices.into_iter().map(|d| (d.name.clone(), d)).collect();
        let summary = summarize(devices.values());
        Self {
            adom: adom.into(),
            polled_at: Utc::now(),
            devices,
            summary,
        }
    }
}

/// Difference between two consecutive polls for a single device.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum DeviceChange {
    Added {
        device: ManagedDevice,
    },
    Removed {
        device: ManagedDevice,
    },
    StatusChanged {
        device: ManagedDevice,
        from: ConnStatus,
        to: ConnStatus,
    },
}

impl DeviceChange {
    pub fn device(&self) -> &ManagedDevice {
        match self {
            Self::Added { device } | Self::Removed { device } | Self::StatusChanged { device, .. } => {
                device
            }
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Added { .. } => event_names::DEVICE_ADDED,
            Self::Removed { .. } => event_names::DEVICE_REMOVED,
            Self::StatusChanged { .. } => event_names::DEVICE_STATUS_CHANGED,
        }
    }

    fn to_event(&self, adom: &str) -> DashboardEvent {
        let device = self.device();
        let payload = match self {
            Self::StatusChanged { from, to, .. } => json!({
                "from": from,
                "to": to,
                "ip": device.ip,
                "platform": device.platform,
            }),
            _ => json!({
                "status": device.conn_status,
                "ip": device.ip,
                "platform": device.platform,
            }),
        };
        DashboardEvent::new(self.event_type())
            .with_source("device", device.name.clone())
            .with_adom(adom)
            .with_payload(payload)
    }
}

/// Changes from `previous` to `current`, ordered by device name.
pub fn diff_snapshots(
    previous: &BTreeMap<String, ManagedDevice>,
    current: &BTreeMap<String, ManagedDevice>,
) -> Vec<DeviceChange> {
    let mut changes = Vec::new();

    for (name, device) in current {
        match previous.get(name) {
            None => changes.push(DeviceChange::Added {
                device: device.clone(),
            }),
            Some(old) if old.conn_status != device.conn_status => {
                changes.push(DeviceChange::StatusChanged {
                    device: device.clone(),
                    from: old.conn_status,
                    to: device.conn_status,
                })
            }
            Some(_) => {}
        }
    }

    for (name, device) in previous {
        if !current.contains_key(name) {
            changes.push(DeviceChange::Removed {
                device: device.clone(),
            });
        }
    }

    changes.sort_by(|a, b| a.device().name.cmp(&b.device().name));
    changes
}

/// Monitor health as reported by `GET /api/v1/monitor`.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatus {
    pub running: bool,
    pub adom: String,
    pub interval_secs: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub last_poll: Option<Timestamp>,
    pub last_success: Option<Timestamp>,
    pub device_count: Option<usize>,
}

#[derive(Default)]
struct MonitorState {
    latest: Option<Arc<MonitorSnapshot>>,
    consecutive_failures: u32,
    last_error: Option<String>,
    last_poll: Option<Timestamp>,
}

struct RunningTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct FortigateMonitor {
    api: Arc<dyn FortiManagerApi>,
    bus: Arc<EventBus>,
    config: MonitorConfig,
    state: RwLock<MonitorState>,
    task: Mutex<Option<RunningTask>>,
}

impl FortigateMonitor {
    pub fn new(api: Arc<dyn FortiManagerApi>, bus: Arc<EventBus>, config: MonitorConfig) -> Self {
        Self {
            api,
            bus,
            config,
            state: RwLock::new(MonitorState::default()),
            task: Mutex::new(None),
        }
    }

    pub fn adom(&self) -> &str {
        &self.config.adom
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }

    /// Receive the device and monitor events this monitor publishes.
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.bus.subscribe()
    }

    /// Spawn the polling loop. Returns `false` if it was already running.
    pub async fn start(self: &Arc<Self>) -> bool {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|t| !t.handle.is_finished()) {
            return false;
        }

        let cancel = CancellationToken::new();
        let monitor = Arc::clone(self);
        let loop_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            monitor.run(loop_cancel).await;
        });

        *task = Some(RunningTask { cancel, handle });

        tracing::info!(
            adom = %self.config.adom,
            interval_secs = self.config.interval.as_secs(),
            "Device monitor started",
        );
        self.bus.publish(
            DashboardEvent::new(event_names::MONITOR_STARTED)
                .with_adom(self.config.adom.clone())
                .with_payload(json!({ "interval_secs": self.config.interval.as_secs() })),
        );
        true
    }

    /// Cancel the loop and wait up to five seconds for it to exit before
    /// aborting it. Returns `false` if it was not running.
    pub async fn stop(&self) -> bool {
        let Some(running) = self.task.lock().await.take() else {
            return false;
        };

        running.cancel.cancel();
        let mut handle = running.handle;
        if tokio::time::timeout(STOP_TIMEOUT, &mut handle).await.is_err() {
            tracing::warn!(adom = %self.config.adom, "Device monitor did not stop in time, aborting");
            handle.abort();
        }

        tracing::info!(adom = %self.config.adom, "Device monitor stopped");
        self.bus.publish(
            DashboardEvent::new(event_names::MONITOR_STOPPED).with_adom(self.config.adom.clone()),
        );
        true
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|t| !t.handle.is_finished())
    }

    /// The most recent successful poll.
    pub async fn latest(&self) -> Option<Arc<MonitorSnapshot>> {
        self.state.read().await.latest.clone()
    }

    pub async fn status(&self) -> MonitorStatus {
        let running = self.is_running().await;
        let state = self.state.read().await;
        MonitorStatus {
            running,
            adom: self.config.adom.clone(),
            interval_secs: self.config.interval.as_secs(),
            consecutive_failures: state.consecutive_failures,
            last_error: state.last_error.clone(),
            last_poll: state.last_poll,
            last_success: state.latest.as_ref().map(|s| s.polled_at),
            device_count: state.latest.as_ref().map(|s| s.devices.len()),
        }
    }

    /// Poll once, update the snapshot and publish events.
    ///
    /// The first successful poll only establishes the baseline and
    /// reports no changes.
    pub async fn poll_once(&self) -> Result<Vec<DeviceChange>, FortiManagerError> {
        let adom = self.config.adom.as_str();
        let result = self.api.list_devices(adom).await;
        let now = Utc::now();

        let devices = match result {
            Ok(devices) => devices,
            Err(e) => {
                let failures = {
                    let mut state = self.state.write().await;
                    state.consecutive_failures += 1;
                    state.last_error = Some(e.to_string());
                    state.last_poll = Some(now);
                    state.consecutive_failures
                };
                tracing::warn!(adom, failures, error = %e, "Device poll failed");
                self.bus.publish(
                    DashboardEvent::new(event_names::MONITOR_POLL_FAILED)
                        .with_adom(adom)
                        .with_payload(json!({
                            "error": e.to_string(),
                            "consecutive_failures": failures,
                        })),
                );
                return Err(e);
            }
        };

        let snapshot = Arc::new(MonitorSnapshot::new(adom, devices));
        let (changes, recovered_after) = {
            let mut state = self.state.write().await;
            let changes = state
                .latest
                .as_ref()
                .map(|previous| diff_snapshots(&previous.devices, &snapshot.devices))
                .unwrap_or_default();
            let recovered_after = state.consecutive_failures;
            state.latest = Some(Arc::clone(&snapshot));
            state.consecutive_failures = 0;
            state.last_error = None;
            state.last_poll = Some(now);
            (changes, recovered_after)
        };

        if recovered_after > 0 {
            tracing::info!(adom, failures = recovered_after, "Device polling recovered");
            self.bus.publish(
                DashboardEvent::new(event_names::MONITOR_RECOVERED)
                    .with_adom(adom)
                    .with_payload(json!({ "failed_polls": recovered_after })),
            );
        }

        for change in &changes {
            tracing::info!(
                adom,
                device = %change.device().name,
                event = change.event_type(),
                "Device change detected",
            );
            self.bus.publish(change.to_event(adom));
        }

        tracing::debug!(
            adom,
            devices = snapshot.devices.len(),
            up = snapshot.summary.devices_up,
            changes = changes.len(),
            "Device poll complete",
        );
        Ok(changes)
    }

    async fn run(&self, cancel: CancellationToken) {
        let backoff = BackoffConfig {
            initial_delay: self.config.interval,
            max_delay: self.config.max_backoff,
            ..Default::default()
        };

        loop {
            let delay = tokio::select! {
                _ = cancel.cancelled() => break,
                result = self.poll_once() => match result {
                    Ok(_) => self.config.interval,
                    Err(_) => {
                        let failures = self.state.read().await.consecutive_failures;
                        delay_for(failures, &backoff)
                    }
                },
            };

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        tracing::debug!(adom = %self.config.adom, "Device monitor loop exited");
    }
}
