use std::sync::Arc;

use fortidash_core::mock::MockGenerator;
use fortidash_events::{EventBus, EventLog};
use fortidash_fortimanager::config::MonitorConfig;
use fortidash_fortimanager::{FortiManagerApi, FortigateMonitor};
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Live client or mock backend.
    pub fortimanager: Arc<dyn FortiManagerApi>,
    pub monitor: Arc<FortigateMonitor>,
    pub event_bus: Arc<EventBus>,
    pub event_log: Arc<EventLog>,
    /// Generator for the traffic and threat widgets; `None` outside mock mode.
    pub mock_data: Option<Arc<Mutex<MockGenerator>>>,
    /// ADOM used when a request does not name one.
    pub default_adom: Arc<str>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        fortimanager: Arc<dyn FortiManagerApi>,
        event_bus: Arc<EventBus>,
        monitor_config: MonitorConfig,
        mock_seed: Option<u64>,
    ) -> Self {
        let default_adom: Arc<str> = Arc::from(monitor_config.adom.as_str());
        let event_log = Arc::new(EventLog::new(config.event_log_capacity));
        let monitor = Arc::new(FortigateMonitor::new(
            Arc::clone(&fortimanager),
            Arc::clone(&event_bus),
            monitor_config,
        ));

        Self {
            config: Arc::new(config),
            fortimanager,
            monitor,
            event_bus,
            event_log,
            mock_data: mock_seed.map(|seed| Arc::new(Mutex::new(MockGenerator::new(seed)))),
            default_adom,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.mock_data.is_some()
    }
}
