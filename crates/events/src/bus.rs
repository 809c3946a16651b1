//! Device and monitor notifications.
//!
//! The monitor and the API publish [`DashboardEvent`]s; the event log and
//! any other listener receive every event published after they subscribed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

/// Events buffered per receiver before a slow one starts lagging.
const CHANNEL_CAPACITY: usize = 1024;

/// A change seen on FortiManager or in the dashboard's own lifecycle.
///
/// `event_type` is one of the names in `fortidash_core::event_names`.
/// Device events carry the device name as `source_entity_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardEvent {
    pub event_type: String,
    pub source_entity_type: Option<String>,
    pub source_entity_id: Option<String>,
    pub adom: Option<String>,
    /// Event-specific details, `{}` when there are none.
    pub payload: Value,
    pub timestamp: DateTime<Utc>,
}

impl DashboardEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            adom: None,
            payload: Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Name what the event is about, e.g. `("device", "FGT-HQ-01")`.
    pub fn with_source(mut self, kind: impl Into<String>, id: impl Into<String>) -> Self {
        self.source_entity_type = Some(kind.into());
        self.source_entity_id = Some(id.into());
        self
    }

    pub fn with_adom(mut self, adom: impl Into<String>) -> Self {
        self.adom = Some(adom.into());
        self
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }
}

/// Broadcast hub shared as `Arc<EventBus>`.
///
/// Dropping the last handle closes the channel, which ends
/// [`EventLog::run`](crate::log::EventLog::run).
///
/// ```rust
/// use fortidash_events::bus::{DashboardEvent, EventBus};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
/// bus.publish(DashboardEvent::new("device.added").with_adom("root"));
/// assert_eq!(rx.try_recv().unwrap().event_type, "device.added");
/// ```
pub struct EventBus {
    sender: broadcast::Sender<DashboardEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Fan `event` out to current subscribers. Nobody listening is fine.
    pub fn publish(&self, event: DashboardEvent) {
        tracing::debug!(
            event_type = %event.event_type,
            adom = event.adom.as_deref().unwrap_or(""),
            "Publishing dashboard event",
        );
        if self.sender.send(event).is_err() {
            tracing::trace!("No event subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(CHANNEL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn status_change(device: &str) -> DashboardEvent {
        DashboardEvent::new("device.status_changed")
            .with_source("device", device)
            .with_adom("root")
            .with_payload(json!({ "from": "up", "to": "down" }))
    }

    #[tokio::test]
    async fn subscriber_sees_device_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        bus.publish(status_change("FGT-HQ-01"));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.event_type, "device.status_changed");
        assert_eq!(event.source_entity_type.as_deref(), Some("device"));
        assert_eq!(event.source_entity_id.as_deref(), Some("FGT-HQ-01"));
        assert_eq!(event.adom.as_deref(), Some("root"));
        assert_eq!(event.payload["to"], "down");
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy() {
        let bus = EventBus::default();
        let mut log = bus.subscribe();
        let mut ui = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(DashboardEvent::new("monitor.started"));

        assert_eq!(log.recv().await.unwrap().event_type, "monitor.started");
        assert_eq!(ui.recv().await.unwrap().event_type, "monitor.started");
    }

    #[test]
    fn late_subscriber_misses_earlier_events() {
        let bus = EventBus::default();
        bus.publish(status_change("FGT-A"));

        let mut rx = bus.subscribe();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn bare_event_serializes_empty_payload() {
        let value = serde_json::to_value(DashboardEvent::new("monitor.stopped")).unwrap();
        assert_eq!(value["payload"], json!({}));
        assert!(value["adom"].is_null());
        assert!(value["source_entity_id"].is_null());
    }
}
