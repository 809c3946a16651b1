//! Bounded history of recent dashboard events.
//!
//! [`EventLog`] subscribes to the [`EventBus`](crate::bus::EventBus) and
//! keeps the newest `capacity` events in memory. It runs as a long-lived
//! background task and shuts down when the bus sender is dropped.

use std::collections::VecDeque;

use tokio::sync::{broadcast, RwLock};

use crate::bus::DashboardEvent;

/// Default number of events retained.
pub const DEFAULT_LOG_CAPACITY: usize = 200;

pub struct EventLog {
    capacity: usize,
    events: RwLock<VecDeque<DashboardEvent>>,
}

impl EventLog {
    /// A zero capacity is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            events: RwLock::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append an event, evicting the oldest one when full.
    pub async fn record(&self, event: DashboardEvent) {
        let mut events = self.events.write().await;
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    /// Up to `limit` events, newest first.
    pub async fn recent(&self, limit: usize) -> Vec<DashboardEvent> {
        self.events
            .read()
            .await
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }

    /// Run the recording loop.
    ///
    /// Exits when the channel is closed (i.e. the
    /// [`EventBus`](crate::bus::EventBus) is dropped).
    pub async fn run(&self, mut receiver: broadcast::Receiver<DashboardEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.record(event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Event log lagged, some events were not recorded");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, event log shutting down");
                    break;
                }
            }
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::bus::EventBus;

    #[tokio::test]
    async fn evicts_oldest_when_full() {
        let log = EventLog::new(2);
        log.record(DashboardEvent::new("one")).await;
        log.record(DashboardEvent::new("two")).await;
        log.record(DashboardEvent::new("three")).await;

        let recent = log.recent(10).await;
        let names: Vec<_> = recent.iter().map(|e| e.event_type.as_str()).collect();
        assert_eq!(names, vec!["three", "two"]);
    }

    #[tokio::test]
    async fn recent_respects_limit() {
        let log = EventLog::new(10);
        for i in 0..5 {
            log.record(DashboardEvent::new(format!("e{i}"))).await;
        }
        let recent = log.recent(2).await;
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].event_type, "e4");
    }

    #[tokio::test]
    async fn zero_capacity_is_bumped() {
        let log = EventLog::new(0);
        assert_eq!(log.capacity(), 1);
        log.record(DashboardEvent::new("only")).await;
        assert_eq!(log.len().await, 1);
    }

    #[tokio::test]
    async fn run_records_until_bus_closes() {
        let bus = EventBus::default();
        let log = Arc::new(EventLog::default());
        let receiver = bus.subscribe();

        let task_log = Arc::clone(&log);
        let handle = tokio::spawn(async move { task_log.run(receiver).await });

        bus.publish(DashboardEvent::new("device.added"));
        bus.publish(DashboardEvent::new("device.removed"));
        drop(bus);

        handle.await.expect("log task should exit cleanly");
        assert_eq!(log.len().await, 2);
        assert_eq!(log.recent(1).await[0].event_type, "device.removed");
    }
}
