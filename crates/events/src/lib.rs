//! Dashboard event bus and recent-event log.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DashboardEvent`]: the event envelope published by the monitor and
//!   the API.
//! - [`EventLog`]: bounded in-memory history fed from the bus, served by
//!   the `/events` endpoint.

pub mod bus;
pub mod log;

pub use bus::{DashboardEvent, EventBus};
pub use log::EventLog;
