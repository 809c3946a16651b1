//! Canonical event type names published on the dashboard event bus.

/// A device appeared in a poll that was absent from the previous one.
pub const DEVICE_ADDED: &str = "device.added";

/// A device present in the previous poll is gone.
pub const DEVICE_REMOVED: &str = "device.removed";

/// A device's FortiManager connection status changed between polls.
pub const DEVICE_STATUS_CHANGED: &str = "device.status_changed";

/// The monitor loop began polling.
pub const MONITOR_STARTED: &str = "monitor.started";

/// The monitor loop was stopped.
pub const MONITOR_STOPPED: &str = "monitor.stopped";

/// A poll against FortiManager failed.
pub const MONITOR_POLL_FAILED: &str = "monitor.poll_failed";

/// The first successful poll after one or more failures.
pub const MONITOR_RECOVERED: &str = "monitor.recovered";

/// A policy package install was submitted through the API.
pub const PACKAGE_INSTALL_REQUESTED: &str = "package.install_requested";
