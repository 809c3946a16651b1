//! Domain types and pure logic for the FortiGate dashboard.
//!
//! Nothing in this crate performs I/O. The FortiManager client, the
//! monitor and the HTTP layer all build on these types.

pub mod adom;
pub mod config;
pub mod dashboard;
pub mod device;
pub mod error;
pub mod event_names;
pub mod lenient;
pub mod mock;
pub mod permission;
pub mod policy;
pub mod types;
