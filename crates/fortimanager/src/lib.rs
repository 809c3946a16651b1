//! FortiManager JSON-RPC client and device monitor.
//!
//! Provides the typed request/response envelope, status-code
//! interpretation, session and API-key authentication, ADOM-scoped
//! queries behind the [`FortiManagerApi`] trait, a seeded mock backend,
//! the polling [`FortigateMonitor`] and an authentication diagnostic.

pub mod api;
pub mod auth;
pub mod backoff;
pub mod client;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod mock;
pub mod monitor;
pub mod rpc;
pub mod status;

pub use api::FortiManagerApi;
pub use client::FortiManagerClient;
pub use config::FortiManagerConfig;
pub use error::FortiManagerError;
pub use mock::MockFortiManager;
pub use monitor::FortigateMonitor;
