pub mod dashboard;
pub mod diagnostics;
pub mod fortimanager;
pub mod monitor;
