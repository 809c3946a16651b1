//! ADOM-scoped configuration objects: ADOMs, policy packages, firewall
//! policies, address objects, install tasks and admin accounts.
//!
//! All models deserialize from FortiManager's native field names and
//! tolerate both verbose (string) and compact (integer) encodings.

use serde::{Deserialize, Deserializer, Serialize};

use crate::lenient;
use crate::permission::RpcPermit;

/// An Administrative Domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adom {
    pub name: String,
    #[serde(default, alias = "desc", deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub os_ver: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub mr: Option<i64>,
}

/// FortiManager `/sys/status` response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    #[serde(default, alias = "Hostname", deserialize_with = "lenient::opt_string")]
    pub hostname: Option<String>,
    #[serde(default, alias = "Version", deserialize_with = "lenient::opt_string")]
    pub version: Option<String>,
    #[serde(default, alias = "Serial Number", deserialize_with = "lenient::opt_string")]
    pub serial: Option<String>,
    #[serde(default, alias = "Platform Type", deserialize_with = "lenient::opt_string")]
    pub platform: Option<String>,
    #[serde(
        default,
        alias = "Admin Domain Configuration",
        deserialize_with = "lenient::opt_string"
    )]
    pub adom_mode: Option<String>,
    #[serde(default, alias = "HA Mode", deserialize_with = "lenient::opt_string")]
    pub ha_mode: Option<String>,
}

/// A policy package, possibly nested in folders.
///
/// `path` is the slash-joined folder path FortiManager expects in
/// `/pm/config/adom/{adom}/pkg/{path}` URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyPackage {
    pub name: String,
    pub path: String,
    /// Install targets as `device` or `device/vdom`.
    #[serde(default)]
    pub scope: Vec<String>,
}

/// Verdict of a firewall policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    #[default]
    Deny,
    Accept,
    Ipsec,
    Other,
}

impl<'de> Deserialize<'de> for PolicyAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = lenient::opt_string(deserializer)?;
        Ok(match raw.as_deref() {
            Some("accept" | "1") => Self::Accept,
            Some("deny" | "0") | None => Self::Deny,
            Some("ipsec" | "2") => Self::Ipsec,
            Some(_) => Self::Other,
        })
    }
}

fn enabled() -> bool {
    true
}

/// An IPv4 firewall policy inside a policy package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirewallPolicy {
    #[serde(deserialize_with = "lenient::i64_or_zero")]
    pub policyid: i64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub srcintf: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub dstintf: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub srcaddr: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub dstaddr: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub service: Vec<String>,
    #[serde(default)]
    pub action: PolicyAction,
    #[serde(default = "enabled", alias = "status", deserialize_with = "lenient::enable_flag")]
    pub enabled: bool,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub schedule: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub logtraffic: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub comments: Option<String>,
}

/// A firewall address object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressObject {
    pub name: String,
    /// `ipmask`, `iprange`, `fqdn`, `geography`, ...
    #[serde(default, alias = "type", deserialize_with = "lenient::opt_string")]
    pub kind: Option<String>,
    /// Address and netmask, e.g. `["10.0.0.0", "255.255.255.0"]`.
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub subnet: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub fqdn: Option<String>,
    #[serde(default, alias = "comment", deserialize_with = "lenient::opt_string")]
    pub comments: Option<String>,
}

/// Lifecycle of a FortiManager background task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Running,
    Cancelling,
    Cancelled,
    Done,
    Error,
    Aborting,
    Aborted,
    Warning,
    ToContinue,
    #[default]
    Unknown,
}

impl TaskState {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Pending,
            1 => Self::Running,
            2 => Self::Cancelling,
            3 => Self::Cancelled,
            4 => Self::Done,
            5 => Self::Error,
            6 => Self::Aborting,
            7 => Self::Aborted,
            8 => Self::Warning,
            9 => Self::ToContinue,
            _ => Self::Unknown,
        }
    }

    /// Whether the task will make no further progress.
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Done | Self::Error | Self::Aborted | Self::Warning
        )
    }
}

impl<'de> Deserialize<'de> for TaskState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = lenient::opt_string(deserializer)?;
        let Some(raw) = raw else {
            return Ok(Self::Unknown);
        };
        if let Ok(code) = raw.parse::<i64>() {
            return Ok(Self::from_code(code));
        }
        Ok(match raw.as_str() {
            "pending" => Self::Pending,
            "running" => Self::Running,
            "cancelling" => Self::Cancelling,
            "cancelled" => Self::Cancelled,
            "done" => Self::Done,
            "error" => Self::Error,
            "aborting" => Self::Aborting,
            "aborted" => Self::Aborted,
            "warning" => Self::Warning,
            "to_continue" => Self::ToContinue,
            _ => Self::Unknown,
        })
    }
}

/// Progress of a FortiManager task (`/task/task/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    #[serde(deserialize_with = "lenient::i64_or_zero")]
    pub id: i64,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub title: Option<String>,
    #[serde(default)]
    pub state: TaskState,
    #[serde(default, deserialize_with = "lenient::i64_or_zero")]
    pub percent: i64,
    #[serde(default, deserialize_with = "lenient::i64_or_zero")]
    pub num_done: i64,
    #[serde(default, deserialize_with = "lenient::i64_or_zero")]
    pub num_err: i64,
    #[serde(default, deserialize_with = "lenient::i64_or_zero")]
    pub num_lines: i64,
    /// Unix seconds.
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub start_tm: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub end_tm: Option<i64>,
}

/// A device (and optional VDOM) to install a policy package onto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallTarget {
    pub name: String,
    #[serde(default)]
    pub vdom: Option<String>,
}

/// The API-relevant part of an admin account
/// (`/cli/global/system/admin/user/{name}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    pub userid: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub profileid: Option<String>,
    #[serde(default, rename = "rpc-permit")]
    pub rpc_permit: RpcPermit,
    /// ADOMs the account may access; empty or `all_adoms` means all.
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub adom: Vec<String>,
}

impl AdminUser {
    /// Whether the account is assigned to `adom`.
    pub fn has_adom(&self, adom: &str) -> bool {
        self.adom.is_empty()
            || self
                .adom
                .iter()
                .any(|a| a == adom || a == "all_adoms" || a == "all")
    }
}
