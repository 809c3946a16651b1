//! Managed FortiGate devices as reported by FortiManager's device database.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::lenient;

/// Connection state between FortiManager and a managed device.
///
/// FortiManager reports `conn_status` as `0`/`1`/`2` by default and as
/// `"unknown"`/`"up"`/`"down"` when the request sets `verbose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnStatus {
    #[default]
    Unknown,
    Up,
    Down,
}

impl ConnStatus {
    /// Map the numeric FortiManager code.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::Up,
            2 => Self::Down,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for ConnStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ConnStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => match s.to_ascii_lowercase().as_str() {
                "up" | "1" => Self::Up,
                "down" | "2" => Self::Down,
                _ => Self::Unknown,
            },
            Some(Value::Number(n)) => Self::from_code(n.as_i64().unwrap_or(0)),
            _ => Self::Unknown,
        })
    }
}

/// A FortiGate registered in an ADOM's device database (`/dvmdb`).
///
/// Field aliases accept FortiManager's native names; serialization uses
/// the dashboard's names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagedDevice {
    pub name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ip: Option<String>,
    #[serde(default, alias = "sn", deserialize_with = "lenient::opt_string")]
    pub serial: Option<String>,
    #[serde(default, alias = "platform_str", deserialize_with = "lenient::opt_string")]
    pub platform: Option<String>,
    /// Major version; FortiManager sends `7` or `"7.0"`.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub os_ver: Option<String>,
    /// Minor ("maintenance release") version.
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub mr: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub patch: Option<i64>,
    #[serde(default)]
    pub conn_status: ConnStatus,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub ha_mode: Option<String>,
    #[serde(default, alias = "desc", deserialize_with = "lenient::opt_string")]
    pub description: Option<String>,
}

impl ManagedDevice {
    /// Minimal device record, mostly for tests and generators.
    pub fn new(name: impl Into<String>, conn_status: ConnStatus) -> Self {
        Self {
            name: name.into(),
            hostname: None,
            ip: None,
            serial: None,
            platform: None,
            os_ver: None,
            mr: None,
            patch: None,
            conn_status,
            ha_mode: None,
            description: None,
        }
    }

    /// Firmware as `v{major}.{minor}.{patch}`, or `None` if FortiManager
    /// did not report a major version.
    pub fn firmware(&self) -> Option<String> {
        let major: String = self
            .os_ver
            .as_deref()?
            .trim_start_matches(['v', 'V'])
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        if major.is_empty() {
            return None;
        }
        Some(format!(
            "v{major}.{}.{}",
            self.mr.unwrap_or(0),
            self.patch.unwrap_or(0)
        ))
    }

    pub fn is_up(&self) -> bool {
        self.conn_status == ConnStatus::Up
    }
}
