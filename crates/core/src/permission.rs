//! FortiManager admin-account API permissions.
//!
//! Every admin account carries an `rpc-permit` field that gates JSON-RPC
//! access independently of its admin profile. A correctly configured
//! profile with `rpc-permit none` still gets `-11 No permission` on every
//! call, which is the most common API access failure.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::CoreError;
use crate::lenient;

/// Value of an admin account's `rpc-permit` setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RpcPermit {
    #[default]
    None,
    Read,
    ReadWrite,
}

impl RpcPermit {
    pub fn can_read(&self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    pub fn can_write(&self) -> bool {
        matches!(self, Self::ReadWrite)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Read => "read",
            Self::ReadWrite => "read-write",
        }
    }
}

impl fmt::Display for RpcPermit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RpcPermit {
    type Err = CoreError;

    /// Parses the verbose names and the numeric codes (0 read-write,
    /// 1 none, 2 read) FortiManager uses without `verbose`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "1" => Ok(Self::None),
            "read" | "2" => Ok(Self::Read),
            "read-write" | "read_write" | "readwrite" | "0" => Ok(Self::ReadWrite),
            other => Err(CoreError::Validation(format!(
                "unknown rpc-permit value '{other}'"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for RpcPermit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = lenient::opt_string(deserializer)?;
        match raw {
            Some(s) => s.parse().map_err(serde::de::Error::custom),
            None => Ok(Self::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn parses_verbose_and_numeric_forms() {
        assert_eq!("read-write".parse::<RpcPermit>().unwrap(), RpcPermit::ReadWrite);
        assert_eq!("READ".parse::<RpcPermit>().unwrap(), RpcPermit::Read);
        assert_eq!("none".parse::<RpcPermit>().unwrap(), RpcPermit::None);
        assert_eq!("0".parse::<RpcPermit>().unwrap(), RpcPermit::ReadWrite);
        assert_eq!("2".parse::<RpcPermit>().unwrap(), RpcPermit::Read);
        assert_matches!("admin".parse::<RpcPermit>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn access_levels() {
        assert!(!RpcPermit::None.can_read());
        assert!(RpcPermit::Read.can_read());
        assert!(!RpcPermit::Read.can_write());
        assert!(RpcPermit::ReadWrite.can_write());
    }

    #[test]
    fn serde_uses_fortimanager_spelling() {
        assert_eq!(serde_json::to_value(RpcPermit::ReadWrite).unwrap(), "read-write");
        let parsed: RpcPermit = serde_json::from_value(serde_json::json!(2)).unwrap();
        assert_eq!(parsed, RpcPermit::Read);
    }
}
