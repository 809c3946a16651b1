//! Interpretation of FortiManager JSON-RPC status codes.
//!
//! Every entry in a response's `result` array carries
//! `{"status": {"code": c, "message": m}}`. Zero means success; the
//! negative codes below are the ones operators actually run into.

use serde::{Deserialize, Serialize};

/// `status` object of a single JSON-RPC result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcStatus {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

impl RpcStatus {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }

    pub fn kind(&self) -> StatusKind {
        StatusKind::from_code(self.code)
    }
}

/// Classified status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Ok,
    AlreadyExists,
    NotFound,
    InvalidUrl,
    InvalidParams,
    InvalidData,
    NoPermission,
    InvalidRequest,
    LoginFailed,
    Other,
}

impl StatusKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Ok,
            -2 => Self::AlreadyExists,
            -3 => Self::NotFound,
            -6 => Self::InvalidUrl,
            -8 => Self::InvalidParams,
            -10 => Self::InvalidData,
            -11 => Self::NoPermission,
            -20 => Self::InvalidRequest,
            -22 => Self::LoginFailed,
            _ => Self::Other,
        }
    }

    /// Codes FortiManager returns for an expired or unknown session token.
    pub fn is_session_error(&self) -> bool {
        matches!(self, Self::NoPermission | Self::InvalidRequest)
    }

    /// Operator-facing explanation of what usually causes this status.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Ok => "Request succeeded",
            Self::AlreadyExists => "The object already exists",
            Self::NotFound => "The object or ADOM does not exist",
            Self::InvalidUrl => "The URL is not valid for this FortiManager version or ADOM",
            Self::InvalidParams => "The request parameters were rejected",
            Self::InvalidData => "The data is invalid for the selected URL",
            Self::NoPermission => {
                "No permission: check the admin account's rpc-permit setting, \
                 its admin profile, and that it is assigned to the ADOM"
            }
            Self::InvalidRequest => "The request was rejected; the session may have expired",
            Self::LoginFailed => "Login failed: check the username and password",
            Self::Other => "FortiManager reported an internal or unrecognised error",
        }
    }
}
