use fortidash_core::config::ConfigError;

use crate::status::{RpcStatus, StatusKind};

/// Errors from the FortiManager client layer.
#[derive(Debug, thiserror::Error)]
pub enum FortiManagerError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// FortiManager answered with a non-2xx HTTP status.
    #[error("FortiManager HTTP error ({status}): {body}")]
    Http {
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// A JSON-RPC result carried a non-zero status code.
    #[error("FortiManager returned {code} ({message}) for {url}")]
    Rpc {
        code: i64,
        message: String,
        url: String,
        kind: StatusKind,
    },

    /// The response did not have the expected shape.
    #[error("Unexpected FortiManager response: {0}")]
    Decode(String),

    /// Authentication could not be established.
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl FortiManagerError {
    /// Build an [`FortiManagerError::Rpc`] from a result status.
    pub fn rpc(status: &RpcStatus, url: impl Into<String>) -> Self {
        Self::Rpc {
            code: status.code,
            message: status.message.clone(),
            url: url.into(),
            kind: status.kind(),
        }
    }

    /// Shorthand for a synthetic status error with the canonical message.
    pub fn status(kind_code: i64, url: impl Into<String>) -> Self {
        let kind = StatusKind::from_code(kind_code);
        Self::Rpc {
            code: kind_code,
            message: kind.hint().to_string(),
            url: url.into(),
            kind,
        }
    }

    /// Classified RPC status, if this error came from one.
    pub fn kind(&self) -> Option<StatusKind> {
        match self {
            Self::Rpc { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Whether the failure means the credentials were rejected.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Auth(_) => true,
            Self::Http { status, .. } => *status == 401,
            Self::Rpc { kind, .. } => *kind == StatusKind::LoginFailed,
            _ => false,
        }
    }
}
