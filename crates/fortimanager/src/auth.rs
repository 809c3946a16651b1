//! Credential handling.

use std::fmt;

use serde::Serialize;

/// How the client proves its identity to FortiManager.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// REST API administrator key, sent as `Authorization: Bearer <key>`.
    ApiKey(String),
    /// Interactive administrator; logs in via `exec /sys/login/user`.
    Password { username: String, password: String },
}

impl Credentials {
    pub fn method(&self) -> AuthMethod {
        match self {
            Self::ApiKey(_) => AuthMethod::ApiKey,
            Self::Password { .. } => AuthMethod::Session,
        }
    }

    /// Login name for session credentials.
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::ApiKey(_) => None,
            Self::Password { username, .. } => Some(username),
        }
    }
}

// Keeps secrets out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(***)"),
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"***")
                .finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    ApiKey,
    Session,
    Mock,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::Session => "session",
            Self::Mock => "mock",
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_secrets() {
        let key = Credentials::ApiKey("s3cr3t".into());
        assert!(!format!("{key:?}").contains("s3cr3t"));

        let password = Credentials::Password {
            username: "admin".into(),
            password: "hunter2".into(),
        };
        let shown = format!("{password:?}");
        assert!(shown.contains("admin"));
        assert!(!shown.contains("hunter2"));
    }

    #[test]
    fn method_follows_credential_kind() {
        assert_eq!(Credentials::ApiKey("k".into()).method(), AuthMethod::ApiKey);
        let password = Credentials::Password {
            username: "admin".into(),
            password: "pw".into(),
        };
        assert_eq!(password.method(), AuthMethod::Session);
        assert_eq!(password.username(), Some("admin"));
    }
}
