//! FortiManager connection and monitor configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `FORTIMANAGER_HOST` | required unless mock mode |
//! | `FORTIMANAGER_API_KEY` | - |
//! | `FORTIMANAGER_USERNAME` / `FORTIMANAGER_PASSWORD` | - |
//! | `FORTIMANAGER_API_USER` | - |
//! | `FORTIMANAGER_ADOM` | `root` |
//! | `FORTIMANAGER_VERIFY_SSL` | `true` |
//! | `FORTIMANAGER_TIMEOUT_SECS` | `30` |
//! | `FORTIMANAGER_MOCK_MODE` | `false` |
//! | `MONITOR_ENABLED` | `true` |
//! | `MONITOR_INTERVAL_SECS` | `5` |
//! | `MONITOR_MAX_BACKOFF_SECS` | `60` |

use std::time::Duration;

use fortidash_core::adom::DEFAULT_ADOM;
use fortidash_core::config::{ConfigError, EnvReader};

use crate::auth::Credentials;

/// Connection settings for one FortiManager.
#[derive(Debug, Clone)]
pub struct FortiManagerConfig {
    /// `https://host[:port]`, without a trailing slash or `/jsonrpc`.
    pub base_url: String,
    /// `None` only in mock mode.
    pub credentials: Option<Credentials>,
    /// Admin account behind the API key, used by diagnostics.
    pub api_user: Option<String>,
    pub adom: String,
    pub verify_ssl: bool,
    pub timeout: Duration,
    pub mock_mode: bool,
}

impl FortiManagerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(&EnvReader::process())
    }

    pub fn from_reader<F>(env: &EnvReader<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mock_mode = env.flag_or("FORTIMANAGER_MOCK_MODE", false)?;

        let base_url = match env.string("FORTIMANAGER_HOST") {
            Some(host) => normalize_base_url(&host),
            None if mock_mode => "https://fortimanager.mock".to_string(),
            None => return Err(ConfigError::Missing { name: "FORTIMANAGER_HOST" }),
        };

        // An API key takes precedence over username/password.
        let credentials = match (
            env.string("FORTIMANAGER_API_KEY"),
            env.string("FORTIMANAGER_USERNAME"),
            env.string("FORTIMANAGER_PASSWORD"),
        ) {
            (Some(key), _, _) => Some(Credentials::ApiKey(key)),
            (None, Some(username), Some(password)) => {
                Some(Credentials::Password { username, password })
            }
            (None, Some(_), None) => {
                return Err(ConfigError::Missing { name: "FORTIMANAGER_PASSWORD" })
            }
            (None, None, _) if mock_mode => None,
            (None, None, _) => return Err(ConfigError::Missing { name: "FORTIMANAGER_API_KEY" }),
        };

        let timeout_secs: u64 = env.parse_or("FORTIMANAGER_TIMEOUT_SECS", 30)?;
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "FORTIMANAGER_TIMEOUT_SECS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }

        Ok(Self {
            base_url,
            credentials,
            api_user: env.string("FORTIMANAGER_API_USER"),
            adom: env.string_or("FORTIMANAGER_ADOM", DEFAULT_ADOM),
            verify_ssl: env.flag_or("FORTIMANAGER_VERIFY_SSL", true)?,
            timeout: Duration::from_secs(timeout_secs),
            mock_mode,
        })
    }

    /// Full JSON-RPC endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/jsonrpc", self.base_url)
    }

    /// Account name to inspect in diagnostics: the API user when set,
    /// otherwise the login name.
    pub fn principal(&self) -> Option<&str> {
        self.api_user
            .as_deref()
            .or_else(|| self.credentials.as_ref().and_then(Credentials::username))
    }
}

/// Accept bare hosts, `host:port` and full URLs, with or without a
/// trailing `/jsonrpc`.
pub fn normalize_base_url(raw: &str) -> String {
    let raw = raw.trim();
    let with_scheme = if raw.starts_with("http://") || raw.starts_with("https://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    let trimmed = with_scheme.trim_end_matches('/');
    trimmed
        .strip_suffix("/jsonrpc")
        .unwrap_or(trimmed)
        .trim_end_matches('/')
        .to_string()
}

/// Device monitor settings.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub enabled: bool,
    pub adom: String,
    pub interval: Duration,
    pub max_backoff: Duration,
}

impl MonitorConfig {
    pub fn new(adom: impl Into<String>, interval: Duration) -> Self {
        Self {
            enabled: true,
            adom: adom.into(),
            interval,
            max_backoff: Duration::from_secs(60).max(interval),
        }
    }

    pub fn from_env(adom: &str) -> Result<Self, ConfigError> {
        Self::from_reader(&EnvReader::process(), adom)
    }

    pub fn from_reader<F>(env: &EnvReader<F>, adom: &str) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval_secs: u64 = env.parse_or("MONITOR_INTERVAL_SECS", 5)?;
        if interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "MONITOR_INTERVAL_SECS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        let max_backoff_secs: u64 = env.parse_or("MONITOR_MAX_BACKOFF_SECS", 60)?;

        Ok(Self {
            enabled: env.flag_or("MONITOR_ENABLED", true)?,
            adom: adom.to_string(),
            interval: Duration::from_secs(interval_secs),
            // The ceiling never undercuts the normal interval.
            max_backoff: Duration::from_secs(max_backoff_secs.max(interval_secs)),
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn normalizes_hosts() {
        assert_eq!(normalize_base_url("fmg.example.com"), "https://fmg.example.com");
        assert_eq!(normalize_base_url("10.0.0.5:8443"), "https://10.0.0.5:8443");
        assert_eq!(
            normalize_base_url("https://fmg.example.com/jsonrpc/"),
            "https://fmg.example.com"
        );
        assert_eq!(normalize_base_url("http://fmg/"), "http://fmg");
    }

    #[test]
    fn api_key_wins_over_password() {
        let env = EnvReader::from_pairs(&[
            ("FORTIMANAGER_HOST", "fmg"),
            ("FORTIMANAGER_API_KEY", "key"),
            ("FORTIMANAGER_USERNAME", "admin"),
            ("FORTIMANAGER_PASSWORD", "pw"),
        ]);
        let config = FortiManagerConfig::from_reader(&env).unwrap();
        assert_matches!(config.credentials, Some(Credentials::ApiKey(ref k)) if k == "key");
        assert_eq!(config.endpoint(), "https://fmg/jsonrpc");
        assert_eq!(config.adom, "root");
        assert!(config.verify_ssl);
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn password_credentials() {
        let env = EnvReader::from_pairs(&[
            ("FORTIMANAGER_HOST", "fmg"),
            ("FORTIMANAGER_USERNAME", "admin"),
            ("FORTIMANAGER_PASSWORD", "pw"),
            ("FORTIMANAGER_VERIFY_SSL", "false"),
            ("FORTIMANAGER_ADOM", "branch"),
        ]);
        let config = FortiManagerConfig::from_reader(&env).unwrap();
        assert_matches!(config.credentials, Some(Credentials::Password { .. }));
        assert_eq!(config.principal(), Some("admin"));
        assert!(!config.verify_ssl);
        assert_eq!(config.adom, "branch");
    }

    #[test]
    fn missing_credentials_is_an_error() {
        let env = EnvReader::from_pairs(&[("FORTIMANAGER_HOST", "fmg")]);
        assert_matches!(
            FortiManagerConfig::from_reader(&env),
            Err(ConfigError::Missing { name: "FORTIMANAGER_API_KEY" })
        );

        let env = EnvReader::from_pairs(&[
            ("FORTIMANAGER_HOST", "fmg"),
            ("FORTIMANAGER_USERNAME", "admin"),
        ]);
        assert_matches!(
            FortiManagerConfig::from_reader(&env),
            Err(ConfigError::Missing { name: "FORTIMANAGER_PASSWORD" })
        );
    }

    #[test]
    fn missing_host_is_an_error_outside_mock_mode() {
        let env = EnvReader::from_pairs(&[("FORTIMANAGER_API_KEY", "key")]);
        assert_matches!(
            FortiManagerConfig::from_reader(&env),
            Err(ConfigError::Missing { name: "FORTIMANAGER_HOST" })
        );
    }

    #[test]
    fn mock_mode_needs_nothing_else() {
        let env = EnvReader::from_pairs(&[("FORTIMANAGER_MOCK_MODE", "1")]);
        let config = FortiManagerConfig::from_reader(&env).unwrap();
        assert!(config.mock_mode);
        assert!(config.credentials.is_none());
        assert_eq!(config.principal(), None);
    }

    #[test]
    fn monitor_defaults_and_clamping() {
        let env = EnvReader::from_pairs(&[]);
        let monitor = MonitorConfig::from_reader(&env, "root").unwrap();
        assert!(monitor.enabled);
        assert_eq!(monitor.interval, Duration::from_secs(5));
        assert_eq!(monitor.max_backoff, Duration::from_secs(60));

        let env = EnvReader::from_pairs(&[
            ("MONITOR_INTERVAL_SECS", "90"),
            ("MONITOR_MAX_BACKOFF_SECS", "30"),
        ]);
        let monitor = MonitorConfig::from_reader(&env, "root").unwrap();
        assert_eq!(monitor.max_backoff, Duration::from_secs(90));

        let env = EnvReader::from_pairs(&[("MONITOR_INTERVAL_SECS", "0")]);
        assert_matches!(
            MonitorConfig::from_reader(&env, "root"),
            Err(ConfigError::Invalid { name: "MONITOR_INTERVAL_SECS", .. })
        );
    }
}
