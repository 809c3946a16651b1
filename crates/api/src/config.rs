use std::net::{IpAddr, SocketAddr};

use axum::http::HeaderValue;
use fortidash_core::config::{ConfigError, EnvReader};
use fortidash_events::log::DEFAULT_LOG_CAPACITY;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Number of recent events served by `/api/v1/events` (default: `200`).
    pub event_log_capacity: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `HOST`                 | `0.0.0.0`               |
    /// | `PORT`                 | `5000`                  |
    /// | `CORS_ORIGINS`         | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    /// | `EVENT_LOG_CAPACITY`   | `200`                   |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(&EnvReader::process())
    }

    pub fn from_reader<F>(env: &EnvReader<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = env.string_or("HOST", "0.0.0.0");
        if host.parse::<IpAddr>().is_err() {
            return Err(ConfigError::Invalid {
                name: "HOST",
                value: host,
                reason: "expected an IP address".into(),
            });
        }

        let cors_origins = env.list_or("CORS_ORIGINS", "http://localhost:3000");
        if let Some(bad) = cors_origins
            .iter()
            .find(|o| HeaderValue::from_str(o).is_err())
        {
            return Err(ConfigError::Invalid {
                name: "CORS_ORIGINS",
                value: bad.clone(),
                reason: "not a valid header value".into(),
            });
        }

        Ok(Self {
            host,
            port: env.parse_or("PORT", 5000)?,
            cors_origins,
            request_timeout_secs: env.parse_or("REQUEST_TIMEOUT_SECS", 30)?,
            event_log_capacity: env.parse_or("EVENT_LOG_CAPACITY", DEFAULT_LOG_CAPACITY)?,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self.host.parse().map_err(|_| ConfigError::Invalid {
            name: "HOST",
            value: self.host.clone(),
            reason: "expected an IP address".into(),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::from_reader(&EnvReader::from_pairs(&[])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 5000);
        assert_eq!(config.cors_origins, ["http://localhost:3000"]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.event_log_capacity, 200);
        assert_eq!(config.socket_addr().unwrap().port(), 5000);
    }

    #[test]
    fn overrides() {
        let env = EnvReader::from_pairs(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("CORS_ORIGINS", "http://a.example, http://b.example ,"),
        ]);
        let config = ServerConfig::from_reader(&env).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, ["http://a.example", "http://b.example"]);
    }

    #[test]
    fn invalid_values() {
        let env = EnvReader::from_pairs(&[("PORT", "not-a-port")]);
        assert_matches!(
            ServerConfig::from_reader(&env),
            Err(ConfigError::Invalid { name: "PORT", .. })
        );

        let env = EnvReader::from_pairs(&[("HOST", "localhost")]);
        assert_matches!(
            ServerConfig::from_reader(&env),
            Err(ConfigError::Invalid { name: "HOST", .. })
        );
    }
}
