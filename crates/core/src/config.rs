//! Environment-variable configuration helpers.
//!
//! [`EnvReader`] wraps a lookup function so configuration structs can be
//! built from the real process environment in binaries and from a plain
//! map in tests.

use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be set")]
    Missing { name: &'static str },

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Typed access to `NAME=value` settings.
pub struct EnvReader<F> {
    lookup: F,
}

impl EnvReader<fn(&str) -> Option<String>> {
    /// Read from the process environment.
    pub fn process() -> Self {
        fn from_process(name: &str) -> Option<String> {
            std::env::var(name).ok()
        }
        Self {
            lookup: from_process,
        }
    }
}

impl EnvReader<Box<dyn Fn(&str) -> Option<String>>> {
    /// Read from a fixed map.
    pub fn from_map(vars: HashMap<String, String>) -> Self {
        Self {
            lookup: Box::new(move |name: &str| vars.get(name).cloned()),
        }
    }

    /// Read from `(name, value)` pairs.
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self::from_map(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    pub fn new(lookup: F) -> Self {
        Self { lookup }
    }

    /// Trimmed value, treating empty strings as unset.
    pub fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn string_or(&self, name: &str, default: &str) -> String {
        self.string(name).unwrap_or_else(|| default.to_string())
    }

    pub fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.string(name).ok_or(ConfigError::Missing { name })
    }

    pub fn parse_or<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.string(name) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
                name,
                value: raw.clone(),
                reason: e.to_string(),
            }),
        }
    }

    /// Accepts `1/0`, `true/false`, `yes/no` and `on/off`, case-insensitive.
    pub fn flag_or(&self, name: &'static str, default: bool) -> Result<bool, ConfigError> {
        match self.string(name) {
            None => Ok(default),
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid {
                name,
                value: raw,
                reason: "expected true or false".into(),
            }),
        }
    }

    /// Comma-separated list with blanks removed.
    pub fn list_or(&self, name: &str, default: &str) -> Vec<String> {
        self.string_or(name, default)
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
