//! Lenient `serde` helpers for FortiManager payloads.
//!
//! FortiManager is inconsistent about scalar types: the same field may
//! arrive as an integer, a numeric string, a single string or a list of
//! strings depending on firmware and the `verbose` request flag. Use these
//! with `#[serde(default, deserialize_with = "...")]`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Keys tried, in order, when a list element is an object.
const OBJECT_NAME_KEYS: [&str; 2] = ["name", "adom-name"];

/// Deserialize `null`, a scalar, or a list of scalars into `Vec<String>`.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.map(value_to_list).unwrap_or_default())
}

/// Deserialize a string or number into `Option<String>`.
///
/// A list contributes its first scalar, since FortiManager wraps many
/// single-valued settings (e.g. `schedule`) in an array.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let text = match value {
        Some(Value::Array(items)) => items.into_iter().find_map(scalar_to_string),
        Some(other) => scalar_to_string(other),
        None => None,
    };
    Ok(text.filter(|s| !s.is_empty()))
}

/// Deserialize an integer or numeric string into `Option<i64>`.
pub fn opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_i64))
}

/// Deserialize an integer or numeric string, defaulting to zero.
pub fn i64_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    opt_i64(deserializer).map(Option::unwrap_or_default)
}

/// Deserialize FortiManager `enable`/`disable` flags (or 1/0) into `bool`.
pub fn enable_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Bool(b)) => b,
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
        Some(Value::String(s)) => matches!(s.as_str(), "enable" | "enabled" | "1" | "true"),
        _ => true,
    })
}

/// Flatten a JSON value into a list of strings.
pub fn value_to_list(value: Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().filter_map(scalar_to_string).collect(),
        other => scalar_to_string(other).into_iter().collect(),
    }
}

/// Render a scalar (or a `{"name": ...}` object) as a string.
pub fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Object(map) => OBJECT_NAME_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

/// Read an integer from a number or a numeric string.
pub fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "string_list")]
        list: Vec<String>,
        #[serde(default, deserialize_with = "opt_string")]
        text: Option<String>,
        #[serde(default, deserialize_with = "opt_i64")]
        number: Option<i64>,
        #[serde(default = "enabled", deserialize_with = "enable_flag")]
        flag: bool,
    }

    fn enabled() -> bool {
        true
    }

    fn probe(value: serde_json::Value) -> Probe {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn missing_fields_use_defaults() {
        let p = probe(json!({}));
        assert!(p.list.is_empty());
        assert!(p.text.is_none());
        assert!(p.number.is_none());
        assert!(p.flag);
    }

    #[test]
    fn single_string_becomes_one_element_list() {
        assert_eq!(probe(json!({"list": "all"})).list, vec!["all"]);
    }

    #[test]
    fn object_lists_use_name_keys() {
        let p = probe(json!({"list": [{"adom-name": "root"}, {"name": "lab"}, {"other": 1}]}));
        assert_eq!(p.list, vec!["root", "lab"]);
    }

    #[test]
    fn numbers_and_numeric_strings() {
        assert_eq!(probe(json!({"number": "42"})).number, Some(42));
        assert_eq!(probe(json!({"number": 7})).number, Some(7));
        assert_eq!(probe(json!({"number": "n/a"})).number, None);
        assert_eq!(probe(json!({"text": 7})).text.as_deref(), Some("7"));
        assert_eq!(probe(json!({"text": ""})).text, None);
        assert_eq!(probe(json!({"text": ["always"]})).text.as_deref(), Some("always"));
    }

    #[test]
    fn enable_flag_variants() {
        assert!(!probe(json!({"flag": "disable"})).flag);
        assert!(probe(json!({"flag": "enable"})).flag);
        assert!(!probe(json!({"flag": 0})).flag);
        assert!(probe(json!({"flag": 1})).flag);
    }
}
