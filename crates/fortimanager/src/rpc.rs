//! JSON-RPC envelope types.
//!
//! Requests are POSTed to `https://<host>/jsonrpc`:
//!
//! ```text
//! {"id": 1, "method": "get", "params": [{"url": "/dvmdb/adom"}], "session": "...", "verbose": 1}
//! ```
//!
//! and answered with:
//!
//! ```text
//! {"id": 1, "result": [{"status": {"code": 0, "message": "OK"}, "url": "/dvmdb/adom", "data": [...]}]}
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::status::RpcStatus;

/// Request `verbose` flag: ask for enum values as strings.
pub const VERBOSE: u8 = 1;

/// JSON-RPC method verbs understood by FortiManager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RpcMethod {
    Get,
    Set,
    Add,
    Update,
    Delete,
    Exec,
}

impl RpcMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Set => "set",
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Exec => "exec",
        }
    }
}

/// One element of the request `params` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RpcParams {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub option: Option<Value>,
}

impl RpcParams {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    /// FortiManager filter syntax, e.g. `["conn_status", "==", 1]`.
    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_option(mut self, option: Value) -> Self {
        self.option = Some(option);
        self
    }
}

#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub id: u64,
    pub method: RpcMethod,
    pub params: [&'a RpcParams; 1],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<&'a str>,
    pub verbose: u8,
}

impl<'a> RpcRequest<'a> {
    pub fn new(id: u64, method: RpcMethod, params: &'a RpcParams, session: Option<&'a str>) -> Self {
        Self {
            id,
            method,
            params: [params],
            session,
            verbose: VERBOSE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub result: Vec<RpcResult>,
    /// Present on successful `/sys/login/user` calls.
    #[serde(default)]
    pub session: Option<String>,
}

/// One element of the response `result` array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcResult {
    pub status: RpcStatus,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub data: Option<Value>,
}

/// Some FortiManager builds answer single requests with a bare object.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<RpcResult>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<RpcResult>),
        One(RpcResult),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::Many(results)) => results,
        Some(OneOrMany::One(result)) => vec![result],
        None => Vec::new(),
    })
}
