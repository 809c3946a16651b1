//! Live FortiManager JSON-RPC client.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use crate::auth::{AuthMethod, Credentials};
use crate::config::FortiManagerConfig;
use crate::error::FortiManagerError;
use crate::rpc::{RpcMethod, RpcParams, RpcRequest, RpcResponse, RpcResult};

const LOGIN_URL: &str = "/sys/login/user";
const LOGOUT_URL: &str = "/sys/logout";

/// HTTP client for a single FortiManager.
///
/// With password credentials the session token is obtained lazily on the
/// first call and renewed once when FortiManager reports it as invalid.
pub struct FortiManagerClient {
    http: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
    principal: Option<String>,
    next_id: AtomicU64,
    session: RwLock<Option<String>>,
    /// Serialises logins so concurrent callers share one session.
    login_lock: Mutex<()>,
}

impl FortiManagerClient {
    /// Build a client from configuration.
    ///
    /// Fails when no credentials are configured or the HTTP client cannot
    /// be constructed.
    pub fn new(config: &FortiManagerConfig) -> Result<Self, FortiManagerError> {
        let credentials = config.credentials.clone().ok_or_else(|| {
            FortiManagerError::Auth("no FortiManager credentials configured".into())
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;

        if !config.verify_ssl {
            tracing::warn!(endpoint = %config.endpoint(), "TLS certificate verification disabled");
        }

        Ok(Self {
            http,
            endpoint: config.endpoint(),
            principal: config.principal().map(str::to_string),
            credentials,
            next_id: AtomicU64::new(1),
            session: RwLock::new(None),
            login_lock: Mutex::new(()),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn auth_method(&self) -> AuthMethod {
        self.credentials.method()
    }

    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    /// Whether a session token is currently held.
    pub async fn has_session(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Log in with password credentials and store the session token.
    ///
    /// A no-op returning `None` for API-key credentials.
    pub async fn login(&self) -> Result<Option<String>, FortiManagerError> {
        let Credentials::Password { username, password } = &self.credentials else {
            return Ok(None);
        };

        let params = RpcParams::new(LOGIN_URL).with_data(serde_json::json!({
            "user": username,
            "passwd": password,
        }));
        let response = self.post(RpcMethod::Exec, &params, None).await?;
        let token = response.session.clone();
        Self::first_result(response, LOGIN_URL)?;

        let token = token.ok_or_else(|| {
            FortiManagerError::Auth("login succeeded but no session token was returned".into())
        })?;

        tracing::info!(endpoint = %self.endpoint, user = %username, "Logged in to FortiManager");
        *self.session.write().await = Some(token.clone());
        Ok(Some(token))
    }

    /// End the current session, if any.
    pub async fn logout(&self) -> Result<(), FortiManagerError> {
        let Some(token) = self.session.write().await.take() else {
            return Ok(());
        };
        let params = RpcParams::new(LOGOUT_URL);
        let response = self.post(RpcMethod::Exec, &params, Some(&token)).await?;
        Self::first_result(response, LOGOUT_URL)?;
        tracing::info!(endpoint = %self.endpoint, "Logged out of FortiManager");
        Ok(())
    }

    /// Current session token, logging in first if needed.
    async fn ensure_session(&self) -> Result<Option<String>, FortiManagerError> {
        if self.credentials.method() == AuthMethod::ApiKey {
            return Ok(None);
        }
        if let Some(token) = self.session.read().await.clone() {
            return Ok(Some(token));
        }

        let _guard = self.login_lock.lock().await;
        if let Some(token) = self.session.read().await.clone() {
            return Ok(Some(token));
        }
        self.login().await
    }

    /// Perform one JSON-RPC call and return its first result.
    ///
    /// A session rejected with `NoPermission` or `InvalidRequest` is
    /// discarded and the call is retried once after a fresh login.
    pub async fn call(
        &self,
        method: RpcMethod,
        params: RpcParams,
    ) -> Result<RpcResult, FortiManagerError> {
        let session = self.ensure_session().await?;
        let outcome = self.call_once(method, &params, session.as_deref()).await;

        match outcome {
            Err(FortiManagerError::Rpc { kind, code, .. })
                if session.is_some() && kind.is_session_error() =>
            {
                tracing::warn!(
                    url = %params.url,
                    code,
                    "FortiManager rejected the session, logging in again",
                );
                {
                    let mut current = self.session.write().await;
                    if current.as_deref() == session.as_deref() {
                        *current = None;
                    }
                }
                let session = self.ensure_session().await?;
                self.call_once(method, &params, session.as_deref()).await
            }
            other => other,
        }
    }

    async fn call_once(
        &self,
        method: RpcMethod,
        params: &RpcParams,
        session: Option<&str>,
    ) -> Result<RpcResult, FortiManagerError> {
        let response = self.post(method, params, session).await?;
        Self::first_result(response, &params.url)
    }

    async fn post(
        &self,
        method: RpcMethod,
        params: &RpcParams,
        session: Option<&str>,
    ) -> Result<RpcResponse, FortiManagerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params, session);

        tracing::debug!(id, method = method.as_str(), url = %params.url, "FortiManager request");

        let mut builder = self.http.post(&self.endpoint).json(&request);
        if let Credentials::ApiKey(key) = &self.credentials {
            builder = builder.bearer_auth(key);
        }

        let response = Self::ensure_success(builder.send().await?).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            FortiManagerError::Decode(format!("invalid JSON-RPC envelope for {}: {e}", params.url))
        })
    }

    /// First result of a response, or the RPC error it carries.
    fn first_result(response: RpcResponse, url: &str) -> Result<RpcResult, FortiManagerError> {
        let result = response.result.into_iter().next().ok_or_else(|| {
            FortiManagerError::Decode(format!("empty result array for {url}"))
        })?;
        if !result.status.is_ok() {
            tracing::debug!(
                url,
                code = result.status.code,
                message = %result.status.message,
                "FortiManager returned an error status",
            );
            return Err(FortiManagerError::rpc(&result.status, url));
        }
        Ok(result)
    }

    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, FortiManagerError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            return Err(FortiManagerError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    // ---- verb helpers ----

    /// `get` with the given parameters; returns `data` (or `null`).
    pub async fn get(&self, params: RpcParams) -> Result<Value, FortiManagerError> {
        Ok(self.call(RpcMethod::Get, params).await?.data.unwrap_or(Value::Null))
    }

    pub async fn exec(&self, url: &str, data: Value) -> Result<Value, FortiManagerError> {
        self.write(RpcMethod::Exec, url, data).await
    }

    pub async fn set(&self, url: &str, data: Value) -> Result<Value, FortiManagerError> {
        self.write(RpcMethod::Set, url, data).await
    }

    pub async fn add(&self, url: &str, data: Value) -> Result<Value, FortiManagerError> {
        self.write(RpcMethod::Add, url, data).await
    }

    pub async fn update(&self, url: &str, data: Value) -> Result<Value, FortiManagerError> {
        self.write(RpcMethod::Update, url, data).await
    }

    pub async fn delete(&self, url: &str) -> Result<Value, FortiManagerError> {
        let result = self.call(RpcMethod::Delete, RpcParams::new(url)).await?;
        Ok(result.data.unwrap_or(Value::Null))
    }

    async fn write(
        &self,
        method: RpcMethod,
        url: &str,
        data: Value,
    ) -> Result<Value, FortiManagerError> {
        let result = self.call(method, RpcParams::new(url).with_data(data)).await?;
        Ok(result.data.unwrap_or(Value::Null))
    }

    /// `get` and deserialize a single object.
    pub async fn get_object<T: DeserializeOwned>(
        &self,
        params: RpcParams,
    ) -> Result<T, FortiManagerError> {
        let url = params.url.clone();
        let data = self.get(params).await?;
        decode(data, &url)
    }

    /// `get` and deserialize a table; `null` means empty.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        params: RpcParams,
    ) -> Result<Vec<T>, FortiManagerError> {
        let url = params.url.clone();
        let data = self.get(params).await?;
        decode_list(data, &url)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(data: Value, url: &str) -> Result<T, FortiManagerError> {
    serde_json::from_value(data)
        .map_err(|e| FortiManagerError::Decode(format!("unexpected data for {url}: {e}")))
}

/// Tables come back as an array, a single object, or `null` when empty.
pub(crate) fn decode_list<T: DeserializeOwned>(
    data: Value,
    url: &str,
) -> Result<Vec<T>, FortiManagerError> {
    match data {
        Value::Null => Ok(Vec::new()),
        Value::Array(_) => decode(data, url),
        single => Ok(vec![decode(single, url)?]),
    }
}
