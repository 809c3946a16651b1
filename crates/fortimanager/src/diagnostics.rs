//! Authentication and permission diagnostics.
//!
//! Answers the usual "why does the API say no permission" questions in one
//! pass: can we authenticate at all, does the account have `rpc-permit`,
//! and which ADOMs can it actually read.

use fortidash_core::permission::RpcPermit;
use futures::future::join_all;
use serde::Serialize;

use crate::api::FortiManagerApi;
use crate::auth::AuthMethod;
use crate::error::FortiManagerError;
use crate::status::StatusKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
}

impl Finding {
    fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// A failed check, reduced to what an operator needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckError {
    pub kind: Option<StatusKind>,
    pub code: Option<i64>,
    pub message: String,
    pub hint: Option<&'static str>,
}

impl From<&FortiManagerError> for CheckError {
    fn from(err: &FortiManagerError) -> Self {
        match err {
            FortiManagerError::Rpc { code, kind, .. } => Self {
                kind: Some(*kind),
                code: Some(*code),
                message: err.to_string(),
                hint: Some(kind.hint()),
            },
            FortiManagerError::Http { status: 401, .. } => Self {
                kind: None,
                code: None,
                message: err.to_string(),
                hint: Some("FortiManager rejected the credentials; check the API key"),
            },
            _ => Self {
                kind: None,
                code: None,
                message: err.to_string(),
                hint: None,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdomCheck {
    pub adom: String,
    pub ok: bool,
    pub device_count: Option<usize>,
    /// Whether the admin account lists this ADOM; `None` when unknown.
    pub assigned: Option<bool>,
    pub error: Option<CheckError>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthReport {
    pub auth_method: AuthMethod,
    pub principal: Option<String>,
    pub system_status_ok: bool,
    pub version: Option<String>,
    pub system_status_error: Option<CheckError>,
    pub rpc_permit: Option<RpcPermit>,
    pub admin_profile: Option<String>,
    pub adoms: Vec<AdomCheck>,
    pub findings: Vec<Finding>,
}

impl AuthReport {
    /// Whether any finding makes the configured account unusable.
    pub fn has_blocking_problem(&self) -> bool {
        self.findings.iter().any(|f| f.severity == Severity::Error)
    }
}

/// Run every check against `api` for the given ADOMs.
pub async fn run_auth_diagnostics(api: &dyn FortiManagerApi, adoms: &[String]) -> AuthReport {
    let mut findings = Vec::new();
    let auth_method = api.auth_method();
    let principal = api.principal();

    tracing::info!(auth_method = %auth_method, principal = ?principal, "Running auth diagnostics");

    let (system_status_ok, version, system_status_error) = match api.system_status().await {
        Ok(status) => (true, status.version, None),
        Err(e) => {
            if e.is_auth_failure() {
                findings.push(Finding::error(format!(
                    "Authentication failed ({auth_method}): {e}"
                )));
            } else {
                findings.push(Finding::error(format!("Cannot read /sys/status: {e}")));
            }
            (false, None, Some(CheckError::from(&e)))
        }
    };

    let mut rpc_permit = None;
    let mut admin_profile = None;
    let mut admin = None;
    match principal.as_deref() {
        Some(name) => match api.admin_user(name).await {
            Ok(user) => {
                match user.rpc_permit {
                    RpcPermit::None => findings.push(Finding::error(format!(
                        "rpc-permit is none: API access is disabled for account '{name}'"
                    ))),
                    RpcPermit::Read => findings.push(Finding::warning(format!(
                        "rpc-permit is read: account '{name}' cannot install packages or change objects"
                    ))),
                    RpcPermit::ReadWrite => {}
                }
                rpc_permit = Some(user.rpc_permit);
                admin_profile = user.profileid.clone();
                admin = Some(user);
            }
            Err(e) => findings.push(Finding::info(format!(
                "Could not read admin account '{name}' ({e}); reading admin settings requires a Super_User profile"
            ))),
        },
        None if auth_method == AuthMethod::ApiKey => findings.push(Finding::info(
            "FORTIMANAGER_API_USER is not set, so the rpc-permit of the API key's account was not checked",
        )),
        None => {}
    }

    let results = join_all(adoms.iter().map(|adom| api.list_devices(adom))).await;

    let mut checks = Vec::with_capacity(adoms.len());
    for (adom, result) in adoms.iter().zip(results) {
        let assigned = admin.as_ref().map(|a| a.has_adom(adom));
        if assigned == Some(false) {
            findings.push(Finding::warning(format!(
                "Account is not assigned to ADOM '{adom}'"
            )));
        }

        let check = match result {
            Ok(devices) => AdomCheck {
                adom: adom.clone(),
                ok: true,
                device_count: Some(devices.len()),
                assigned,
                error: None,
            },
            Err(e) => {
                let error = CheckError::from(&e);
                let hint = error.hint.map(|h| format!(" ({h})")).unwrap_or_default();
                findings.push(Finding::error(format!(
                    "Device query failed for ADOM '{adom}': {e}{hint}"
                )));
                AdomCheck {
                    adom: adom.clone(),
                    ok: false,
                    device_count: None,
                    assigned,
                    error: Some(error),
                }
            }
        };
        checks.push(check);
    }

    if findings.iter().all(|f| f.severity == Severity::Info) && system_status_ok {
        findings.push(Finding::info("Authentication and ADOM access look correct"));
    }

    let report = AuthReport {
        auth_method,
        principal,
        system_status_ok,
        version,
        system_status_error,
        rpc_permit,
        admin_profile,
        adoms: checks,
        findings,
    };

    tracing::info!(
        blocking = report.has_blocking_problem(),
        findings = report.findings.len(),
        "Auth diagnostics finished",
    );
    report
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use fortidash_core::device::ManagedDevice;
    use fortidash_core::policy::{
        AddressObject, Adom, AdminUser, FirewallPolicy, InstallTarget, PolicyPackage,
        SystemStatus, TaskStatus,
    };

    use super::*;
    use crate::mock::MockFortiManager;

    /// Backend whose account has the given permit and only sees `root`.
    struct Restricted {
        permit: RpcPermit,
        login_fails: bool,
    }

    #[async_trait]
    impl FortiManagerApi for Restricted {
        fn auth_method(&self) -> AuthMethod {
            AuthMethod::ApiKey
        }

        fn principal(&self) -> Option<String> {
            Some("api-user".into())
        }

        async fn system_status(&self) -> Result<SystemStatus, FortiManagerError> {
            if self.login_fails {
                return Err(FortiManagerError::Http {
                    status: 401,
                    body: "Unauthorized".into(),
                });
            }
            Ok(SystemStatus {
                version: Some("v7.4.4".into()),
                ..Default::default()
            })
        }

        async fn list_adoms(&self) -> Result<Vec<Adom>, FortiManagerError> {
            Ok(Vec::new())
        }

        async fn list_devices(&self, adom: &str) -> Result<Vec<ManagedDevice>, FortiManagerError> {
            if self.permit == RpcPermit::None || adom != "root" {
                return Err(FortiManagerError::status(-11, format!("/dvmdb/adom/{adom}/device")));
            }
            Ok(vec![ManagedDevice::new("FGT-1", Default::default())])
        }

        async fn get_device(&self, adom: &str, name: &str) -> Result<ManagedDevice, FortiManagerError> {
            Err(FortiManagerError::status(-3, format!("/dvmdb/adom/{adom}/device/{name}")))
        }

        async fn list_policy_packages(&self, _: &str) -> Result<Vec<PolicyPackage>, FortiManagerError> {
            Ok(Vec::new())
        }

        async fn list_firewall_policies(
            &self,
            _: &str,
            _: &str,
        ) -> Result<Vec<FirewallPolicy>, FortiManagerError> {
            Ok(Vec::new())
        }

        async fn list_address_objects(&self, _: &str) -> Result<Vec<AddressObject>, FortiManagerError> {
            Ok(Vec::new())
        }

        async fn install_package(
            &self,
            _: &str,
            _: &str,
            _: &[InstallTarget],
        ) -> Result<i64, FortiManagerError> {
            Err(FortiManagerError::status(-11, "/securityconsole/install/package"))
        }

        async fn task_status(&self, id: i64) -> Result<TaskStatus, FortiManagerError> {
            Err(FortiManagerError::status(-3, format!("/task/task/{id}")))
        }

        async fn admin_user(&self, name: &str) -> Result<AdminUser, FortiManagerError> {
            Ok(AdminUser {
                userid: name.to_string(),
                profileid: Some("Restricted_User".into()),
                rpc_permit: self.permit,
                adom: vec!["root".into()],
            })
        }
    }

    fn adoms(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn mock_backend_is_healthy() {
        let mock = MockFortiManager::default();
        let report = run_auth_diagnostics(&mock, &adoms(&["root", "datacenter"])).await;

        assert!(report.system_status_ok);
        assert_eq!(report.auth_method, AuthMethod::Mock);
        assert_eq!(report.rpc_permit, Some(RpcPermit::ReadWrite));
        assert!(report.adoms.iter().all(|a| a.ok));
        assert!(!report.has_blocking_problem());
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].severity, Severity::Info);
    }

    #[tokio::test]
    async fn rpc_permit_none_is_blocking() {
        let api = Restricted {
            permit: RpcPermit::None,
            login_fails: false,
        };
        let report = run_auth_diagnostics(&api, &adoms(&["root"])).await;

        assert!(report.has_blocking_problem());
        assert!(report
            .findings
            .iter()
            .any(|f| f.message.contains("rpc-permit is none")));
        let check = &report.adoms[0];
        assert!(!check.ok);
        assert_eq!(check.error.as_ref().and_then(|e| e.kind), Some(StatusKind::NoPermission));
    }

    #[tokio::test]
    async fn unassigned_adom_is_reported() {
        let api = Restricted {
            permit: RpcPermit::Read,
            login_fails: false,
        };
        let report = run_auth_diagnostics(&api, &adoms(&["root", "branch"])).await;

        assert!(report.adoms[0].ok);
        assert_eq!(report.adoms[0].device_count, Some(1));
        assert_eq!(report.adoms[1].assigned, Some(false));
        assert!(report
            .findings
            .iter()
            .any(|f| f.severity == Severity::Warning && f.message.contains("rpc-permit is read")));
        assert!(report
            .findings
            .iter()
            .any(|f| f.message.contains("not assigned to ADOM 'branch'")));
        assert!(report.has_blocking_problem());
    }

    #[tokio::test]
    async fn rejected_credentials() {
        let api = Restricted {
            permit: RpcPermit::ReadWrite,
            login_fails: true,
        };
        let report = run_auth_diagnostics(&api, &[]).await;

        assert!(!report.system_status_ok);
        assert!(report.system_status_error.as_ref().and_then(|e| e.hint).is_some());
        assert!(report.findings[0].message.starts_with("Authentication failed"));
        assert!(report.has_blocking_problem());
    }
}
