//! ADOM-scoped FortiManager queries.
//!
//! [`FortiManagerApi`] is the seam between the dashboard and FortiManager:
//! the HTTP layer, the monitor and the diagnostics only ever talk to a
//! `dyn FortiManagerApi`, so the live client and the mock backend are
//! interchangeable.

use async_trait::async_trait;
use fortidash_core::device::ManagedDevice;
use fortidash_core::lenient;
use fortidash_core::policy::{
    AddressObject, Adom, AdminUser, FirewallPolicy, InstallTarget, PolicyPackage, SystemStatus,
    TaskStatus,
};
use serde_json::{json, Value};

use crate::auth::AuthMethod;
use crate::client::{decode, decode_list, FortiManagerClient};
use crate::error::FortiManagerError;
use crate::rpc::RpcParams;

/// Device fields requested from `/dvmdb`; keeps responses small on large
/// installations.
pub const DEVICE_FIELDS: &[&str] = &[
    "name",
    "hostname",
    "ip",
    "sn",
    "platform_str",
    "os_ver",
    "mr",
    "patch",
    "conn_status",
    "ha_mode",
    "desc",
];

const ADOM_FIELDS: &[&str] = &["name", "desc", "os_ver", "mr"];

const INSTALL_URL: &str = "/securityconsole/install/package";

/// VDOM used for install targets that do not name one.
pub const DEFAULT_VDOM: &str = "root";

#[async_trait]
pub trait FortiManagerApi: Send + Sync {
    fn auth_method(&self) -> AuthMethod;

    /// Account the backend acts as, when known.
    fn principal(&self) -> Option<String>;

    async fn system_status(&self) -> Result<SystemStatus, FortiManagerError>;

    async fn list_adoms(&self) -> Result<Vec<Adom>, FortiManagerError>;

    async fn list_devices(&self, adom: &str) -> Result<Vec<ManagedDevice>, FortiManagerError>;

    async fn get_device(&self, adom: &str, name: &str)
        -> Result<ManagedDevice, FortiManagerError>;

    /// Packages with folders flattened into `folder/name` paths.
    async fn list_policy_packages(
        &self,
        adom: &str,
    ) -> Result<Vec<PolicyPackage>, FortiManagerError>;

    async fn list_firewall_policies(
        &self,
        adom: &str,
        package: &str,
    ) -> Result<Vec<FirewallPolicy>, FortiManagerError>;

    async fn list_address_objects(
        &self,
        adom: &str,
    ) -> Result<Vec<AddressObject>, FortiManagerError>;

    /// Start installing `package` onto `targets`; returns the task id.
    async fn install_package(
        &self,
        adom: &str,
        package: &str,
        targets: &[InstallTarget],
    ) -> Result<i64, FortiManagerError>;

    async fn task_status(&self, id: i64) -> Result<TaskStatus, FortiManagerError>;

    async fn admin_user(&self, name: &str) -> Result<AdminUser, FortiManagerError>;

    /// Release any server-side session.
    async fn close(&self) -> Result<(), FortiManagerError> {
        Ok(())
    }
}

/// Request body for `exec /securityconsole/install/package`.
pub fn install_request(adom: &str, package: &str, targets: &[InstallTarget]) -> Value {
    let scope: Vec<Value> = targets
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "vdom": t.vdom.as_deref().unwrap_or(DEFAULT_VDOM),
            })
        })
        .collect();
    json!({
        "adom": adom,
        "pkg": package,
        "scope": scope,
        "flags": ["none"],
    })
}

/// Flatten the `/pm/pkg/adom/{adom}` tree.
///
/// Folders (`"type": "folder"`) contribute their name as a path prefix and
/// hold their children in `subobj`.
pub fn flatten_packages(nodes: &[Value]) -> Vec<PolicyPackage> {
    let mut packages = Vec::new();
    collect_packages(nodes, "", &mut packages);
    packages
}

fn collect_packages(nodes: &[Value], prefix: &str, out: &mut Vec<PolicyPackage>) {
    for node in nodes {
        let Some(name) = node.get("name").and_then(Value::as_str) else {
            continue;
        };
        let path = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };

        if node.get("type").and_then(Value::as_str) == Some("folder") {
            if let Some(children) = node.get("subobj").and_then(Value::as_array) {
                collect_packages(children, &path, out);
            }
            continue;
        }

        let scope = node
            .get("scope member")
            .and_then(Value::as_array)
            .map(|members| members.iter().filter_map(scope_member).collect())
            .unwrap_or_default();

        out.push(PolicyPackage {
            name: name.to_string(),
            path,
            scope,
        });
    }
}

/// `device` or `device/vdom`.
fn scope_member(member: &Value) -> Option<String> {
    let name = member.get("name").and_then(Value::as_str)?;
    Some(match member.get("vdom").and_then(Value::as_str) {
        Some(vdom) if !vdom.is_empty() => format!("{name}/{vdom}"),
        _ => name.to_string(),
    })
}

/// Task id from an install response: `{"task": 123}`.
fn task_id(data: &Value) -> Result<i64, FortiManagerError> {
    data.get("task")
        .and_then(lenient::value_to_i64)
        .ok_or_else(|| FortiManagerError::Decode("install response did not include a task id".into()))
}

#[async_trait]
impl FortiManagerApi for FortiManagerClient {
    fn auth_method(&self) -> AuthMethod {
        FortiManagerClient::auth_method(self)
    }

    fn principal(&self) -> Option<String> {
        FortiManagerClient::principal(self).map(str::to_string)
    }

    async fn system_status(&self) -> Result<SystemStatus, FortiManagerError> {
        self.get_object(RpcParams::new("/sys/status")).await
    }

    async fn list_adoms(&self) -> Result<Vec<Adom>, FortiManagerError> {
        self.get_list(RpcParams::new("/dvmdb/adom").with_fields(ADOM_FIELDS))
            .await
    }

    async fn list_devices(&self, adom: &str) -> Result<Vec<ManagedDevice>, FortiManagerError> {
        let url = format!("/dvmdb/adom/{adom}/device");
        let devices: Vec<ManagedDevice> = self
            .get_list(RpcParams::new(url).with_fields(DEVICE_FIELDS))
            .await?;
        tracing::debug!(adom, count = devices.len(), "Listed devices");
        Ok(devices)
    }

    async fn get_device(
        &self,
        adom: &str,
        name: &str,
    ) -> Result<ManagedDevice, FortiManagerError> {
        let url = format!("/dvmdb/adom/{adom}/device/{name}");
        self.get_object(RpcParams::new(url).with_fields(DEVICE_FIELDS))
            .await
    }

    async fn list_policy_packages(
        &self,
        adom: &str,
    ) -> Result<Vec<PolicyPackage>, FortiManagerError> {
        let url = format!("/pm/pkg/adom/{adom}");
        let data = self.get(RpcParams::new(&url)).await?;
        let nodes: Vec<Value> = decode_list(data, &url)?;
        Ok(flatten_packages(&nodes))
    }

    async fn list_firewall_policies(
        &self,
        adom: &str,
        package: &str,
    ) -> Result<Vec<FirewallPolicy>, FortiManagerError> {
        let url = format!("/pm/config/adom/{adom}/pkg/{package}/firewall/policy");
        self.get_list(RpcParams::new(url)).await
    }

    async fn list_address_objects(
        &self,
        adom: &str,
    ) -> Result<Vec<AddressObject>, FortiManagerError> {
        let url = format!("/pm/config/adom/{adom}/obj/firewall/address");
        self.get_list(RpcParams::new(url)).await
    }

    async fn install_package(
        &self,
        adom: &str,
        package: &str,
        targets: &[InstallTarget],
    ) -> Result<i64, FortiManagerError> {
        let data = self
            .exec(INSTALL_URL, install_request(adom, package, targets))
            .await?;
        let task = task_id(&data)?;
        tracing::info!(adom, package, task, targets = targets.len(), "Package install started");
        Ok(task)
    }

    async fn task_status(&self, id: i64) -> Result<TaskStatus, FortiManagerError> {
        let url = format!("/task/task/{id}");
        let data = self.get(RpcParams::new(&url)).await?;
        decode(data, &url)
    }

    async fn admin_user(&self, name: &str) -> Result<AdminUser, FortiManagerError> {
        let url = format!("/cli/global/system/admin/user/{name}");
        self.get_object(RpcParams::new(url)).await
    }

    async fn close(&self) -> Result<(), FortiManagerError> {
        self.logout().await
    }
}
