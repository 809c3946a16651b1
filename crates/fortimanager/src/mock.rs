//! In-memory FortiManager backed by [`MockGenerator`] data.
//!
//! Serves a fixed device set per ADOM and lets a device flap now and then
//! so the monitor has something to report. Tests can drive the state
//! directly through the `set_*`/`add_*`/`remove_*` hooks.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use fortidash_core::device::{ConnStatus, ManagedDevice};
use fortidash_core::mock::MockGenerator;
use fortidash_core::policy::{
    AddressObject, Adom, AdminUser, FirewallPolicy, InstallTarget, PolicyPackage, SystemStatus,
    TaskState, TaskStatus,
};
use tokio::sync::Mutex;

use crate::api::FortiManagerApi;
use crate::auth::AuthMethod;
use crate::error::FortiManagerError;

pub const DEFAULT_SEED: u64 = 7_161;

pub const DEFAULT_DEVICES_PER_ADOM: usize = 8;

/// Chance that a `list_devices` call toggles one device.
pub const DEFAULT_FLAP_PROBABILITY: f64 = 0.05;

const POLICIES_PER_PACKAGE: usize = 12;
const ADDRESSES_PER_ADOM: usize = 20;

/// Account name the mock backend reports as its principal.
pub const MOCK_PRINCIPAL: &str = "mock-admin";

// FortiManager status codes the mock reproduces.
const CODE_NOT_FOUND: i64 = -3;
const CODE_INVALID_PARAMS: i64 = -8;
const CODE_GENERIC: i64 = -1;

struct AdomData {
    devices: Vec<ManagedDevice>,
    packages: Vec<PolicyPackage>,
    /// Keyed by package path.
    policies: BTreeMap<String, Vec<FirewallPolicy>>,
    addresses: Vec<AddressObject>,
}

struct MockState {
    generator: MockGenerator,
    adoms: Vec<Adom>,
    data: BTreeMap<String, AdomData>,
    tasks: BTreeMap<i64, TaskStatus>,
    next_task: i64,
    failing_polls: u32,
}

/// Seeded stand-in for a FortiManager.
pub struct MockFortiManager {
    state: Mutex<MockState>,
    flap_probability: f64,
}

impl MockFortiManager {
    pub fn new(seed: u64) -> Self {
        Self::with_devices_per_adom(seed, DEFAULT_DEVICES_PER_ADOM)
    }

    pub fn with_devices_per_adom(seed: u64, devices_per_adom: usize) -> Self {
        let mut generator = MockGenerator::new(seed);
        let adoms = generator.adoms();

        let mut data = BTreeMap::new();
        for adom in &adoms {
            let devices = generator.devices(&adom.name, devices_per_adom);
            let packages = generator.policy_packages(&devices);
            let policies = packages
                .iter()
                .map(|p| (p.path.clone(), generator.firewall_policies(POLICIES_PER_PACKAGE)))
                .collect();
            let addresses = generator.address_objects(ADDRESSES_PER_ADOM);
            data.insert(
                adom.name.clone(),
                AdomData {
                    devices,
                    packages,
                    policies,
                    addresses,
                },
            );
        }

        Self {
            state: Mutex::new(MockState {
                generator,
                adoms,
                data,
                tasks: BTreeMap::new(),
                next_task: 1,
                failing_polls: 0,
            }),
            flap_probability: DEFAULT_FLAP_PROBABILITY,
        }
    }

    /// Set the per-call flap chance; `0.0` makes device state static.
    pub fn with_flap_probability(mut self, probability: f64) -> Self {
        self.flap_probability = probability.clamp(0.0, 1.0);
        self
    }

    /// Names of the ADOMs this backend serves.
    pub async fn adom_names(&self) -> Vec<String> {
        self.state.lock().await.data.keys().cloned().collect()
    }

    /// Force a device's connection status. Returns `false` if unknown.
    pub async fn set_device_status(&self, adom: &str, name: &str, status: ConnStatus) -> bool {
        let mut state = self.state.lock().await;
        let Some(device) = state
            .data
            .get_mut(adom)
            .and_then(|d| d.devices.iter_mut().find(|dev| dev.name == name))
        else {
            return false;
        };
        device.conn_status = status;
        true
    }

    /// Register or replace a device in a known ADOM.
    pub async fn add_device(&self, adom: &str, device: ManagedDevice) {
        let mut state = self.state.lock().await;
        if let Some(data) = state.data.get_mut(adom) {
            data.devices.retain(|d| d.name != device.name);
            data.devices.push(device);
        }
    }

    pub async fn remove_device(&self, adom: &str, name: &str) -> bool {
        let mut state = self.state.lock().await;
        let Some(data) = state.data.get_mut(adom) else {
            return false;
        };
        let before = data.devices.len();
        data.devices.retain(|d| d.name != name);
        data.devices.len() != before
    }

    /// Make the next `count` device listings fail.
    pub async fn fail_next_polls(&self, count: u32) {
        self.state.lock().await.failing_polls = count;
    }

    fn not_found(url: String) -> FortiManagerError {
        FortiManagerError::status(CODE_NOT_FOUND, url)
    }
}

impl Default for MockFortiManager {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl MockState {
    fn adom(&self, adom: &str, url: &str) -> Result<&AdomData, FortiManagerError> {
        self.data
            .get(adom)
            .ok_or_else(|| MockFortiManager::not_found(url.to_string()))
    }
}

#[async_trait]
impl FortiManagerApi for MockFortiManager {
    fn auth_method(&self) -> AuthMethod {
        AuthMethod::Mock
    }

    fn principal(&self) -> Option<String> {
        Some(MOCK_PRINCIPAL.to_string())
    }

    async fn system_status(&self) -> Result<SystemStatus, FortiManagerError> {
        Ok(self.state.lock().await.generator.system_status())
    }

    async fn list_adoms(&self) -> Result<Vec<Adom>, FortiManagerError> {
        Ok(self.state.lock().await.adoms.clone())
    }

    async fn list_devices(&self, adom: &str) -> Result<Vec<ManagedDevice>, FortiManagerError> {
        let url = format!("/dvmdb/adom/{adom}/device");
        let mut state = self.state.lock().await;

        if state.failing_polls > 0 {
            state.failing_polls -= 1;
            return Err(FortiManagerError::status(CODE_GENERIC, url));
        }

        let MockState {
            generator, data, ..
        } = &mut *state;
        let data = data.get_mut(adom).ok_or_else(|| Self::not_found(url))?;

        if !data.devices.is_empty() && generator.chance(self.flap_probability) {
            let index = generator.pick_index(data.devices.len());
            let device = &mut data.devices[index];
            device.conn_status = match device.conn_status {
                ConnStatus::Up => ConnStatus::Down,
                ConnStatus::Down | ConnStatus::Unknown => ConnStatus::Up,
            };
            tracing::debug!(adom, device = %device.name, status = %device.conn_status, "Mock device flapped");
        }

        Ok(data.devices.clone())
    }

    async fn get_device(
        &self,
        adom: &str,
        name: &str,
    ) -> Result<ManagedDevice, FortiManagerError> {
        let url = format!("/dvmdb/adom/{adom}/device/{name}");
        let state = self.state.lock().await;
        state
            .adom(adom, &url)?
            .devices
            .iter()
            .find(|d| d.name == name)
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }

    async fn list_policy_packages(
        &self,
        adom: &str,
    ) -> Result<Vec<PolicyPackage>, FortiManagerError> {
        let url = format!("/pm/pkg/adom/{adom}");
        let state = self.state.lock().await;
        Ok(state.adom(adom, &url)?.packages.clone())
    }

    async fn list_firewall_policies(
        &self,
        adom: &str,
        package: &str,
    ) -> Result<Vec<FirewallPolicy>, FortiManagerError> {
        let url = format!("/pm/config/adom/{adom}/pkg/{package}/firewall/policy");
        let state = self.state.lock().await;
        state
            .adom(adom, &url)?
            .policies
            .get(package)
            .cloned()
            .ok_or_else(|| Self::not_found(url))
    }

    async fn list_address_objects(
        &self,
        adom: &str,
    ) -> Result<Vec<AddressObject>, FortiManagerError> {
        let url = format!("/pm/config/adom/{adom}/obj/firewall/address");
        let state = self.state.lock().await;
        Ok(state.adom(adom, &url)?.addresses.clone())
    }

    async fn install_package(
        &self,
        adom: &str,
        package: &str,
        targets: &[InstallTarget],
    ) -> Result<i64, FortiManagerError> {
        let url = "/securityconsole/install/package";
        if targets.is_empty() {
            return Err(FortiManagerError::status(CODE_INVALID_PARAMS, url));
        }

        let mut state = self.state.lock().await;
        let data = state.adom(adom, url)?;
        if !data.packages.iter().any(|p| p.path == package) {
            return Err(Self::not_found(url.to_string()));
        }
        if let Some(missing) = targets
            .iter()
            .find(|t| !data.devices.iter().any(|d| d.name == t.name))
        {
            tracing::debug!(adom, device = %missing.name, "Install target not in ADOM");
            return Err(Self::not_found(url.to_string()));
        }

        let id = state.next_task;
        state.next_task += 1;
        let now = Utc::now().timestamp();
        let count = targets.len() as i64;
        state.tasks.insert(
            id,
            TaskStatus {
                id,
                title: Some(format!("Install policy package {package}")),
                state: TaskState::Done,
                percent: 100,
                num_done: count,
                num_err: 0,
                num_lines: count,
                start_tm: Some(now),
                end_tm: Some(now),
            },
        );

        tracing::info!(adom, package, task = id, "Mock package install recorded");
        Ok(id)
    }

    async fn task_status(&self, id: i64) -> Result<TaskStatus, FortiManagerError> {
        self.state
            .lock()
            .await
            .tasks
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("/task/task/{id}")))
    }

    async fn admin_user(&self, name: &str) -> Result<AdminUser, FortiManagerError> {
        Ok(self.state.lock().await.generator.admin_user(name))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::status::StatusKind;

    fn quiet() -> MockFortiManager {
        MockFortiManager::new(1).with_flap_probability(0.0)
    }

    #[tokio::test]
    async fn serves_devices_per_adom() {
        let mock = quiet();
        let devices = mock.list_devices("root").await.unwrap();
        assert_eq!(devices.len(), DEFAULT_DEVICES_PER_ADOM);
        assert!(devices.iter().all(|d| d.name.starts_with("FGT-ROOT-")));

        let first = &devices[0];
        let fetched = mock.get_device("root", &first.name).await.unwrap();
        assert_eq!(&fetched, first);
    }

    #[tokio::test]
    async fn same_seed_same_devices() {
        let a = quiet().list_devices("datacenter").await.unwrap();
        let b = quiet().list_devices("datacenter").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn unknown_adom_is_not_found() {
        let err = quiet().list_devices("nope").await.unwrap_err();
        assert_eq!(err.kind(), Some(StatusKind::NotFound));

        let err = quiet().get_device("root", "FGT-MISSING").await.unwrap_err();
        assert_eq!(err.kind(), Some(StatusKind::NotFound));
    }

    #[tokio::test]
    async fn flapping_toggles_one_device() {
        let mock = MockFortiManager::new(3).with_flap_probability(1.0);
        let before = mock.list_devices("root").await.unwrap();
        let after = mock.list_devices("root").await.unwrap();
        let changed = before
            .iter()
            .zip(&after)
            .filter(|(a, b)| a.conn_status != b.conn_status)
            .count();
        assert_eq!(changed, 1);
    }

    #[tokio::test]
    async fn hooks_change_state() {
        let mock = quiet();
        let name = mock.list_devices("root").await.unwrap()[0].name.clone();

        assert!(mock.set_device_status("root", &name, ConnStatus::Down).await);
        let device = mock.get_device("root", &name).await.unwrap();
        assert_eq!(device.conn_status, ConnStatus::Down);

        assert!(mock.remove_device("root", &name).await);
        assert!(!mock.remove_device("root", &name).await);
        assert!(!mock.set_device_status("root", &name, ConnStatus::Up).await);

        mock.add_device("root", ManagedDevice::new("FGT-NEW", ConnStatus::Up)).await;
        assert!(mock.get_device("root", "FGT-NEW").await.is_ok());
    }

    #[tokio::test]
    async fn failing_polls_then_recovers() {
        let mock = quiet();
        mock.fail_next_polls(2).await;
        assert!(mock.list_devices("root").await.is_err());
        assert!(mock.list_devices("root").await.is_err());
        assert!(mock.list_devices("root").await.is_ok());
    }

    #[tokio::test]
    async fn packages_and_policies() {
        let mock = quiet();
        let packages = mock.list_policy_packages("root").await.unwrap();
        assert!(packages.iter().any(|p| p.path == "branch/standard"));

        let policies = mock
            .list_firewall_policies("root", "branch/standard")
            .await
            .unwrap();
        assert_eq!(policies.len(), POLICIES_PER_PACKAGE);

        let err = mock
            .list_firewall_policies("root", "missing")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(StatusKind::NotFound));

        let addresses = mock.list_address_objects("root").await.unwrap();
        assert_eq!(addresses.len(), ADDRESSES_PER_ADOM);
    }

    #[tokio::test]
    async fn install_creates_finished_task() {
        let mock = quiet();
        let device = mock.list_devices("root").await.unwrap()[0].name.clone();
        let targets = [InstallTarget {
            name: device,
            vdom: None,
        }];

        let task = mock.install_package("root", "default", &targets).await.unwrap();
        let status = mock.task_status(task).await.unwrap();
        assert_eq!(status.state, TaskState::Done);
        assert_eq!(status.percent, 100);
        assert_eq!(status.num_done, 1);

        let second = mock.install_package("root", "default", &targets).await.unwrap();
        assert_eq!(second, task + 1);
    }

    #[tokio::test]
    async fn install_rejects_bad_input() {
        let mock = quiet();
        let err = mock.install_package("root", "default", &[]).await.unwrap_err();
        assert_eq!(err.kind(), Some(StatusKind::InvalidParams));

        let targets = [InstallTarget {
            name: "FGT-NOWHERE".into(),
            vdom: None,
        }];
        let err = mock
            .install_package("root", "default", &targets)
            .await
            .unwrap_err();
        assert_matches!(err, FortiManagerError::Rpc { code: -3, .. });

        assert!(mock.task_status(999).await.is_err());
    }

    #[tokio::test]
    async fn mock_identity() {
        let mock = quiet();
        assert_eq!(mock.auth_method(), AuthMethod::Mock);
        let admin = mock.admin_user(MOCK_PRINCIPAL).await.unwrap();
        assert!(admin.rpc_permit.can_write());
    }
}
