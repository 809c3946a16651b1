//! Seeded generators for dashboard demo data.
//!
//! Used when the dashboard runs without a FortiManager and for the traffic
//! and threat widgets, which FortiManager itself does not serve. The same
//! seed always yields the same sequence.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use chrono::{Duration, Timelike};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::device::{ConnStatus, ManagedDevice};
use crate::policy::{
    AddressObject, Adom, AdminUser, FirewallPolicy, PolicyAction, PolicyPackage, SystemStatus,
};
use crate::permission::RpcPermit;
use crate::types::Timestamp;

const PLATFORMS: &[&str] = &[
    "FortiGate-40F",
    "FortiGate-60F",
    "FortiGate-100F",
    "FortiGate-200F",
    "FortiGate-600E",
    "FortiGate-VM64",
];

/// (major, minor, patch) firmware releases handed out to generated devices.
const FIRMWARE: &[(u8, u8, u8)] = &[(7, 0, 15), (7, 2, 8), (7, 2, 10), (7, 4, 4)];

const INTERFACES: &[&str] = &["port1", "port2", "wan1", "wan2", "internal", "dmz"];

const SERVICES: &[&str] = &["HTTP", "HTTPS", "DNS", "SSH", "NTP", "SMTP", "ALL_ICMP", "RDP"];

const THREAT_CATEGORIES: &[&str] = &[
    "Malware",
    "Botnet C&C",
    "Phishing",
    "Brute force",
    "SQL injection",
    "Port scan",
    "Exploit kit",
];

const SEVERITIES: &[(&str, u64)] = &[("critical", 5), ("high", 15), ("medium", 35), ("low", 45)];

/// Probability that a generated device is up.
const UP_PROBABILITY: f64 = 0.85;

/// One point of the interface throughput chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrafficSample {
    pub timestamp: Timestamp,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub sessions: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreatCount {
    pub name: String,
    pub count: u64,
}

/// Threat widget data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreatSummary {
    pub total: u64,
    pub by_severity: BTreeMap<String, u64>,
    /// Sorted by count, highest first.
    pub top_categories: Vec<ThreatCount>,
}

/// Deterministic source of mock FortiManager and dashboard data.
pub struct MockGenerator {
    rng: StdRng,
}

impl MockGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draw a probability in `[0, 1)`; used by callers that simulate churn.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.random_bool(probability.clamp(0.0, 1.0))
    }

    pub fn pick_index(&mut self, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            self.rng.random_range(0..len)
        }
    }

    pub fn system_status(&self) -> SystemStatus {
        SystemStatus {
            hostname: Some("fmg-demo".into()),
            version: Some("v7.4.4-build2583 (GA)".into()),
            serial: Some("FMG-VMTM00000001".into()),
            platform: Some("FortiManager-VM64".into()),
            adom_mode: Some("Enabled".into()),
            ha_mode: Some("Stand Alone".into()),
        }
    }

    pub fn adoms(&self) -> Vec<Adom> {
        [
            ("root", "Default ADOM"),
            ("branch-offices", "Retail branch firewalls"),
            ("datacenter", "Core and DMZ clusters"),
        ]
        .into_iter()
        .map(|(name, desc)| Adom {
            name: name.into(),
            description: Some(desc.into()),
            os_ver: Some("7.0".into()),
            mr: Some(4),
        })
        .collect()
    }

    /// An admin account with full API access to every ADOM.
    pub fn admin_user(&self, name: &str) -> AdminUser {
        AdminUser {
            userid: name.to_string(),
            profileid: Some("Super_User".into()),
            rpc_permit: RpcPermit::ReadWrite,
            adom: vec!["all_adoms".into()],
        }
    }

    /// Generate `count` devices for `adom`, named `FGT-{ADOM}-{nn}`.
    pub fn devices(&mut self, adom: &str, count: usize) -> Vec<ManagedDevice> {
        let prefix: String = adom
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(6)
            .collect::<String>()
            .to_ascii_uppercase();
        let subnet = self.rng.random_range(1..=250u8);

        (1..=count)
            .map(|i| {
                let platform = PLATFORMS.choose(&mut self.rng).copied().unwrap_or("FortiGate-60F");
                let (major, minor, patch) =
                    FIRMWARE.choose(&mut self.rng).copied().unwrap_or((7, 2, 8));
                let status = if self.rng.random_bool(UP_PROBABILITY) {
                    ConnStatus::Up
                } else {
                    ConnStatus::Down
                };
                let name = format!("FGT-{prefix}-{i:02}");
                let model = platform.trim_start_matches("FortiGate-");

                ManagedDevice {
                    hostname: Some(name.to_ascii_lowercase()),
                    ip: Some(format!("10.{subnet}.{i}.1")),
                    serial: Some(format!(
                        "FG{model}TK{:08}",
                        self.rng.random_range(0..100_000_000u32)
                    )),
                    platform: Some(platform.to_string()),
                    os_ver: Some(major.to_string()),
                    mr: Some(i64::from(minor)),
                    patch: Some(i64::from(patch)),
                    conn_status: status,
                    ha_mode: Some("standalone".into()),
                    description: None,
                    name,
                }
            })
            .collect()
    }

    /// A fixed package layout: one top-level package and two in a folder.
    pub fn policy_packages(&self, devices: &[ManagedDevice]) -> Vec<PolicyPackage> {
        let scope: Vec<String> = devices.iter().map(|d| format!("{}/root", d.name)).collect();
        let (first_half, second_half) = scope.split_at(scope.len() / 2);

        vec![
            PolicyPackage {
                name: "default".into(),
                path: "default".into(),
                scope: Vec::new(),
            },
            PolicyPackage {
                name: "standard".into(),
                path: "branch/standard".into(),
                scope: first_half.to_vec(),
            },
            PolicyPackage {
                name: "strict".into(),
                path: "branch/strict".into(),
                scope: second_half.to_vec(),
            },
        ]
    }

    pub fn firewall_policies(&mut self, count: usize) -> Vec<FirewallPolicy> {
        (1..=count)
            .map(|i| {
                let service_count = self.rng.random_range(1..=3);
                let service: Vec<String> = SERVICES
                    .choose_multiple(&mut self.rng, service_count)
                    .map(|s| s.to_string())
                    .collect();
                let action = if i == count {
                    PolicyAction::Deny
                } else if self.rng.random_bool(0.8) {
                    PolicyAction::Accept
                } else {
                    PolicyAction::Deny
                };

                FirewallPolicy {
                    policyid: i as i64,
                    name: Some(format!("policy-{i:03}")),
                    srcintf: vec![self.pick(INTERFACES)],
                    dstintf: vec![self.pick(INTERFACES)],
                    srcaddr: vec!["all".into()],
                    dstaddr: vec![format!("net-{:02}", self.rng.random_range(1..=20))],
                    service,
                    action,
                    enabled: self.rng.random_bool(0.9),
                    schedule: Some("always".into()),
                    logtraffic: Some("all".into()),
                    comments: None,
                }
            })
            .collect()
    }

    pub fn address_objects(&mut self, count: usize) -> Vec<AddressObject> {
        (1..=count)
            .map(|i| {
                if i % 5 == 0 {
                    AddressObject {
                        name: format!("host-{i:02}.example.com"),
                        kind: Some("fqdn".into()),
                        subnet: Vec::new(),
                        fqdn: Some(format!("host-{i:02}.example.com")),
                        comments: None,
                    }
                } else {
                    let third = self.rng.random_range(0..=255u8);
                    AddressObject {
                        name: format!("net-{i:02}"),
                        kind: Some("ipmask".into()),
                        subnet: vec![format!("172.16.{third}.0"), "255.255.255.0".into()],
                        fqdn: None,
                        comments: Some("generated".into()),
                    }
                }
            })
            .collect()
    }

    /// `points` samples spaced `step` apart, ending at `end`, following a
    /// daily curve that peaks mid-afternoon.
    pub fn traffic_series(
        &mut self,
        points: usize,
        step: Duration,
        end: Timestamp,
    ) -> Vec<TrafficSample> {
        (0..points)
            .rev()
            .map(|back| {
                let timestamp = end - step * back as i32;
                let hour = f64::from(timestamp.hour()) + f64::from(timestamp.minute()) / 60.0;
                let load = 1.0 + 0.6 * (2.0 * PI * (hour - 9.0) / 24.0).sin();
                let noise = self.rng.random_range(0.85..1.15);
                let bytes_in = (250_000_000.0 * load * noise) as u64;
                let bytes_out = (bytes_in as f64 * self.rng.random_range(0.2..0.45)) as u64;
                let sessions = (1_800.0 * load * noise) as u64;
                TrafficSample {
                    timestamp,
                    bytes_in,
                    bytes_out,
                    sessions,
                }
            })
            .collect()
    }

    pub fn threat_summary(&mut self) -> ThreatSummary {
        let total = self.rng.random_range(200..2_000u64);

        let mut by_severity = BTreeMap::new();
        let mut assigned = 0;
        for (i, (severity, share)) in SEVERITIES.iter().enumerate() {
            let count = if i + 1 == SEVERITIES.len() {
                total - assigned
            } else {
                total * share / 100
            };
            assigned += count;
            by_severity.insert(severity.to_string(), count);
        }

        let mut top_categories: Vec<ThreatCount> = THREAT_CATEGORIES
            .iter()
            .map(|name| ThreatCount {
                name: name.to_string(),
                count: self.rng.random_range(0..total / 3),
            })
            .collect();
        top_categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        top_categories.truncate(5);

        ThreatSummary {
            total,
            by_severity,
            top_categories,
        }
    }

    fn pick(&mut self, items: &[&str]) -> String {
        items.choose(&mut self.rng).copied().unwrap_or_default().to_string()
    }
}
