// Copyright (c) 2025 - Cowboy AI, Inc.
//! Declarative Scenario Model
//!
//! A scenario arrives as an already-parsed tree (`serde_json::Value`) and is
//! deserialized into these types. Every field except the datacenter list and
//! the deployment-plan keys is optional; the builder fills gaps from profile
//! hints and then from the complexity tier.
//!
//! ```yaml
//! datacenters:
//!   - name: DC-East
//!     cluster_profiles:
//!       prod: { host_hardware_profile: r650, num_hosts: 4 }
//!     deployment_plan:
//!       - { profile_name: web, count: 20, target_cluster_profile: prod }
//!     shared_datastores:
//!       - { name: san-gold-01, type: VMFS, capacity_gb: 16384, tags: [gold] }
//! host_hardware_profiles:
//!   r650: { vendor: Dell Inc., sockets: 2, cores_per_socket: 32, memory_gb: 512 }
//! vm_profiles:
//!   web: { name_prefix: web, os_hints: [Ubuntu Linux (64-bit)], networks: [dvPG-Web-110] }
//! ```
//!
//! Profile maps are ordered by name, so expansion order does not depend on
//! how the source document was written.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::errors::ScenarioError;

/// Parsed scenario tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub datacenters: Vec<DatacenterSpec>,
    #[serde(default)]
    pub host_hardware_profiles: BTreeMap<String, HostHardwareProfile>,
    #[serde(default)]
    pub vm_profiles: BTreeMap<String, VmProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatacenterSpec {
    pub name: String,
    #[serde(default)]
    pub cluster_profiles: BTreeMap<String, ClusterProfile>,
    #[serde(default)]
    pub deployment_plan: Vec<DeploymentEntry>,
    #[serde(default)]
    pub shared_datastores: Vec<SharedDatastoreSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterProfile {
    #[serde(default)]
    pub host_hardware_profile: Option<String>,
    /// `None` uses the tier's hosts-per-cluster; `Some(0)` is honoured
    #[serde(default)]
    pub num_hosts: Option<u32>,
    /// Defaults to `<datacenter>-<profile>`
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default)]
    pub ha_enabled: Option<bool>,
    #[serde(default)]
    pub drs_enabled: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeploymentEntry {
    pub profile_name: String,
    pub count: u32,
    pub target_cluster_profile: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SharedDatastoreSpec {
    pub name: String,
    #[serde(default, rename = "type")]
    pub ds_type: Option<String>,
    #[serde(default)]
    pub capacity_gb: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalDatastoreSpec {
    #[serde(default, rename = "type")]
    pub ds_type: Option<String>,
    #[serde(default)]
    pub capacity_gb: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostHardwareProfile {
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub cpu_model: Option<String>,
    #[serde(default)]
    pub sockets: Option<u32>,
    #[serde(default)]
    pub cores_per_socket: Option<u32>,
    #[serde(default)]
    pub cpu_mhz: Option<u32>,
    #[serde(default)]
    pub memory_gb: Option<u64>,
    #[serde(default)]
    pub nic_count: Option<u32>,
    #[serde(default)]
    pub hba_count: Option<u32>,
    #[serde(default)]
    pub esxi_version: Option<String>,
    #[serde(default)]
    pub local_datastore: Option<LocalDatastoreSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VmProfile {
    #[serde(default)]
    pub name_prefix: Option<String>,
    #[serde(default)]
    pub os_hints: Vec<String>,
    #[serde(default)]
    pub vcpu: Option<u32>,
    #[serde(default)]
    pub memory_mb: Option<u64>,
    #[serde(default)]
    pub disk_gb: Option<u64>,
    #[serde(default)]
    pub disk_count: Option<u32>,
    #[serde(default)]
    pub nic_count: Option<u32>,
    #[serde(default)]
    pub power_on_ratio: Option<f64>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub resource_pool: Option<String>,
    #[serde(default)]
    pub networks: Vec<String>,
    #[serde(default)]
    pub datastore: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Scenario {
    /// Deserialize an already-parsed scenario tree
    pub fn from_value(tree: Value) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_value(tree)?;
        scenario.checked()
    }

    /// Parse a YAML scenario document
    pub fn from_yaml_str(source: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_yaml::from_str(source)?;
        scenario.checked()
    }

    fn checked(self) -> Result<Self, ScenarioError> {
        if self.datacenters.is_empty() {
            return Err(ScenarioError::Empty);
        }
        Ok(self)
    }

    /// Total VMs requested by every deployment plan
    pub fn planned_vm_count(&self) -> u64 {
        self.datacenters
            .iter()
            .flat_map(|dc| dc.deployment_plan.iter())
            .map(|entry| u64::from(entry.count))
            .sum()
    }
}
