// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Entities
//!
//! Typed records for everything the topology builder creates. Cross
//! references between topology entities are index newtypes into the
//! [`Inventory`](crate::inventory::Inventory) collections; lazily created
//! entities (networks, switches, fallback datastores) are referenced by name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::network::{Mtu, VlanId};

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// Position of the entity in its inventory collection
            pub fn index(&self) -> usize {
                self.0
            }
        }
    };
}

entity_id!(
    /// Index of a [`Datacenter`]
    DatacenterId
);
entity_id!(
    /// Index of a [`Cluster`]
    ClusterId
);
entity_id!(
    /// Index of a [`Host`]
    HostId
);
entity_id!(
    /// Index of a topology [`Datastore`]
    DatastoreId
);
entity_id!(
    /// Index of a [`ResourcePool`]
    ResourcePoolId
);
entity_id!(
    /// Index of a [`Folder`]
    FolderId
);
entity_id!(
    /// Index of a [`VirtualMachine`]
    VmId
);

/// Host name reported for VMs that could not be placed
pub const NO_HOST: &str = "(no host)";

/// The management server every row claims to come from
///
/// Exactly one exists per run; its name and UUID are copied into every
/// report row as provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkServer {
    pub name: String,
    pub uuid: Uuid,
    pub version: String,
    pub build: String,
    pub api_version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datacenter {
    pub id: DatacenterId,
    pub name: String,
    pub clusters: Vec<ClusterId>,
    pub hosts: Vec<HostId>,
    pub datastores: Vec<DatastoreId>,
    pub folders: Vec<FolderId>,
    pub vms: Vec<VmId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: ClusterId,
    pub name: String,
    pub datacenter: DatacenterId,
    /// Scenario cluster profile this cluster was expanded from
    pub profile: Option<String>,
    pub hosts: Vec<HostId>,
    pub vms: Vec<VmId>,
    pub resource_pools: Vec<ResourcePoolId>,
    pub ha_enabled: bool,
    pub drs_enabled: bool,
    pub drs_behavior: String,
    /// Marks the stand-in cluster created for deployment entries whose target is missing
    pub placeholder: bool,
}

impl Cluster {
    /// Default resource pool, created together with the cluster
    pub fn root_pool(&self) -> Option<ResourcePoolId> {
        self.resource_pools.first().copied()
    }
}

/// Hardware facts of a host, synthesized once when the host is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostHardware {
    pub vendor: String,
    pub model: String,
    pub cpu_model: String,
    pub sockets: u32,
    pub cores_per_socket: u32,
    /// Per-core clock
    pub cpu_mhz: u32,
    /// Always `sockets * cores_per_socket * cpu_mhz`
    pub cpu_mhz_total: u64,
    pub memory_mib: u64,
    pub esxi_version: String,
    pub nic_count: u32,
    pub hba_count: u32,
    pub serial: String,
}

impl HostHardware {
    pub const MAX_SOCKETS: u32 = 16;
    pub const MAX_CORES_PER_SOCKET: u32 = 256;
    pub const MAX_CPU_MHZ: u32 = 10_000;
    /// 24 TiB
    pub const MAX_MEMORY_MIB: u64 = 24 * 1024 * 1024;

    /// `sockets * cores * mhz`, saturating instead of overflowing
    pub fn cpu_total(sockets: u64, cores_per_socket: u64, cpu_mhz: u64) -> u64 {
        sockets.saturating_mul(cores_per_socket).saturating_mul(cpu_mhz)
    }

    pub fn total_cores(&self) -> u32 {
        self.sockets.saturating_mul(self.cores_per_socket)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub id: HostId,
    pub name: String,
    pub uuid: Uuid,
    pub cluster: ClusterId,
    pub datacenter: DatacenterId,
    pub hardware_profile: Option<String>,
    pub hardware: HostHardware,
    pub local_datastores: Vec<DatastoreId>,
    pub vms: Vec<VmId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datastore {
    pub name: String,
    pub ds_type: String,
    pub capacity_mib: u64,
    pub accessible: bool,
    /// Local datastores are owned by exactly one host
    pub local: bool,
    pub connected_hosts: Vec<HostId>,
    pub datacenter: DatacenterId,
    pub tags: Vec<String>,
    /// Minted because nothing else could back a placement
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub id: ResourcePoolId,
    /// Hierarchical path below the cluster, `Resources/batch`
    pub name: String,
    pub cluster: ClusterId,
    pub parent: Option<ResourcePoolId>,
    pub vms: Vec<VmId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub datacenter: DatacenterId,
    pub vms: Vec<VmId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchKind {
    Standard,
    Distributed,
}

/// Where a switch lives: standard switches on one host, distributed ones per datacenter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchScope {
    Host(String),
    Datacenter(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switch {
    pub name: String,
    pub kind: SwitchKind,
    pub scope: SwitchScope,
    pub datacenter: String,
    pub mtu: Mtu,
    pub ports: u32,
}

/// Port group (standard) or distributed port group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub name: String,
    pub kind: SwitchKind,
    pub switch: String,
    pub vlan: VlanId,
    pub datacenter: String,
    /// Host of the first VM that referenced a standard port group
    pub host: Option<String>,
}

impl Network {
    /// Distributed port groups are recognised by their conventional prefixes
    pub fn kind_for_name(name: &str) -> SwitchKind {
        if name.starts_with("dvPG") || name.starts_with("dv-") {
            SwitchKind::Distributed
        } else {
            SwitchKind::Standard
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerState {
    #[serde(rename = "poweredOn")]
    PoweredOn,
    #[serde(rename = "poweredOff")]
    PoweredOff,
    #[serde(rename = "suspended")]
    Suspended,
}

impl PowerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PoweredOn => "poweredOn",
            Self::PoweredOff => "poweredOff",
            Self::Suspended => "suspended",
        }
    }

    pub fn is_on(&self) -> bool {
        matches!(self, Self::PoweredOn)
    }

    /// Guests only report in-use storage, IPs and DNS names while running
    pub fn reports_guest_info(&self) -> bool {
        self.is_on()
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PowerState {
    type Err = String;

    /// Accepts the inventory spelling plus the loose forms providers tend to emit
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['_', '-', ' '], "").as_str() {
            "poweredon" | "on" | "running" => Ok(Self::PoweredOn),
            "poweredoff" | "off" | "stopped" => Ok(Self::PoweredOff),
            "suspended" | "paused" => Ok(Self::Suspended),
            other => Err(format!("unknown power state: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualMachine {
    pub id: VmId,
    pub name: String,
    pub uuid: Uuid,
    pub power_state: PowerState,
    /// `None` when placement failed and the VM carries the [`NO_HOST`] sentinel
    pub host: Option<HostId>,
    pub cluster: ClusterId,
    pub datacenter: DatacenterId,
    pub folder: FolderId,
    pub resource_pool: ResourcePoolId,
    pub vcpu: u32,
    pub memory_mib: u64,
    /// Authoritative disk count; the disk report reproduces it exactly
    pub disk_count: u32,
    /// Authoritative NIC count; `networks.len()` always equals it
    pub nic_count: u32,
    pub networks: Vec<String>,
    pub os: String,
    pub provisioned_mib: u64,
    pub in_use_mib: u64,
    /// Empty while the VM is not powered on
    pub ip_address: String,
    /// Empty while the VM is not powered on
    pub dns_name: String,
    pub annotation: String,
    pub profile: Option<String>,
    pub datastore_hint: Option<String>,
    pub tags: Vec<String>,
    pub created: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("poweredOn", PowerState::PoweredOn)]
    #[test_case("on", PowerState::PoweredOn)]
    #[test_case("Powered_Off", PowerState::PoweredOff)]
    #[test_case("stopped", PowerState::PoweredOff)]
    #[test_case("suspended", PowerState::Suspended)]
    fn test_power_state_parse(input: &str, expected: PowerState) {
        assert_eq!(input.parse::<PowerState>().unwrap(), expected);
    }

    #[test]
    fn test_power_state_rejects_garbage() {
        assert!("sideways".parse::<PowerState>().is_err());
    }

    #[test]
    fn test_network_kind_for_name() {
        assert_eq!(Network::kind_for_name("dvPG-Prod-100"), SwitchKind::Distributed);
        assert_eq!(Network::kind_for_name("dv-backup"), SwitchKind::Distributed);
        assert_eq!(Network::kind_for_name("VM Network"), SwitchKind::Standard);
    }

    #[test]
    fn test_power_state_serde() {
        let json = serde_json::to_string(&PowerState::PoweredOff).unwrap();
        assert_eq!(json, "\"poweredOff\"");
    }
}
