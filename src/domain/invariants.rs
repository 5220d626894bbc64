// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Inventory Invariants
//!
//! Checks a built inventory against the referential and business rules every
//! generator relies on. All functions are pure and report every violation
//! they find instead of stopping at the first.
//!
//! # Invariant Categories
//!
//! 1. **Placement**: a VM's cluster and datacenter are its host's
//! 2. **Storage**: local datastores have exactly their owner connected,
//!    shared datastores only hosts of their datacenter
//! 3. **Identity**: VM and host UUIDs are unique
//! 4. **Counts**: a VM's declared NIC count matches its network list
//! 5. **Business rules**: power-state dependent guest fields, CPU arithmetic

use std::collections::HashSet;

use crate::domain::entities::{HostHardware, VirtualMachine};
use crate::inventory::Inventory;

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// A single invariant violation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("VM {vm} placed in {actual} but its host belongs to {expected}")]
    PlacementMismatch {
        vm: String,
        expected: String,
        actual: String,
    },

    #[error("Local datastore {datastore} has {count} connected hosts")]
    LocalDatastoreHosts { datastore: String, count: usize },

    #[error("Local datastore {datastore} is not listed by its host")]
    LocalDatastoreOwner { datastore: String },

    #[error("Shared datastore {datastore} is connected to foreign host {host}")]
    SharedDatastoreForeignHost { datastore: String, host: String },

    #[error("Duplicate UUID {uuid} on {entity}")]
    DuplicateUuid { entity: String, uuid: String },

    #[error("VM {vm} declares {declared} NICs but lists {listed} networks")]
    NicCountDrift {
        vm: String,
        declared: u32,
        listed: usize,
    },

    #[error("VM {vm} violates guest rule: {rule}")]
    GuestRule { vm: String, rule: String },

    #[error("Host {host} CPU total {total} != {sockets} x {cores} x {mhz}")]
    CpuArithmetic {
        host: String,
        total: u64,
        sockets: u32,
        cores: u32,
        mhz: u32,
    },
}

/// Power-state rules for one VM's guest fields
///
/// - not powered on: in-use storage is 0, IP and DNS name are empty
/// - powered on: provisioned storage exceeds in-use storage
pub fn validate_vm_guest_rules(vm: &VirtualMachine) -> ValidationResult {
    let violation = |rule: &str| ValidationError::GuestRule {
        vm: vm.name.clone(),
        rule: rule.to_string(),
    };

    if vm.power_state.reports_guest_info() {
        if vm.provisioned_mib <= vm.in_use_mib {
            return Err(violation("provisioned size must exceed in-use size"));
        }
    } else {
        if vm.in_use_mib != 0 {
            return Err(violation("in-use size must be 0 when not powered on"));
        }
        if !vm.ip_address.is_empty() || !vm.dns_name.is_empty() {
            return Err(violation("IP and DNS must be empty when not powered on"));
        }
    }

    Ok(())
}

/// Total CPU equals sockets x cores per socket x per-core clock
pub fn validate_host_cpu(name: &str, hw: &HostHardware) -> ValidationResult {
    let expected = HostHardware::cpu_total(hw.sockets.into(), hw.cores_per_socket.into(), hw.cpu_mhz.into());
    if hw.cpu_mhz_total != expected {
        return Err(ValidationError::CpuArithmetic {
            host: name.to_string(),
            total: hw.cpu_mhz_total,
            sockets: hw.sockets,
            cores: hw.cores_per_socket,
            mhz: hw.cpu_mhz,
        });
    }
    Ok(())
}

/// Check every invariant of a built inventory
///
/// Returns an empty vector when the inventory is consistent.
pub fn validate_inventory(inventory: &Inventory) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen_uuids = HashSet::new();

    for host in inventory.hosts() {
        if let Err(e) = validate_host_cpu(&host.name, &host.hardware) {
            errors.push(e);
        }
        if !seen_uuids.insert(host.uuid) {
            errors.push(ValidationError::DuplicateUuid {
                entity: host.name.clone(),
                uuid: host.uuid.to_string(),
            });
        }
    }

    for (idx, ds) in inventory.datastores().iter().enumerate() {
        if ds.local {
            if ds.connected_hosts.len() != 1 {
                errors.push(ValidationError::LocalDatastoreHosts {
                    datastore: ds.name.clone(),
                    count: ds.connected_hosts.len(),
                });
                continue;
            }
            let owner = inventory.host(ds.connected_hosts[0]);
            if !owner.local_datastores.iter().any(|d| d.index() == idx) {
                errors.push(ValidationError::LocalDatastoreOwner {
                    datastore: ds.name.clone(),
                });
            }
        } else {
            for host_id in &ds.connected_hosts {
                let host = inventory.host(*host_id);
                if host.datacenter != ds.datacenter {
                    errors.push(ValidationError::SharedDatastoreForeignHost {
                        datastore: ds.name.clone(),
                        host: host.name.clone(),
                    });
                }
            }
        }
    }

    for vm in inventory.vms() {
        if let Some(host_id) = vm.host {
            let host = inventory.host(host_id);
            if host.cluster != vm.cluster || host.datacenter != vm.datacenter {
                errors.push(ValidationError::PlacementMismatch {
                    vm: vm.name.clone(),
                    expected: inventory.cluster(host.cluster).name.clone(),
                    actual: inventory.cluster(vm.cluster).name.clone(),
                });
            }
        }
        if vm.networks.len() != vm.nic_count as usize {
            errors.push(ValidationError::NicCountDrift {
                vm: vm.name.clone(),
                declared: vm.nic_count,
                listed: vm.networks.len(),
            });
        }
        if !seen_uuids.insert(vm.uuid) {
            errors.push(ValidationError::DuplicateUuid {
                entity: vm.name.clone(),
                uuid: vm.uuid.to_string(),
            });
        }
        if let Err(e) = validate_vm_guest_rules(vm) {
            errors.push(e);
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn vm(power_state: PowerState, provisioned: u64, in_use: u64, ip: &str) -> VirtualMachine {
        VirtualMachine {
            id: VmId(0),
            name: "web001".to_string(),
            uuid: Uuid::nil(),
            power_state,
            host: None,
            cluster: ClusterId(0),
            datacenter: DatacenterId(0),
            folder: FolderId(0),
            resource_pool: ResourcePoolId(0),
            vcpu: 2,
            memory_mib: 4096,
            disk_count: 1,
            nic_count: 1,
            networks: vec!["VM Network".to_string()],
            os: "Ubuntu Linux (64-bit)".to_string(),
            provisioned_mib: provisioned,
            in_use_mib: in_use,
            ip_address: ip.to_string(),
            dns_name: String::new(),
            annotation: String::new(),
            profile: None,
            datastore_hint: None,
            tags: vec![],
            created: Utc::now(),
        }
    }

    #[test]
    fn test_powered_off_rules() {
        assert!(validate_vm_guest_rules(&vm(PowerState::PoweredOff, 1000, 0, "")).is_ok());
        assert!(validate_vm_guest_rules(&vm(PowerState::PoweredOff, 1000, 10, "")).is_err());
        assert!(validate_vm_guest_rules(&vm(PowerState::PoweredOff, 1000, 0, "10.0.0.1")).is_err());
        assert!(validate_vm_guest_rules(&vm(PowerState::Suspended, 1000, 0, "")).is_ok());
    }

    #[test]
    fn test_powered_on_rules() {
        assert!(validate_vm_guest_rules(&vm(PowerState::PoweredOn, 1000, 999, "10.0.0.1")).is_ok());
        assert!(validate_vm_guest_rules(&vm(PowerState::PoweredOn, 1000, 1000, "")).is_err());
    }

    #[test]
    fn test_host_cpu_arithmetic() {
        let mut hw = HostHardware {
            vendor: "HPE".to_string(),
            model: "ProLiant DL380 Gen10".to_string(),
            cpu_model: "Intel(R) Xeon(R) Gold 6248".to_string(),
            sockets: 2,
            cores_per_socket: 20,
            cpu_mhz: 2500,
            cpu_mhz_total: 100_000,
            memory_mib: 393_216,
            esxi_version: "VMware ESXi 7.0.3".to_string(),
            nic_count: 4,
            hba_count: 2,
            serial: "XYZ9876".to_string(),
        };
        assert!(validate_host_cpu("esx01", &hw).is_ok());
        hw.cpu_mhz_total += 1;
        assert!(matches!(
            validate_host_cpu("esx01", &hw),
            Err(ValidationError::CpuArithmetic { .. })
        ));
    }
}
