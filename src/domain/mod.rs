// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Domain Models
//!
//! Entities, value objects and pure helpers shared by the topology builder,
//! the field synthesizer and the report generators.
//!
//! # Value Objects with Invariants
//!
//! - [`MacAddress`] - 48-bit MAC address validation and generation
//! - [`VlanId`] - IEEE 802.1Q VLAN ID (1-4094)
//! - [`Mtu`] - virtual switch MTU (1280-9000 bytes)
//! - [`EntityKind`] - kinds of entity the synthesizer fills in
//!
//! # Entities
//!
//! Datacenters, clusters, hosts, datastores, resource pools, folders,
//! networks, switches and virtual machines live in [`entities`]; they are
//! stored and cross-referenced by [`crate::inventory::Inventory`].

pub mod entities;
pub mod entity_kind;
pub mod invariants;
pub mod naming;
pub mod network;

pub use entities::{
    Cluster, ClusterId, Datacenter, DatacenterId, Datastore, DatastoreId, Folder, FolderId, Host,
    HostHardware, HostId, Network, PowerState, ResourcePool, ResourcePoolId, SdkServer, Switch,
    SwitchKind, SwitchScope, VirtualMachine, VmId, NO_HOST,
};
pub use entity_kind::EntityKind;
pub use invariants::{validate_inventory, ValidationError, ValidationResult};
pub use network::{MacAddress, Mtu, NetworkError, VlanId};
