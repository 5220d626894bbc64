// Copyright (c) 2025 - Cowboy AI, Inc.
//! Entity Kind Taxonomy
//!
//! Names the kinds of entity whose content fields the synthesizer produces.
//! The taxonomy is closed: every kind has a field contract and a
//! deterministic fallback generator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of entity whose content the field synthesizer can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Virtual machine
    Vm,
    /// Hypervisor host
    Host,
    /// Host cluster
    Cluster,
    /// Datastore (local or shared)
    Datastore,
    /// Virtual disk attached to a VM
    Disk,
    /// Virtual network adapter attached to a VM
    Nic,
    /// VM snapshot
    Snapshot,
    /// Host bus adapter on a host
    Hba,
}

impl EntityKind {
    /// Every kind, in contract-table order
    pub const ALL: [EntityKind; 8] = [
        Self::Vm,
        Self::Host,
        Self::Cluster,
        Self::Datastore,
        Self::Disk,
        Self::Nic,
        Self::Snapshot,
        Self::Hba,
    ];

    /// Get the canonical string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vm => "vm",
            Self::Host => "host",
            Self::Cluster => "cluster",
            Self::Datastore => "datastore",
            Self::Disk => "disk",
            Self::Nic => "nic",
            Self::Snapshot => "snapshot",
            Self::Hba => "hba",
        }
    }

    /// Human readable description used when describing the schema to a provider
    pub fn description(&self) -> &'static str {
        match self {
            Self::Vm => "a virtual machine running on a hypervisor host",
            Self::Host => "a hypervisor host in a cluster",
            Self::Cluster => "a cluster of hypervisor hosts",
            Self::Datastore => "a datastore backing virtual machine files",
            Self::Disk => "a virtual disk attached to a virtual machine",
            Self::Nic => "a virtual network adapter attached to a virtual machine",
            Self::Snapshot => "a point-in-time snapshot of a virtual machine",
            Self::Hba => "a storage host bus adapter on a hypervisor host",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown entity kind: {}", s))
    }
}
