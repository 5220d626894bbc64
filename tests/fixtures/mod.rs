// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for inventory-synth
//!
//! Scenario trees and run helpers shared by the integration tests.
//!
//! # Design Principles
//! - All runs use a fixed seed and a fixed generation timestamp
//! - Scenarios are built from `json!` trees, the same shape a parsed YAML document has
//! - Every run uses the deterministic generator unless a test injects a provider

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde_json::json;

use inventory_synth::config::{ComplexityTier, TierParams};
use inventory_synth::pipeline::{run_generation, GenerationOutput, RunOptions};
use inventory_synth::scenario::Scenario;
use inventory_synth::synth::FieldSynthesizer;

pub const SEED: u64 = 7;

// Fixed generation timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

/// Parse the fixed timestamp
pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

pub fn params() -> TierParams {
    ComplexityTier::Medium.params()
}

pub fn options(seed: u64, vm_count: u32) -> RunOptions {
    RunOptions::new(seed, params(), vm_count).with_generated_at(fixed_timestamp())
}

/// One datacenter, one two-host cluster, one profile deployed twice
pub fn two_vm_scenario() -> Scenario {
    Scenario::from_value(json!({
        "datacenters": [{
            "name": "DC-East",
            "cluster_profiles": {
                "prod": { "host_hardware_profile": "r650", "num_hosts": 2 }
            },
            "deployment_plan": [
                { "profile_name": "web", "count": 2, "target_cluster_profile": "prod" }
            ],
            "shared_datastores": [
                { "name": "san-gold-01", "type": "VMFS", "capacity_gb": 4096, "tags": ["gold"] }
            ]
        }],
        "host_hardware_profiles": {
            "r650": {
                "vendor": "Dell Inc.", "model": "PowerEdge R650",
                "sockets": 2, "cores_per_socket": 16, "cpu_mhz": 2600, "memory_gb": 512
            }
        },
        "vm_profiles": {
            "web": {
                "name_prefix": "web", "vcpu": 4, "memory_mb": 8192,
                "disk_count": 2, "nic_count": 2,
                "networks": ["dvPG-Web-110", "VM Network"],
                "datastore": "san-gold-01"
            }
        }
    }))
    .expect("Invalid scenario fixture")
}

/// Cluster with zero hosts: every VM lands on the no-host sentinel
pub fn hostless_scenario() -> Scenario {
    Scenario::from_value(json!({
        "datacenters": [{
            "name": "DC-Empty",
            "cluster_profiles": { "ghost": { "num_hosts": 0 } },
            "deployment_plan": [
                { "profile_name": "app", "count": 3, "target_cluster_profile": "ghost" }
            ]
        }],
        "vm_profiles": {
            "app": { "name_prefix": "app", "disk_count": 1, "nic_count": 1 }
        }
    }))
    .expect("Invalid scenario fixture")
}

/// Deployment entries pointing at profiles that do not exist
pub fn gappy_scenario() -> Scenario {
    Scenario::from_value(json!({
        "datacenters": [{
            "name": "DC-Gaps",
            "cluster_profiles": {
                "prod": { "host_hardware_profile": "missing-hw", "num_hosts": 1 }
            },
            "deployment_plan": [
                { "profile_name": "undefined-profile", "count": 2, "target_cluster_profile": "prod" },
                { "profile_name": "db", "count": 1, "target_cluster_profile": "nowhere" }
            ]
        }],
        "vm_profiles": {
            "db": { "name_prefix": "db" }
        }
    }))
    .expect("Invalid scenario fixture")
}

/// Hardware profile whose CPU topology would overflow a 64-bit total
pub fn huge_hardware_scenario() -> Scenario {
    Scenario::from_value(json!({
        "datacenters": [{
            "name": "DC-Big",
            "cluster_profiles": {
                "big": { "host_hardware_profile": "monster", "num_hosts": 1 }
            },
            "deployment_plan": [
                { "profile_name": "app", "count": 1, "target_cluster_profile": "big" }
            ]
        }],
        "host_hardware_profiles": {
            "monster": {
                "sockets": 4_000_000_000u32, "cores_per_socket": 4_000_000_000u32,
                "cpu_mhz": 4_000_000_000u32, "memory_gb": u64::MAX
            }
        },
        "vm_profiles": {
            "app": { "name_prefix": "app" }
        }
    }))
    .expect("Invalid scenario fixture")
}

/// Two datacenters with identically shaped clusters and standard port groups
///
/// Hosts are numbered per datacenter, so both contain an `esx01`.
pub fn two_datacenter_scenario() -> Scenario {
    let datacenter = |name: &str| {
        json!({
            "name": name,
            "cluster_profiles": {
                "prod": { "host_hardware_profile": "r650", "num_hosts": 2 }
            },
            "deployment_plan": [
                { "profile_name": "web", "count": 3, "target_cluster_profile": "prod" }
            ]
        })
    };
    Scenario::from_value(json!({
        "datacenters": [datacenter("DC-East"), datacenter("DC-West")],
        "host_hardware_profiles": {
            "r650": { "sockets": 2, "cores_per_socket": 16, "cpu_mhz": 2600, "memory_gb": 512 }
        },
        "vm_profiles": {
            "web": {
                "name_prefix": "web", "nic_count": 2,
                "networks": ["dvPG-Web-110", "VM Network"]
            }
        }
    }))
    .expect("Invalid scenario fixture")
}

/// Deterministic run of a scenario
pub async fn run_scenario(scenario: Scenario) -> GenerationOutput {
    run_generation(options(SEED, 0), Some(scenario), FieldSynthesizer::deterministic()).await
}

/// Deterministic randomized run
pub async fn run_randomized(seed: u64, vm_count: u32) -> GenerationOutput {
    run_generation(options(seed, vm_count), None, FieldSynthesizer::deterministic()).await
}
