// Copyright (c) 2025 - Cowboy AI, Inc.
//! Generation pipeline integration tests
//!
//! Cross-report consistency, provenance, failure isolation of the fan-out
//! and first-writer-wins behavior of the lazy registry.

mod fixtures;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinSet;

use fixtures::*;
use inventory_synth::inventory::{Inventory, NetworkRequest};
use inventory_synth::config::TierParams;
use inventory_synth::pipeline::{default_fanout, run_generation, run_with_generators, GenerationOutput, RunOptions};
use inventory_synth::reports::{GenerationContext, RecordGenerator};
use inventory_synth::synth::FieldSynthesizer;
use inventory_synth::topology::sdk_server;
use inventory_synth::{Report, ReportCategory};

/// Rows per VM UUID in one report
fn rows_per_vm(report: &Report) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for uuid in report.column_values("VM UUID") {
        *counts.entry(uuid.to_string()).or_insert(0) += 1;
    }
    counts
}

fn assert_counts_match_inventory(output: &GenerationOutput) {
    let disks = rows_per_vm(output.report(ReportCategory::VDisk).unwrap());
    let nics = rows_per_vm(output.report(ReportCategory::VNetwork).unwrap());

    for vm in output.inventory.vms() {
        let uuid = vm.uuid.to_string();
        assert_eq!(disks.get(&uuid).copied().unwrap_or(0), vm.disk_count as usize, "disks of {}", vm.name);
        assert_eq!(nics.get(&uuid).copied().unwrap_or(0), vm.nic_count as usize, "NICs of {}", vm.name);
    }
}

#[tokio::test]
async fn test_disk_and_nic_rows_match_scenario_counts() {
    let output = run_scenario(two_vm_scenario()).await;
    assert_counts_match_inventory(&output);
    assert_eq!(output.report(ReportCategory::VDisk).unwrap().len(), 4);
    assert_eq!(output.report(ReportCategory::VNetwork).unwrap().len(), 4);
}

#[tokio::test]
async fn test_disk_and_nic_rows_match_randomized_counts() {
    let output = run_randomized(SEED, 60).await;
    assert_counts_match_inventory(&output);
}

#[tokio::test]
async fn test_every_category_in_export_order() {
    let output = run_randomized(SEED, 10).await;
    let categories: Vec<ReportCategory> = output.reports.iter().map(|r| r.category).collect();
    assert_eq!(categories, ReportCategory::ALL.to_vec());
}

#[tokio::test]
async fn test_provenance_identical_across_all_rows() {
    let output = run_scenario(two_vm_scenario()).await;
    let sdk = output.inventory.sdk();

    let mut servers = HashSet::new();
    let mut uuids = HashSet::new();
    for report in &output.reports {
        for row in &report.rows {
            assert_eq!(row.len(), report.headers.len(), "{} row width", report.category);
            servers.insert(row[row.len() - 2].clone());
            uuids.insert(row[row.len() - 1].clone());
        }
    }
    assert_eq!(servers.into_iter().collect::<Vec<_>>(), vec![sdk.name.clone()]);
    assert_eq!(uuids.into_iter().collect::<Vec<_>>(), vec![sdk.uuid.to_string()]);
}

#[tokio::test]
async fn test_network_reports_agree() {
    let output = run_scenario(two_vm_scenario()).await;

    // both VMs share one distributed and one standard port group
    let dv_ports = output.report(ReportCategory::DvPort).unwrap();
    assert_eq!(dv_ports.column_values("Port"), vec!["dvPG-Web-110"]);
    assert_eq!(output.report(ReportCategory::DvSwitch).unwrap().len(), 1);

    let ports = output.report(ReportCategory::VPort).unwrap();
    assert_eq!(ports.column_values("Port Group"), vec!["VM Network"]);

    // one standard switch per host, whether or not a port group lives on it
    let switches = output.report(ReportCategory::VSwitch).unwrap();
    assert_eq!(switches.len(), output.inventory.hosts().len());
    let switch_names: HashSet<&str> = switches.column_values("Switch").into_iter().collect();
    for switch in ports.column_values("Switch") {
        assert!(switch_names.contains(switch), "port group on unknown switch {}", switch);
    }
}

/// Switch name to datacenter, from the vSwitch report
fn vswitch_datacenters(output: &GenerationOutput) -> HashMap<String, String> {
    let report = output.report(ReportCategory::VSwitch).unwrap();
    let switch = report.column("Switch").unwrap();
    let datacenter = report.column("Datacenter").unwrap();
    report
        .rows
        .iter()
        .map(|row| (row[switch].clone(), row[datacenter].clone()))
        .collect()
}

fn assert_vnic_uplinks_are_known(output: &GenerationOutput) {
    let switches = vswitch_datacenters(output);
    assert_eq!(switches.len(), output.report(ReportCategory::VSwitch).unwrap().len(), "duplicate switch rows");

    let nics = output.report(ReportCategory::VNic).unwrap();
    assert!(!nics.is_empty());
    let switch = nics.column("Switch").unwrap();
    let datacenter = nics.column("Datacenter").unwrap();
    for row in &nics.rows {
        assert_eq!(
            switches.get(&row[switch]),
            Some(&row[datacenter]),
            "vNIC uplink {} missing from vSwitch",
            row[switch]
        );
    }
}

#[tokio::test]
async fn test_vnic_switches_are_vswitch_switches() {
    assert_vnic_uplinks_are_known(&run_randomized(SEED, 60).await);
    assert_vnic_uplinks_are_known(&run_scenario(two_vm_scenario()).await);
}

#[tokio::test]
async fn test_two_datacenters_keep_names_apart() {
    let output = run_scenario(two_datacenter_scenario()).await;
    let inv = &output.inventory;
    assert_eq!(inv.datacenters().len(), 2);
    assert_eq!(inv.hosts().len(), 4);
    assert_vnic_uplinks_are_known(&output);

    let local: Vec<&str> = inv
        .datastores()
        .iter()
        .filter(|d| d.local)
        .map(|d| d.name.as_str())
        .collect();
    let distinct: HashSet<&str> = local.iter().copied().collect();
    assert_eq!(local.len(), 4);
    assert_eq!(distinct.len(), local.len(), "local datastores collide: {:?}", local);

    // every switch belongs to the datacenter of the host that owns it
    let switches = vswitch_datacenters(&output);
    assert_eq!(switches.len(), inv.hosts().len());
    for host in inv.hosts() {
        let owner = &inv.datacenter(host.datacenter).name;
        let owned: Vec<_> = output
            .report(ReportCategory::VSwitch)
            .unwrap()
            .rows
            .iter()
            .filter(|row| row[0] == host.name)
            .collect();
        assert_eq!(owned.len(), 1, "switches of {}", host.name);
        assert_eq!(&owned[0][1], owner);
    }

    // a network and its switch always sit in the same datacenter
    for network in inv.lazy().networks().await {
        let switch = inv.lazy().find_switch(&network.switch).await.unwrap();
        assert_eq!(switch.datacenter, network.datacenter, "network {}", network.name);
    }
    let ports = output.report(ReportCategory::VPort).unwrap();
    let port_switch = ports.column("Switch").unwrap();
    let port_dc = ports.column("Datacenter").unwrap();
    for row in &ports.rows {
        assert_eq!(switches.get(&row[port_switch]), Some(&row[port_dc]));
    }
    // port group names are run-wide, so the first datacenter to use one owns it
    let dv_switches = output.report(ReportCategory::DvSwitch).unwrap();
    assert_eq!(dv_switches.column_values("Datacenter"), vec!["DC-East"]);
}

#[tokio::test]
async fn test_powered_off_nics_never_connected() {
    let output = run_randomized(SEED, 80).await;
    let report = output.report(ReportCategory::VNetwork).unwrap();
    let power = report.column("Powerstate").unwrap();
    let connected = report.column("Connected").unwrap();
    let ip = report.column("IPv4 Address").unwrap();

    for row in &report.rows {
        if row[power] != "poweredOn" {
            assert_eq!(row[connected], "False");
            assert_eq!(row[ip], "");
        }
    }
}

#[tokio::test]
async fn test_non_finite_likelihoods_generate_without_features() {
    let params = TierParams {
        snapshot_likelihood: f64::NAN,
        advanced_feature_likelihood: f64::NAN,
        ..params()
    };
    let options = RunOptions::new(SEED, params, 20).with_generated_at(fixed_timestamp());
    let output = run_generation(options, None, FieldSynthesizer::deterministic()).await;

    assert_eq!(output.reports.len(), ReportCategory::ALL.len());
    assert_eq!(output.report(ReportCategory::VInfo).unwrap().len(), 20);
    assert!(output.report(ReportCategory::VSnapshot).unwrap().is_empty());
}

#[tokio::test]
async fn test_same_seed_same_reports() {
    let a = run_randomized(1234, 40).await;
    let b = run_randomized(1234, 40).await;

    assert_eq!(a.row_counts(), b.row_counts());
    for category in [ReportCategory::VInfo, ReportCategory::VDisk, ReportCategory::VNetwork] {
        assert_eq!(a.report(category), b.report(category), "{}", category);
    }
}

/// Generator that always panics, standing in for a broken category
struct PanickingGenerator(ReportCategory);

#[async_trait]
impl RecordGenerator for PanickingGenerator {
    fn category(&self) -> ReportCategory {
        self.0
    }

    async fn generate(&self, _ctx: &GenerationContext) -> Report {
        panic!("{} generator exploded", self.0)
    }
}

#[tokio::test]
async fn test_panicking_generator_drops_only_its_category() {
    let mut fanout: Vec<Arc<dyn RecordGenerator>> = default_fanout()
        .into_iter()
        .filter(|g| g.category() != ReportCategory::VSnapshot)
        .collect();
    fanout.push(Arc::new(PanickingGenerator(ReportCategory::VSnapshot)));

    let output = run_with_generators(
        options(SEED, 20),
        None,
        FieldSynthesizer::deterministic(),
        fanout,
    )
    .await;

    assert!(output.report(ReportCategory::VSnapshot).is_none());
    assert_eq!(output.reports.len(), ReportCategory::ALL.len() - 1);
    assert_eq!(output.report(ReportCategory::VInfo).unwrap().len(), 20);
    assert!(output.report(ReportCategory::VDatastore).is_some());
}

#[tokio::test]
async fn test_concurrent_ensure_network_creates_one_entity() {
    let mut rng = StdRng::seed_from_u64(3);
    let inventory = Arc::new(Inventory::new(sdk_server(&mut rng), fixed_timestamp()));

    let mut tasks = JoinSet::new();
    for i in 0..16 {
        let inventory = Arc::clone(&inventory);
        tasks.spawn(async move {
            let host = format!("esx-{:02}.synth.local", i);
            inventory
                .lazy()
                .ensure_network(NetworkRequest {
                    name: "App-Net",
                    datacenter: "DC1",
                    host: &host,
                })
                .await
        });
    }

    let mut seen = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        seen.push(joined.unwrap());
    }

    let first = &seen[0];
    assert!(seen.iter().all(|n| n == first));
    assert_eq!(inventory.lazy().networks().await.len(), 1);
    assert_eq!(inventory.lazy().switches().await.len(), 1);
}

#[tokio::test]
async fn test_hostless_vms_mint_one_fallback_datastore() {
    let output = run_scenario(hostless_scenario()).await;

    let disks = output.report(ReportCategory::VDisk).unwrap();
    let datastores: HashSet<&str> = disks.column_values("Datastore").into_iter().collect();
    assert_eq!(datastores.len(), 1);

    let ds_report = output.report(ReportCategory::VDatastore).unwrap();
    let placeholder = ds_report.column_values("Placeholder");
    assert_eq!(placeholder.iter().filter(|p| **p == "True").count(), 1);
}
