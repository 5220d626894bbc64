// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network reports: vNetwork, vSwitch, vPort, dvSwitch, dvPort
//!
//! Port groups do not exist until a VM NIC references them. Every category
//! here walks the VMs in order and resolves each NIC's network through the
//! lazy registry, so all of them agree on the set of networks and on which
//! host owns each standard port group. Each host's standard switch lives in
//! the same registry; vNIC uplinks and vSwitch rows resolve the same entity.

use rand::rngs::StdRng;
use std::collections::{HashMap, HashSet};

use super::{cell, yes_no, GenerationContext};
use crate::domain::{EntityKind, Network, Switch, SwitchKind, SwitchScope};
use crate::inventory::NetworkRequest;
use crate::synth::SynthContext;

pub(super) const NETWORK_HEADERS: &[&str] = &[
    "VM",
    "Powerstate",
    "NIC label",
    "Adapter",
    "Network",
    "Switch",
    "Connected",
    "Starts Connected",
    "Mac Address",
    "Type",
    "IPv4 Address",
    "Host",
    "Cluster",
    "Datacenter",
    "VM UUID",
];

pub(super) const SWITCH_HEADERS: &[&str] = &[
    "Host",
    "Datacenter",
    "Cluster",
    "Switch",
    "# Ports",
    "Free Ports",
    "MTU",
];

pub(super) const PORT_HEADERS: &[&str] = &[
    "Host",
    "Datacenter",
    "Cluster",
    "Port Group",
    "Switch",
    "VLAN",
];

pub(super) const DV_SWITCH_HEADERS: &[&str] = &[
    "Switch",
    "Datacenter",
    "Vendor",
    "Version",
    "Host members",
    "# Ports",
    "Max MTU",
];

pub(super) const DV_PORT_HEADERS: &[&str] = &[
    "Port",
    "Switch",
    "Type",
    "# Ports",
    "VLAN",
    "Datacenter",
];

/// Every NIC's network, in VM order, created on first reference
///
/// Returns the distinct networks in first-reference order and the number of
/// NICs attached to each.
async fn referenced_networks(ctx: &GenerationContext) -> (Vec<Network>, HashMap<String, u32>) {
    let inv = &ctx.inventory;
    let mut seen = HashSet::new();
    let mut networks = Vec::new();
    let mut usage: HashMap<String, u32> = HashMap::new();

    for vm in inv.vms() {
        let datacenter = &inv.datacenter(vm.datacenter).name;
        let host = inv.vm_host_name(vm);
        for name in &vm.networks {
            let network = inv
                .lazy()
                .ensure_network(NetworkRequest {
                    name,
                    datacenter,
                    host,
                })
                .await;
            *usage.entry(network.name.clone()).or_insert(0) += 1;
            if seen.insert(network.name.clone()) {
                networks.push(network);
            }
        }
    }
    (networks, usage)
}

/// Distinct switches of `networks`, in first-reference order
async fn switches_of(ctx: &GenerationContext, networks: &[Network], kind: SwitchKind) -> Vec<Switch> {
    let mut seen = HashSet::new();
    let mut switches = Vec::new();
    for network in networks.iter().filter(|n| n.kind == kind) {
        if !seen.insert(network.switch.clone()) {
            continue;
        }
        if let Some(switch) = ctx.inventory.lazy().find_switch(&network.switch).await {
            switches.push(switch);
        }
    }
    switches
}

/// Cluster name of a host given by name; empty for the no-host sentinel
fn cluster_of_host(ctx: &GenerationContext, host: &str) -> String {
    let inv = &ctx.inventory;
    inv.hosts()
        .iter()
        .find(|h| h.name == host)
        .map(|h| inv.cluster(h.cluster).name.clone())
        .unwrap_or_default()
}

pub(super) async fn network_rows(ctx: &GenerationContext, rng: &mut StdRng) -> Vec<Vec<String>> {
    let inv = &ctx.inventory;
    let mut rows = Vec::new();

    for vm in inv.vms() {
        let [host, cluster, datacenter] = ctx.vm_placement(vm);
        let running = vm.power_state.is_on();

        for (index, name) in vm.networks.iter().enumerate() {
            let network = inv
                .lazy()
                .ensure_network(NetworkRequest {
                    name,
                    datacenter: &datacenter,
                    host: &host,
                })
                .await;

            let sctx = SynthContext::new()
                .with("vm", vm.name.as_str())
                .with("index", index)
                .with("network", name.as_str())
                .with("powered_on", running);
            let fields = ctx.synth.synthesize(EntityKind::Nic, &sctx, rng).await;

            // a NIC of a VM that is not running is never connected
            let connected = running && fields.bool("connected").unwrap_or(true);
            let ip = if index == 0 && running {
                vm.ip_address.clone()
            } else {
                String::new()
            };

            rows.push(ctx.row(vec![
                vm.name.clone(),
                vm.power_state.to_string(),
                format!("Network adapter {}", index + 1),
                fields.text_or("adapter_type", "vmxnet3"),
                network.name.clone(),
                network.switch.clone(),
                yes_no(connected),
                yes_no(true),
                fields.text_or("mac_address", ""),
                "assigned".to_string(),
                ip,
                host.clone(),
                cluster.clone(),
                datacenter.clone(),
                vm.uuid.to_string(),
            ]));
        }
    }
    rows
}

/// One standard switch per host in host order, then any other standard
/// switch a port group needed (the no-host sentinel's)
pub(super) async fn switch_rows(ctx: &GenerationContext) -> Vec<Vec<String>> {
    let (networks, usage) = referenced_networks(ctx).await;
    let inv = &ctx.inventory;

    let mut switches = Vec::new();
    for host in inv.hosts() {
        let datacenter = &inv.datacenter(host.datacenter).name;
        switches.push(inv.lazy().ensure_host_switch(&host.name, datacenter).await);
    }
    let owned: HashSet<String> = switches.iter().map(|s| s.name.clone()).collect();
    switches.extend(
        switches_of(ctx, &networks, SwitchKind::Standard)
            .await
            .into_iter()
            .filter(|s| !owned.contains(&s.name)),
    );

    switches
        .iter()
        .map(|switch| {
            let host = match &switch.scope {
                SwitchScope::Host(h) => h.clone(),
                SwitchScope::Datacenter(_) => String::new(),
            };
            let used: u32 = networks
                .iter()
                .filter(|n| n.switch == switch.name)
                .map(|n| usage.get(&n.name).copied().unwrap_or(0))
                .sum();
            ctx.row(vec![
                host.clone(),
                switch.datacenter.clone(),
                cluster_of_host(ctx, &host),
                switch.name.clone(),
                cell(switch.ports),
                cell(switch.ports.saturating_sub(used)),
                cell(switch.mtu.value()),
            ])
        })
        .collect()
}

pub(super) async fn port_rows(ctx: &GenerationContext) -> Vec<Vec<String>> {
    let (networks, _) = referenced_networks(ctx).await;
    networks
        .iter()
        .filter(|n| n.kind == SwitchKind::Standard)
        .map(|n| {
            let host = n.host.clone().unwrap_or_default();
            ctx.row(vec![
                host.clone(),
                n.datacenter.clone(),
                cluster_of_host(ctx, &host),
                n.name.clone(),
                n.switch.clone(),
                cell(n.vlan.value()),
            ])
        })
        .collect()
}

pub(super) async fn dv_switch_rows(ctx: &GenerationContext) -> Vec<Vec<String>> {
    let (networks, _) = referenced_networks(ctx).await;
    let switches = switches_of(ctx, &networks, SwitchKind::Distributed).await;
    let inv = &ctx.inventory;

    switches
        .iter()
        .map(|switch| {
            let members = inv
                .find_datacenter(&switch.datacenter)
                .map(|dc| inv.datacenter(dc).hosts.len())
                .unwrap_or(0);
            ctx.row(vec![
                switch.name.clone(),
                switch.datacenter.clone(),
                "VMware, Inc.".to_string(),
                "8.0.0".to_string(),
                cell(members),
                cell(switch.ports),
                cell(switch.mtu.value()),
            ])
        })
        .collect()
}

pub(super) async fn dv_port_rows(ctx: &GenerationContext) -> Vec<Vec<String>> {
    let (networks, usage) = referenced_networks(ctx).await;
    networks
        .iter()
        .filter(|n| n.kind == SwitchKind::Distributed)
        .map(|n| {
            // elastic port groups start at 8 ports and grow with use
            let ports = usage.get(&n.name).copied().unwrap_or(0).max(8);
            ctx.row(vec![
                n.name.clone(),
                n.switch.clone(),
                "earlyBinding".to_string(),
                cell(ports),
                cell(n.vlan.value()),
                n.datacenter.clone(),
            ])
        })
        .collect()
}
