// Copyright (c) 2025 - Cowboy AI, Inc.
//! Per-VM reports: vInfo, vCPU, vMemory, vSnapshot, vTools

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::Rng;

use super::{cell, yes_no, GenerationContext};
use crate::domain::{EntityKind, VirtualMachine};
use crate::synth::SynthContext;

pub(super) const INFO_HEADERS: &[&str] = &[
    "VM",
    "Powerstate",
    "Template",
    "DNS Name",
    "CPUs",
    "Memory",
    "NICs",
    "Disks",
    "Provisioned MiB",
    "In Use MiB",
    "Primary IP Address",
    "Network #1",
    "Resource pool",
    "Folder",
    "Annotation",
    "OS according to the configuration file",
    "Host",
    "Cluster",
    "Datacenter",
    "Creation date",
    "VM UUID",
    "Tags",
];

pub(super) const CPU_HEADERS: &[&str] = &[
    "VM",
    "Powerstate",
    "CPUs",
    "Sockets",
    "Cores p/s",
    "Overall",
    "Reservation",
    "Limit",
    "Hot Add",
    "Host",
    "Cluster",
    "Datacenter",
    "VM UUID",
];

pub(super) const MEMORY_HEADERS: &[&str] = &[
    "VM",
    "Powerstate",
    "Size MiB",
    "Consumed",
    "Active",
    "Ballooned",
    "Reservation",
    "Limit",
    "Hot Add",
    "Host",
    "Cluster",
    "Datacenter",
    "VM UUID",
];

pub(super) const SNAPSHOT_HEADERS: &[&str] = &[
    "VM",
    "Powerstate",
    "Name",
    "Description",
    "Date / time",
    "Filename",
    "Size MiB (vmsn)",
    "Size MiB (total)",
    "Quiesced",
    "Host",
    "Cluster",
    "Datacenter",
    "VM UUID",
];

pub(super) const TOOLS_HEADERS: &[&str] = &[
    "VM",
    "Powerstate",
    "Tools",
    "Tools Version",
    "Required Version",
    "Upgradeable",
    "Upgrade Policy",
    "Host",
    "Cluster",
    "Datacenter",
    "VM UUID",
];

const TOOLS_CURRENT: u32 = 12_352;
const TOOLS_OUTDATED: u32 = 11_333;

fn date_cell(date: DateTime<Utc>) -> String {
    date.format("%Y/%m/%d %H:%M:%S").to_string()
}

pub(super) fn info_rows(ctx: &GenerationContext) -> Vec<Vec<String>> {
    let inv = &ctx.inventory;
    inv.vms()
        .iter()
        .map(|vm| {
            let [host, cluster, datacenter] = ctx.vm_placement(vm);
            ctx.row(vec![
                vm.name.clone(),
                vm.power_state.to_string(),
                yes_no(false),
                vm.dns_name.clone(),
                cell(vm.vcpu),
                cell(vm.memory_mib),
                cell(vm.nic_count),
                cell(vm.disk_count),
                cell(vm.provisioned_mib),
                cell(vm.in_use_mib),
                vm.ip_address.clone(),
                vm.networks.first().cloned().unwrap_or_default(),
                inv.resource_pool(vm.resource_pool).name.clone(),
                inv.folder(vm.folder).name.clone(),
                vm.annotation.clone(),
                vm.os.clone(),
                host,
                cluster,
                datacenter,
                date_cell(vm.created),
                vm.uuid.to_string(),
                vm.tags.join(","),
            ])
        })
        .collect()
}

fn host_cpu_mhz(ctx: &GenerationContext, vm: &VirtualMachine) -> u64 {
    vm.host
        .map(|h| u64::from(ctx.inventory.host(h).hardware.cpu_mhz))
        .unwrap_or(0)
}

pub(super) fn cpu_rows(ctx: &GenerationContext, rng: &mut StdRng) -> Vec<Vec<String>> {
    ctx.inventory
        .vms()
        .iter()
        .map(|vm| {
            let cores_per_socket = if vm.vcpu >= 4 && vm.vcpu % 2 == 0 { 2 } else { 1 };
            let sockets = vm.vcpu / cores_per_socket;
            let mhz = host_cpu_mhz(ctx, vm);
            let overall = if vm.power_state.is_on() {
                rng.gen_range(0..=u64::from(vm.vcpu) * mhz / 2)
            } else {
                0
            };
            let advanced = rng.gen_bool(ctx.params.advanced_feature_likelihood);
            let [host, cluster, datacenter] = ctx.vm_placement(vm);
            ctx.row(vec![
                vm.name.clone(),
                vm.power_state.to_string(),
                cell(vm.vcpu),
                cell(sockets),
                cell(cores_per_socket),
                cell(overall),
                cell(if advanced { mhz } else { 0 }),
                cell(-1),
                yes_no(advanced),
                host,
                cluster,
                datacenter,
                vm.uuid.to_string(),
            ])
        })
        .collect()
}

pub(super) fn memory_rows(ctx: &GenerationContext, rng: &mut StdRng) -> Vec<Vec<String>> {
    ctx.inventory
        .vms()
        .iter()
        .map(|vm| {
            let (consumed, active) = if vm.power_state.is_on() {
                let consumed = rng.gen_range(vm.memory_mib / 4..=vm.memory_mib);
                let active = (consumed as f64 * rng.gen_range(0.1..0.6)) as u64;
                (consumed, active)
            } else {
                (0, 0)
            };
            let advanced = rng.gen_bool(ctx.params.advanced_feature_likelihood);
            let [host, cluster, datacenter] = ctx.vm_placement(vm);
            ctx.row(vec![
                vm.name.clone(),
                vm.power_state.to_string(),
                cell(vm.memory_mib),
                cell(consumed),
                cell(active),
                cell(0),
                cell(if advanced { vm.memory_mib } else { 0 }),
                cell(-1),
                yes_no(advanced),
                host,
                cluster,
                datacenter,
                vm.uuid.to_string(),
            ])
        })
        .collect()
}

pub(super) async fn snapshot_rows(ctx: &GenerationContext, rng: &mut StdRng) -> Vec<Vec<String>> {
    let inv = &ctx.inventory;
    let anchor = inv.generated_at();
    let mut rows = Vec::new();

    for vm in inv.vms() {
        let count = if rng.gen_bool(ctx.params.snapshot_likelihood) {
            rng.gen_range(1..=3)
        } else {
            0
        };

        for index in 0..count {
            let sctx = SynthContext::new()
                .with("vm", vm.name.as_str())
                .with("index", index)
                .with("anchor", anchor.to_rfc3339());
            let fields = ctx.synth.synthesize(EntityKind::Snapshot, &sctx, rng).await;

            // a snapshot cannot predate its VM
            let created = fields
                .text("created")
                .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                .map(|d| d.with_timezone(&Utc))
                .unwrap_or(anchor)
                .max(vm.created);
            let size = fields.uint("size_mib").unwrap_or(0);
            let with_memory = vm.power_state.is_on() && rng.gen_bool(0.5);
            let total = if with_memory { size + vm.memory_mib } else { size };

            let [host, cluster, datacenter] = ctx.vm_placement(vm);
            rows.push(ctx.row(vec![
                vm.name.clone(),
                vm.power_state.to_string(),
                fields.text_or("name", "Snapshot"),
                fields.text_or("description", ""),
                date_cell(created),
                format!("{}-Snapshot{}.vmsn", vm.name, index + 1),
                cell(size),
                cell(total),
                yes_no(rng.gen_bool(0.3)),
                host,
                cluster,
                datacenter,
                vm.uuid.to_string(),
            ]));
        }
    }
    rows
}

pub(super) fn tools_rows(ctx: &GenerationContext, rng: &mut StdRng) -> Vec<Vec<String>> {
    ctx.inventory
        .vms()
        .iter()
        .map(|vm| {
            let outdated = rng.gen_bool(0.15);
            let (status, version) = match (vm.power_state.is_on(), outdated) {
                (true, true) => ("toolsOld", TOOLS_OUTDATED),
                (true, false) => ("toolsOk", TOOLS_CURRENT),
                (false, _) => ("toolsNotRunning", if outdated { TOOLS_OUTDATED } else { TOOLS_CURRENT }),
            };
            let policy = if rng.gen_bool(0.2) { "upgradeAtPowerCycle" } else { "manual" };
            let [host, cluster, datacenter] = ctx.vm_placement(vm);
            ctx.row(vec![
                vm.name.clone(),
                vm.power_state.to_string(),
                status.to_string(),
                cell(version),
                cell(TOOLS_CURRENT),
                yes_no(version < TOOLS_CURRENT),
                policy.to_string(),
                host,
                cluster,
                datacenter,
                vm.uuid.to_string(),
            ])
        })
        .collect()
}
