// Copyright (c) 2025 - Cowboy AI, Inc.
//! vDisk: one row per VM and declared disk index
//!
//! The backing datastore is resolved per VM, in order:
//!
//! 1. the profile's explicit datastore hint, when it names a datastore of
//!    the VM's datacenter
//! 2. a shared datastore of the datacenter carrying one of the VM's tags
//! 3. the host's local datastore
//! 4. the first shared datastore of the datacenter
//! 5. the datacenter's fallback datastore, minted on first use

use rand::rngs::StdRng;
use rand::Rng;
use tracing::warn;

use super::{cell, yes_no, GenerationContext};
use crate::domain::{Datastore, EntityKind, VirtualMachine};
use crate::errors::SynthError;
use crate::synth::SynthContext;

pub(super) const DISK_HEADERS: &[&str] = &[
    "VM",
    "Powerstate",
    "Disk",
    "Capacity MiB",
    "Thin",
    "Disk Mode",
    "Datastore",
    "Path",
    "Controller",
    "Unit #",
    "Host",
    "Cluster",
    "Datacenter",
    "VM UUID",
];

/// Disks per SCSI controller before the next one is used
const UNITS_PER_CONTROLLER: u32 = 15;

/// Name of the datastore backing a VM's disks
pub(super) async fn resolve_datastore(ctx: &GenerationContext, vm: &VirtualMachine) -> String {
    let inv = &ctx.inventory;
    let datacenter = inv.datacenter(vm.datacenter);
    let in_dc: Vec<&Datastore> = datacenter.datastores.iter().map(|id| inv.datastore(*id)).collect();

    if let Some(hint) = &vm.datastore_hint {
        if let Some(ds) = in_dc.iter().find(|ds| &ds.name == hint) {
            return ds.name.clone();
        }
        warn!(
            vm = %vm.name,
            "{}",
            SynthError::ConfigurationGap(format!(
                "datastore '{}' is not in datacenter '{}'",
                hint, datacenter.name
            ))
        );
    }

    if let Some(ds) = in_dc.iter().find(|ds| !ds.local && ds.tags.iter().any(|t| vm.tags.contains(t))) {
        return ds.name.clone();
    }

    if let Some(host) = vm.host {
        if let Some(local) = inv.host(host).local_datastores.first() {
            return inv.datastore(*local).name.clone();
        }
    }

    if let Some(ds) = in_dc.iter().find(|ds| !ds.local) {
        return ds.name.clone();
    }

    warn!(
        vm = %vm.name,
        "{}",
        SynthError::ResourceGapFallback(format!("no datastore for disks of {}", vm.name))
    );
    inv.lazy()
        .ensure_fallback_datastore(vm.datacenter, &datacenter.name)
        .await
        .name
}

pub(super) async fn disk_rows(ctx: &GenerationContext, rng: &mut StdRng) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    for vm in ctx.inventory.vms() {
        if vm.disk_count == 0 {
            continue;
        }
        let datastore = resolve_datastore(ctx, vm).await;
        // provisioned space minus the swap file, spread over the disks
        let per_disk = vm.provisioned_mib.saturating_sub(vm.memory_mib) / u64::from(vm.disk_count);
        let [host, cluster, datacenter] = ctx.vm_placement(vm);

        for index in 0..vm.disk_count {
            let sctx = SynthContext::new()
                .with("vm", vm.name.as_str())
                .with("index", index)
                .with("datastore", datastore.as_str())
                .with_opt("capacity_mib", (per_disk > 0).then_some(per_disk));
            let fields = ctx.synth.synthesize(EntityKind::Disk, &sctx, rng).await;

            let path = if index == 0 {
                format!("[{}] {}/{}.vmdk", datastore, vm.name, vm.name)
            } else {
                format!("[{}] {}/{}_{}.vmdk", datastore, vm.name, vm.name, index)
            };
            let mode = fields.text("disk_mode").unwrap_or_else(|| {
                String::from(if rng.gen_bool(0.05) { "independent_persistent" } else { "persistent" })
            });

            rows.push(ctx.row(vec![
                vm.name.clone(),
                vm.power_state.to_string(),
                format!("Hard disk {}", index + 1),
                cell(fields.uint("capacity_mib").unwrap_or(per_disk)),
                yes_no(fields.bool("thin").unwrap_or(true)),
                mode,
                datastore.clone(),
                path,
                format!("SCSI controller {}", index / UNITS_PER_CONTROLLER),
                cell(index % UNITS_PER_CONTROLLER),
                host.clone(),
                cluster.clone(),
                datacenter.clone(),
                vm.uuid.to_string(),
            ]));
        }
    }
    rows
}
