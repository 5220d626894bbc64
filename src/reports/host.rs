// Copyright (c) 2025 - Cowboy AI, Inc.
//! Host reports: vHost, vHBA, vNIC

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use super::{cell, GenerationContext};
use crate::domain::naming;
use crate::domain::{EntityKind, Host, MacAddress};
use crate::synth::SynthContext;

pub(super) const HOST_HEADERS: &[&str] = &[
    "Host",
    "Datacenter",
    "Cluster",
    "CPU Model",
    "Speed",
    "# CPU",
    "Cores per CPU",
    "# Cores",
    "Total CPU MHz",
    "# Memory",
    "# NICs",
    "# HBAs",
    "# VMs",
    "Vendor",
    "Model",
    "Serial number",
    "ESX Version",
    "UUID",
];

pub(super) const HBA_HEADERS: &[&str] = &[
    "Host",
    "Datacenter",
    "Cluster",
    "Device",
    "Type",
    "Status",
    "Bus",
    "Driver",
    "Model",
    "WWN",
];

pub(super) const NIC_HEADERS: &[&str] = &[
    "Host",
    "Datacenter",
    "Cluster",
    "Network Device",
    "Driver",
    "Speed",
    "Duplex",
    "MAC",
    "Switch",
];

fn placement(ctx: &GenerationContext, host: &Host) -> [String; 2] {
    let inv = &ctx.inventory;
    [
        inv.datacenter(host.datacenter).name.clone(),
        inv.cluster(host.cluster).name.clone(),
    ]
}

pub(super) fn host_rows(ctx: &GenerationContext) -> Vec<Vec<String>> {
    ctx.inventory
        .hosts()
        .iter()
        .map(|host| {
            let hw = &host.hardware;
            let [datacenter, cluster] = placement(ctx, host);
            ctx.row(vec![
                host.name.clone(),
                datacenter,
                cluster,
                hw.cpu_model.clone(),
                cell(hw.cpu_mhz),
                cell(hw.sockets),
                cell(hw.cores_per_socket),
                cell(hw.total_cores()),
                cell(hw.cpu_mhz_total),
                cell(hw.memory_mib),
                cell(hw.nic_count),
                cell(hw.hba_count),
                cell(host.vms.len()),
                hw.vendor.clone(),
                hw.model.clone(),
                hw.serial.clone(),
                hw.esxi_version.clone(),
                host.uuid.to_string(),
            ])
        })
        .collect()
}

pub(super) async fn hba_rows(ctx: &GenerationContext, rng: &mut StdRng) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for host in ctx.inventory.hosts() {
        let [datacenter, cluster] = placement(ctx, host);
        for index in 0..host.hardware.hba_count {
            let sctx = SynthContext::new()
                .with("host", host.name.as_str())
                .with("index", index)
                .with("vendor", host.hardware.vendor.as_str());
            let fields = ctx.synth.synthesize(EntityKind::Hba, &sctx, rng).await;

            let hba_type = fields.text_or("hba_type", "Block SCSI");
            let wwn = if hba_type == "Fibre Channel" {
                naming::wwn(rng)
            } else {
                String::new()
            };
            rows.push(ctx.row(vec![
                host.name.clone(),
                datacenter.clone(),
                cluster.clone(),
                format!("vmhba{}", index),
                hba_type,
                "online".to_string(),
                format!("{}", rng.gen_range(1..=8)),
                fields.text_or("driver", ""),
                fields.text_or("model", ""),
                wwn,
            ]));
        }
    }
    rows
}

/// Physical NICs, uplinked to the host's registered standard switch
pub(super) async fn nic_rows(ctx: &GenerationContext, rng: &mut StdRng) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for host in ctx.inventory.hosts() {
        let [datacenter, cluster] = placement(ctx, host);
        let (driver, speed) = *[("i40en", 10_000u32), ("ixgben", 10_000), ("bnxtnet", 25_000), ("nmlx5_core", 25_000)]
            .choose(rng)
            .unwrap_or(&("i40en", 10_000));
        let switch = ctx
            .inventory
            .lazy()
            .ensure_host_switch(&host.name, &datacenter)
            .await
            .name;

        for index in 0..host.hardware.nic_count {
            rows.push(ctx.row(vec![
                host.name.clone(),
                datacenter.clone(),
                cluster.clone(),
                format!("vmnic{}", index),
                driver.to_string(),
                cell(speed),
                "Full".to_string(),
                MacAddress::random_physical(rng).as_str(),
                switch.clone(),
            ]));
        }
    }
    rows
}
