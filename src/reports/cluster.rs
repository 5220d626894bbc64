// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory-level reports: vCluster, vDatastore, vRP, vSource

use rand::rngs::StdRng;
use rand::Rng;

use super::{cell, yes_no, GenerationContext};
use crate::domain::Datastore;

pub(super) const CLUSTER_HEADERS: &[&str] = &[
    "Name",
    "Datacenter",
    "OverallStatus",
    "NumHosts",
    "NumEffectiveHosts",
    "TotalCpu",
    "NumCpuCores",
    "TotalMemory",
    "NumVMs",
    "HA enabled",
    "DRS enabled",
    "DRS default VM behavior",
    "Placeholder",
];

pub(super) const DATASTORE_HEADERS: &[&str] = &[
    "Name",
    "Datacenter",
    "Type",
    "Accessible",
    "Capacity MiB",
    "Free MiB",
    "Free %",
    "# Hosts",
    "Hosts",
    "Shared",
    "Placeholder",
    "Tags",
];

pub(super) const RESOURCE_POOL_HEADERS: &[&str] = &[
    "Resource Pool name",
    "Resource Pool path",
    "Parent",
    "Cluster",
    "Datacenter",
    "# VMs",
    "CPU limit",
    "Mem limit",
];

pub(super) const SOURCE_HEADERS: &[&str] = &[
    "Name",
    "API type",
    "API version",
    "Version",
    "Build",
    "Fullname",
    "Product name",
    "Vendor",
    "Generated at",
];

pub(super) fn cluster_rows(ctx: &GenerationContext) -> Vec<Vec<String>> {
    let inv = &ctx.inventory;
    inv.clusters()
        .iter()
        .map(|cluster| {
            let hosts: Vec<_> = cluster.hosts.iter().map(|h| &inv.host(*h).hardware).collect();
            let total_cpu: u64 = hosts.iter().map(|hw| hw.cpu_mhz_total).sum();
            let cores: u64 = hosts.iter().map(|hw| u64::from(hw.total_cores())).sum();
            let memory_bytes: u64 = hosts.iter().map(|hw| hw.memory_mib.saturating_mul(1024 * 1024)).sum();
            let status = if cluster.placeholder || hosts.is_empty() { "yellow" } else { "green" };
            ctx.row(vec![
                cluster.name.clone(),
                inv.datacenter(cluster.datacenter).name.clone(),
                status.to_string(),
                cell(hosts.len()),
                cell(hosts.len()),
                cell(total_cpu),
                cell(cores),
                cell(memory_bytes),
                cell(cluster.vms.len()),
                yes_no(cluster.ha_enabled),
                yes_no(cluster.drs_enabled),
                cluster.drs_behavior.clone(),
                yes_no(cluster.placeholder),
            ])
        })
        .collect()
}

/// Topology datastores first, then the ones minted during report generation
pub(super) async fn datastore_rows(ctx: &GenerationContext, rng: &mut StdRng) -> Vec<Vec<String>> {
    let inv = &ctx.inventory;
    let minted = inv.lazy().datastores().await;

    inv.datastores()
        .iter()
        .chain(minted.iter())
        .map(|ds| datastore_row(ctx, ds, rng))
        .collect()
}

fn datastore_row(ctx: &GenerationContext, ds: &Datastore, rng: &mut StdRng) -> Vec<String> {
    let inv = &ctx.inventory;
    let free = if ds.placeholder {
        ds.capacity_mib
    } else {
        (ds.capacity_mib as f64 * rng.gen_range(0.15..0.85)) as u64
    };
    let free_pct = if ds.capacity_mib == 0 {
        0
    } else {
        free * 100 / ds.capacity_mib
    };
    let hosts: Vec<&str> = ds
        .connected_hosts
        .iter()
        .map(|h| inv.host(*h).name.as_str())
        .collect();
    ctx.row(vec![
        ds.name.clone(),
        inv.datacenter(ds.datacenter).name.clone(),
        ds.ds_type.clone(),
        yes_no(ds.accessible),
        cell(ds.capacity_mib),
        cell(free),
        cell(free_pct),
        cell(hosts.len()),
        hosts.join(", "),
        yes_no(!ds.local),
        yes_no(ds.placeholder),
        ds.tags.join(","),
    ])
}

pub(super) fn resource_pool_rows(ctx: &GenerationContext) -> Vec<Vec<String>> {
    let inv = &ctx.inventory;
    inv.resource_pools()
        .iter()
        .map(|pool| {
            let cluster = inv.cluster(pool.cluster);
            let short = pool.name.rsplit('/').next().unwrap_or(&pool.name).to_string();
            ctx.row(vec![
                short,
                format!("/{}/{}", cluster.name, pool.name),
                pool.parent
                    .map(|p| inv.resource_pool(p).name.clone())
                    .unwrap_or_default(),
                cluster.name.clone(),
                inv.datacenter(cluster.datacenter).name.clone(),
                cell(pool.vms.len()),
                cell(-1),
                cell(-1),
            ])
        })
        .collect()
}

pub(super) fn source_rows(ctx: &GenerationContext) -> Vec<Vec<String>> {
    let inv = &ctx.inventory;
    let sdk = inv.sdk();
    vec![ctx.row(vec![
        sdk.name.clone(),
        "VirtualCenter".to_string(),
        sdk.api_version.clone(),
        sdk.version.clone(),
        sdk.build.clone(),
        format!("VMware vCenter Server {} build-{}", sdk.version, sdk.build),
        "VMware VirtualCenter Server".to_string(),
        "VMware, Inc.".to_string(),
        inv.generated_at().to_rfc3339(),
    ])]
}
