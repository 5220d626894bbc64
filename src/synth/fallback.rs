// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deterministic Fallback Generators
//!
//! One pure function per entity kind. Each reads only the supplied context
//! and the caller's RNG, and always returns a map that satisfies the kind's
//! contract and business rules. For a fixed seed and context the output is
//! fixed, which is what reproducible runs rely on.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use super::fields::FieldMap;
use super::SynthContext;
use crate::domain::naming;
use crate::domain::{EntityKind, HostHardware, MacAddress, PowerState};

const OS_POOL: &[&str] = &[
    "Microsoft Windows Server 2022 (64-bit)",
    "Microsoft Windows Server 2019 (64-bit)",
    "Red Hat Enterprise Linux 9 (64-bit)",
    "Red Hat Enterprise Linux 8 (64-bit)",
    "Ubuntu Linux (64-bit)",
    "Rocky Linux (64-bit)",
    "SUSE Linux Enterprise 15 (64-bit)",
    "Debian GNU/Linux 12 (64-bit)",
];

const ANNOTATIONS: &[&str] = &[
    "",
    "",
    "Owner: platform team",
    "Managed by config management",
    "Do not power off without change ticket",
    "Migrated from legacy cluster",
];

const VM_PREFIXES: &[&str] = &["app", "web", "db", "svc", "util", "batch"];

/// (vendor, model, cpu model)
const HOST_MODELS: &[(&str, &str, &str)] = &[
    ("Dell Inc.", "PowerEdge R650", "Intel(R) Xeon(R) Gold 6338 CPU @ 2.00GHz"),
    ("Dell Inc.", "PowerEdge R750", "Intel(R) Xeon(R) Gold 6348 CPU @ 2.60GHz"),
    ("HPE", "ProLiant DL380 Gen10 Plus", "Intel(R) Xeon(R) Gold 6330 CPU @ 2.00GHz"),
    ("HPE", "ProLiant DL385 Gen10 Plus v2", "AMD EPYC 7543 32-Core Processor"),
    ("Lenovo", "ThinkSystem SR650 V2", "Intel(R) Xeon(R) Silver 4314 CPU @ 2.40GHz"),
    ("Cisco Systems Inc", "UCSC-C240-M6SX", "Intel(R) Xeon(R) Gold 6326 CPU @ 2.90GHz"),
];

const ESXI_VERSIONS: &[&str] = &[
    "VMware ESXi 7.0.3 build-21930508",
    "VMware ESXi 8.0.1 build-21495797",
    "VMware ESXi 8.0.2 build-22380479",
    "VMware ESXi 8.0.3 build-24022510",
];

const DRS_BEHAVIORS: &[&str] = &["fullyAutomated", "partiallyAutomated", "manual"];

const SNAPSHOT_NAMES: &[&str] = &[
    "Before patching",
    "Pre-upgrade",
    "Baseline",
    "Before app deploy",
    "Backup snapshot",
];

/// Produce a contract-satisfying field map for `kind`
pub fn generate<R: Rng + ?Sized>(kind: EntityKind, ctx: &SynthContext, rng: &mut R) -> FieldMap {
    match kind {
        EntityKind::Vm => vm(ctx, rng),
        EntityKind::Host => host(ctx, rng),
        EntityKind::Cluster => cluster(ctx, rng),
        EntityKind::Datastore => datastore(ctx, rng),
        EntityKind::Disk => disk(ctx, rng),
        EntityKind::Nic => nic(ctx, rng),
        EntityKind::Snapshot => snapshot(ctx, rng),
        EntityKind::Hba => hba(ctx, rng),
    }
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, pool: &[&'a str]) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}

/// Profile OS hint list first, global pool otherwise
fn pick_os<R: Rng + ?Sized>(ctx: &SynthContext, rng: &mut R) -> String {
    let hints = ctx.str_list("os_hints");
    match hints.choose(rng) {
        Some(os) => os.clone(),
        None => pick(rng, OS_POOL).to_string(),
    }
}

fn vm<R: Rng + ?Sized>(ctx: &SynthContext, rng: &mut R) -> FieldMap {
    let name = ctx.str("name").unwrap_or_else(|| {
        let prefix = ctx
            .str("name_prefix")
            .unwrap_or_else(|| pick(rng, VM_PREFIXES).to_string());
        naming::vm_name(&prefix, rng.gen_range(1..1000))
    });

    let power_on_ratio = ctx.f64("power_on_ratio").unwrap_or(0.85).clamp(0.0, 1.0);
    let power_state = if rng.gen_bool(power_on_ratio) {
        PowerState::PoweredOn
    } else if rng.gen_bool(0.1) {
        PowerState::Suspended
    } else {
        PowerState::PoweredOff
    };

    let disk_count = ctx.u64("disk_count").unwrap_or(1).max(1);
    let per_disk_mib = match ctx.u64("disk_gb") {
        Some(gb) => gb.max(1).saturating_mul(1024),
        None => *[20u64, 40, 60, 80, 100, 200].choose(rng).unwrap_or(&40) * 1024,
    };
    let memory_mib = ctx.u64("memory_mib").unwrap_or(4096);
    // swap file sits next to the disks
    let provisioned = disk_count * per_disk_mib + memory_mib;

    let in_use = if power_state.reports_guest_info() {
        let fraction = rng.gen_range(0.10..0.90);
        ((provisioned as f64 * fraction) as u64).min(provisioned - 1)
    } else {
        0
    };

    let (ip, dns) = if power_state.reports_guest_info() {
        let octet = ctx
            .str("datacenter")
            .map(|dc| naming::datacenter_octet(&dc))
            .unwrap_or(20);
        (
            naming::private_ipv4(rng, octet).to_string(),
            naming::vm_dns_name(&name),
        )
    } else {
        (String::new(), String::new())
    };

    let os = pick_os(ctx, rng);
    let annotation = pick(rng, ANNOTATIONS);

    FieldMap::new()
        .with("name", name)
        .with("power_state", power_state.as_str())
        .with("os", os)
        .with("provisioned_mib", provisioned)
        .with("in_use_mib", in_use)
        .with("ip_address", ip)
        .with("dns_name", dns)
        .with("annotation", annotation)
}

fn host<R: Rng + ?Sized>(ctx: &SynthContext, rng: &mut R) -> FieldMap {
    let (vendor, model, cpu_model) = *HOST_MODELS.choose(rng).unwrap_or(&HOST_MODELS[0]);
    let sockets = ctx
        .u64("sockets")
        .unwrap_or_else(|| *[1u64, 2, 2, 2, 4].choose(rng).unwrap_or(&2))
        .clamp(1, u64::from(HostHardware::MAX_SOCKETS));
    let cores = ctx
        .u64("cores_per_socket")
        .unwrap_or_else(|| *[8u64, 12, 16, 20, 24, 28, 32].choose(rng).unwrap_or(&16))
        .clamp(1, u64::from(HostHardware::MAX_CORES_PER_SOCKET));
    let mhz = ctx
        .u64("cpu_mhz")
        .unwrap_or_else(|| *[2000u64, 2100, 2400, 2600, 2800, 3000].choose(rng).unwrap_or(&2400))
        .clamp(1, u64::from(HostHardware::MAX_CPU_MHZ));
    let memory_mib = match ctx.u64("memory_gb") {
        Some(gb) => gb.max(1).saturating_mul(1024).min(HostHardware::MAX_MEMORY_MIB),
        None => *[256u64, 384, 512, 768, 1024].choose(rng).unwrap_or(&512) * 1024,
    };
    let esxi = ctx
        .str("esxi_version")
        .unwrap_or_else(|| pick(rng, ESXI_VERSIONS).to_string());

    FieldMap::new()
        .with("name", ctx.str("name").unwrap_or_else(|| naming::host_name("dc", 1)))
        .with("cluster", ctx.str("cluster").unwrap_or_default())
        .with("datacenter", ctx.str("datacenter").unwrap_or_default())
        .with("sockets", sockets)
        .with("cores_per_socket", cores)
        .with("cpu_mhz", mhz)
        .with("cpu_mhz_total", HostHardware::cpu_total(sockets, cores, mhz))
        .with("memory_mib", memory_mib)
        .with("esxi_version", esxi)
        .with("vendor", ctx.str("vendor").unwrap_or_else(|| vendor.to_string()))
        .with("model", ctx.str("model").unwrap_or_else(|| model.to_string()))
        .with("cpu_model", ctx.str("cpu_model").unwrap_or_else(|| cpu_model.to_string()))
}

fn cluster<R: Rng + ?Sized>(ctx: &SynthContext, rng: &mut R) -> FieldMap {
    let ha = ctx.bool("ha_enabled").unwrap_or_else(|| rng.gen_bool(0.9));
    let drs = ctx.bool("drs_enabled").unwrap_or_else(|| rng.gen_bool(0.8));
    FieldMap::new()
        .with("name", ctx.str("name").unwrap_or_else(|| "Cluster".to_string()))
        .with("ha_enabled", ha)
        .with("drs_enabled", drs)
        .with("drs_behavior", pick(rng, DRS_BEHAVIORS))
}

fn datastore<R: Rng + ?Sized>(ctx: &SynthContext, rng: &mut R) -> FieldMap {
    let local = ctx.bool("local").unwrap_or(false);
    let ds_type = ctx.str("type").unwrap_or_else(|| {
        if local {
            "VMFS".to_string()
        } else {
            pick(rng, &["VMFS", "VMFS", "NFS", "vsan"]).to_string()
        }
    });
    let capacity_mib = match ctx.u64("capacity_gb") {
        Some(gb) => gb.max(1).saturating_mul(1024),
        None if local => *[480u64, 960, 1920].choose(rng).unwrap_or(&960) * 1024,
        None => *[2048u64, 4096, 8192, 16384].choose(rng).unwrap_or(&4096) * 1024,
    };
    FieldMap::new()
        .with("name", ctx.str("name").unwrap_or_else(|| "datastore1".to_string()))
        .with("type", ds_type)
        .with("capacity_mib", capacity_mib)
        .with("accessible", true)
}

fn disk<R: Rng + ?Sized>(ctx: &SynthContext, rng: &mut R) -> FieldMap {
    let index = ctx.u64("index").unwrap_or(0);
    let capacity_mib = ctx
        .u64("capacity_mib")
        .filter(|c| *c > 0)
        .unwrap_or_else(|| *[20u64, 40, 60, 100, 200, 500].choose(rng).unwrap_or(&40) * 1024);
    let thin = ctx.bool("thin").unwrap_or_else(|| rng.gen_bool(0.6));
    FieldMap::new()
        .with("label", format!("Hard disk {}", index + 1))
        .with("capacity_mib", capacity_mib)
        .with("thin", thin)
        .with("disk_mode", "persistent")
}

fn nic<R: Rng + ?Sized>(ctx: &SynthContext, rng: &mut R) -> FieldMap {
    let index = ctx.u64("index").unwrap_or(0);
    let adapter = pick(rng, &["vmxnet3", "vmxnet3", "vmxnet3", "e1000e", "e1000"]);
    let running = ctx.bool("powered_on").unwrap_or(true);
    let connected = running && rng.gen_bool(0.97);
    FieldMap::new()
        .with("label", format!("Network adapter {}", index + 1))
        .with("adapter_type", adapter)
        .with("mac_address", MacAddress::random_vm(rng).as_str())
        .with("connected", connected)
}

fn snapshot<R: Rng + ?Sized>(ctx: &SynthContext, rng: &mut R) -> FieldMap {
    let anchor = ctx
        .str("anchor")
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|| DateTime::<Utc>::UNIX_EPOCH);
    let created = naming::date_before(rng, anchor, 90);
    let name = pick(rng, SNAPSHOT_NAMES);
    FieldMap::new()
        .with("name", name)
        .with("description", format!("{} ({})", name, created.format("%Y-%m-%d")))
        .with("size_mib", rng.gen_range(256u64..=20_480))
        .with("created", created.to_rfc3339())
}

fn hba<R: Rng + ?Sized>(ctx: &SynthContext, rng: &mut R) -> FieldMap {
    let index = ctx.u64("index").unwrap_or(0);
    let (hba_type, model, driver) = *[
        ("Fibre Channel", "QLogic QLE2772 Dual Port 32Gb FC", "qlnativefc"),
        ("Fibre Channel", "Emulex LPe35002 32Gb FC", "lpfc"),
        ("iSCSI", "iSCSI Software Adapter", "iscsi_vmk"),
        ("Block SCSI", "Dell HBA355i Front", "lsi_msgpt35"),
    ]
    .choose(rng)
    .unwrap_or(&("Block SCSI", "Generic SAS HBA", "nvme_pcie"));
    FieldMap::new()
        .with("device", format!("vmhba{}", index))
        .with("hba_type", hba_type)
        .with("model", model)
        .with("driver", driver)
}
