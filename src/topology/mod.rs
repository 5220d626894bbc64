// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topology Builder
//!
//! Expands a scenario (or randomized parameters) into the inventory graph.
//! Both modes share the entity constructors below, so the invariants that
//! matter downstream are established in one place:
//!
//! - a VM's cluster and datacenter come from its host
//! - every host gets exactly one local datastore and joins every shared
//!   datastore of its datacenter
//! - UUIDs are drawn from the run RNG once, at creation
//! - a VM's NIC count equals the length of its network list
//!
//! Content fields (HA flags, hardware, OS, sizes) come from the
//! [`FieldSynthesizer`]; identity and placement fields are always set here.
//! For any content field the synthesizer leaves out, the profile hint is
//! used, then the tier default.
//!
//! The builder never fails. Missing profiles and clusters are logged as
//! configuration gaps and replaced by defaults or a placeholder cluster;
//! a cluster without hosts yields VMs carrying the "no host" sentinel.

mod from_scenario;
mod randomized;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::config::TierParams;
use crate::domain::naming;
use crate::domain::{
    ClusterId, DatacenterId, DatastoreId, EntityKind, HostHardware, HostId, PowerState, SdkServer,
    VirtualMachine, VmId,
};
use crate::errors::SynthError;
use crate::inventory::{Inventory, NewCluster, NewDatastore};
use crate::scenario::{ClusterProfile, HostHardwareProfile, Scenario, SharedDatastoreSpec, VmProfile};
use crate::synth::{FieldSynthesizer, SynthContext};

/// Default folder for VMs whose profile names none
pub const DEFAULT_FOLDER: &str = "Discovered virtual machine";

/// Port groups handed out when a VM profile lists no networks
pub const DEFAULT_NETWORKS: &[&str] = &[
    "VM Network",
    "dvPG-Prod-100",
    "dvPG-App-110",
    "dvPG-DB-120",
    "dv-backup-300",
];

/// What to expand
#[derive(Debug, Clone, Copy)]
pub enum BuildMode<'a> {
    /// Walk a declarative scenario
    Scenario(&'a Scenario),
    /// Minimal randomized topology sized for `vm_count` VMs
    Randomized { vm_count: u32 },
}

/// Where a new VM goes; `host` is `None` when placement failed
#[derive(Debug, Clone, Copy)]
struct Placement {
    host: Option<HostId>,
    cluster: ClusterId,
    datacenter: DatacenterId,
}

/// One-shot builder for a run's topology
pub struct TopologyBuilder<'a> {
    synth: &'a FieldSynthesizer,
    params: TierParams,
    rng: StdRng,
    /// Run-wide counter per VM name prefix
    vm_counters: HashMap<String, usize>,
    /// Guest addresses handed out so far
    guest_ips: HashSet<String>,
}

/// Redraws before a duplicate guest address is accepted (a full /16)
const MAX_IP_DRAWS: usize = 64;

/// The management server identity for a run
pub fn sdk_server<R: Rng + ?Sized>(rng: &mut R) -> SdkServer {
    SdkServer {
        name: format!("vcsa-01.{}", naming::DOMAIN_SUFFIX),
        uuid: naming::uuid_from_rng(rng),
        version: "8.0.2".to_string(),
        build: "22617221".to_string(),
        api_version: "8.0.2.0".to_string(),
    }
}

impl<'a> TopologyBuilder<'a> {
    pub fn new(synth: &'a FieldSynthesizer, params: TierParams, seed: u64) -> Self {
        Self {
            synth,
            params: params.normalized(),
            rng: StdRng::seed_from_u64(seed),
            vm_counters: HashMap::new(),
            guest_ips: HashSet::new(),
        }
    }

    /// Populate `inventory` according to `mode`
    pub async fn build(mut self, inventory: &mut Inventory, mode: BuildMode<'_>) {
        match mode {
            BuildMode::Scenario(scenario) => {
                info!(datacenters = scenario.datacenters.len(), "expanding scenario");
                self.expand_scenario(inventory, scenario).await;
            }
            BuildMode::Randomized { vm_count } => {
                info!(vm_count, "expanding randomized topology");
                self.expand_randomized(inventory, vm_count).await;
            }
        }
        inventory.log_summary();
    }

    fn gap(message: String) {
        warn!("{}", SynthError::ConfigurationGap(message));
    }

    async fn create_cluster(
        &mut self,
        inventory: &mut Inventory,
        datacenter: DatacenterId,
        name: String,
        profile: Option<&str>,
        hints: Option<&ClusterProfile>,
        placeholder: bool,
    ) -> ClusterId {
        let ctx = SynthContext::new()
            .with("name", name.as_str())
            .with("datacenter", inventory.datacenter(datacenter).name.as_str())
            .with_opt("ha_enabled", hints.and_then(|h| h.ha_enabled))
            .with_opt("drs_enabled", hints.and_then(|h| h.drs_enabled));
        let fields = self.synth.synthesize(EntityKind::Cluster, &ctx, &mut self.rng).await;

        inventory.add_cluster(
            datacenter,
            NewCluster {
                name,
                profile: profile.map(str::to_string),
                ha_enabled: fields.bool("ha_enabled").unwrap_or(true),
                drs_enabled: fields.bool("drs_enabled").unwrap_or(true),
                drs_behavior: fields.text_or("drs_behavior", "fullyAutomated"),
                placeholder,
            },
        )
    }

    /// Placeholder cluster for deployment entries whose target is missing
    async fn placeholder_cluster(&mut self, inventory: &mut Inventory, datacenter: DatacenterId) -> ClusterId {
        let name = format!("{}-unassigned", inventory.datacenter(datacenter).name);
        if let Some(existing) = inventory.find_cluster(datacenter, &name) {
            return existing;
        }
        warn!(
            "{}",
            SynthError::ResourceGapFallback(format!("placeholder cluster {} created", name))
        );
        self.create_cluster(inventory, datacenter, name, None, None, true)
            .await
    }

    async fn create_shared_datastore(
        &mut self,
        inventory: &mut Inventory,
        datacenter: DatacenterId,
        spec: &SharedDatastoreSpec,
    ) -> DatastoreId {
        let ctx = SynthContext::new()
            .with("name", spec.name.as_str())
            .with("local", false)
            .with_opt("type", spec.ds_type.clone())
            .with_opt("capacity_gb", spec.capacity_gb);
        let fields = self.synth.synthesize(EntityKind::Datastore, &ctx, &mut self.rng).await;

        inventory.add_shared_datastore(
            datacenter,
            NewDatastore {
                name: spec.name.clone(),
                ds_type: spec
                    .ds_type
                    .clone()
                    .unwrap_or_else(|| fields.text_or("type", "VMFS")),
                capacity_mib: capacity_mib(fields.uint("capacity_mib"), spec.capacity_gb),
                accessible: fields.bool("accessible").unwrap_or(true),
                tags: spec.tags.clone(),
            },
        )
    }

    /// Host with its local datastore, joined to the datacenter's shared datastores
    async fn create_host(
        &mut self,
        inventory: &mut Inventory,
        cluster: ClusterId,
        profile_name: Option<&str>,
        profile: Option<&HostHardwareProfile>,
    ) -> HostId {
        let datacenter = inventory.cluster(cluster).datacenter;
        let dc_name = inventory.datacenter(datacenter).name.clone();
        let name = naming::host_name(&dc_name, inventory.datacenter(datacenter).hosts.len() + 1);

        let hint = profile.cloned().unwrap_or_default();
        let ctx = SynthContext::new()
            .with("name", name.as_str())
            .with("cluster", inventory.cluster(cluster).name.as_str())
            .with("datacenter", dc_name.as_str())
            .with_opt("vendor", hint.vendor.clone())
            .with_opt("model", hint.model.clone())
            .with_opt("cpu_model", hint.cpu_model.clone())
            .with_opt("sockets", hint.sockets)
            .with_opt("cores_per_socket", hint.cores_per_socket)
            .with_opt("cpu_mhz", hint.cpu_mhz)
            .with_opt("memory_gb", hint.memory_gb)
            .with_opt("esxi_version", hint.esxi_version.clone());
        let fields = self.synth.synthesize(EntityKind::Host, &ctx, &mut self.rng).await;

        let sockets = pick_u32(fields.uint("sockets"), hint.sockets, 2).min(HostHardware::MAX_SOCKETS);
        let cores_per_socket = pick_u32(fields.uint("cores_per_socket"), hint.cores_per_socket, 16)
            .min(HostHardware::MAX_CORES_PER_SOCKET);
        let cpu_mhz = pick_u32(fields.uint("cpu_mhz"), hint.cpu_mhz, 2_400).min(HostHardware::MAX_CPU_MHZ);
        let hardware = HostHardware {
            vendor: fields.text("vendor").or(hint.vendor).unwrap_or_else(|| "Dell Inc.".to_string()),
            model: fields.text("model").or(hint.model).unwrap_or_else(|| "PowerEdge R650".to_string()),
            cpu_model: fields
                .text("cpu_model")
                .or(hint.cpu_model)
                .unwrap_or_else(|| "Intel(R) Xeon(R) Gold 6338 CPU @ 2.00GHz".to_string()),
            sockets,
            cores_per_socket,
            cpu_mhz,
            cpu_mhz_total: HostHardware::cpu_total(sockets.into(), cores_per_socket.into(), cpu_mhz.into()),
            memory_mib: fields
                .uint("memory_mib")
                .filter(|m| *m > 0)
                .or(hint.memory_gb.map(|gb| gb.saturating_mul(1024)))
                .unwrap_or(262_144)
                .min(HostHardware::MAX_MEMORY_MIB),
            esxi_version: fields
                .text("esxi_version")
                .or(hint.esxi_version)
                .unwrap_or_else(|| "VMware ESXi 8.0.2".to_string()),
            nic_count: hint.nic_count.unwrap_or(4).max(1),
            hba_count: hint.hba_count.unwrap_or(2),
            serial: naming::serial_number(&mut self.rng),
        };

        let uuid = naming::uuid_from_rng(&mut self.rng);
        let host = inventory.add_host(
            cluster,
            name.clone(),
            uuid,
            profile_name.map(str::to_string),
            hardware,
        );

        let local = hint.local_datastore.unwrap_or_default();
        let ds_name = naming::local_datastore_name(&name);
        let ctx = SynthContext::new()
            .with("name", ds_name.as_str())
            .with("local", true)
            .with_opt("type", local.ds_type.clone())
            .with_opt("capacity_gb", local.capacity_gb);
        let fields = self.synth.synthesize(EntityKind::Datastore, &ctx, &mut self.rng).await;
        inventory.add_local_datastore(
            host,
            NewDatastore {
                name: ds_name,
                ds_type: local.ds_type.unwrap_or_else(|| fields.text_or("type", "VMFS")),
                capacity_mib: capacity_mib(fields.uint("capacity_mib"), local.capacity_gb),
                accessible: fields.bool("accessible").unwrap_or(true),
                tags: vec!["local".to_string()],
            },
        );

        let shared: Vec<DatastoreId> = inventory
            .datacenter(datacenter)
            .datastores
            .iter()
            .copied()
            .filter(|ds| !inventory.datastore(*ds).local)
            .collect();
        for ds in shared {
            inventory.connect_shared_datastore(ds, host);
        }

        debug!(host = %name, "host created");
        host
    }

    fn next_vm_name(&mut self, prefix: &str) -> String {
        let counter = self.vm_counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        naming::vm_name(prefix, *counter)
    }

    fn draw_count(&mut self, hint: Option<u32>, min: u32, max: u32) -> u32 {
        hint.unwrap_or_else(|| self.rng.gen_range(min..=max))
    }

    /// VM on `placement`, content from the synthesizer, then the profile, then the tier
    async fn create_vm(
        &mut self,
        inventory: &mut Inventory,
        placement: Placement,
        profile_name: Option<&str>,
        profile: Option<&VmProfile>,
    ) -> VmId {
        let hint = profile.cloned().unwrap_or_default();
        let prefix = hint
            .name_prefix
            .clone()
            .or_else(|| profile_name.map(naming::slug))
            .unwrap_or_else(|| "vm".to_string());
        let name = self.next_vm_name(&prefix);

        let disk_count = self.draw_count(
            hint.disk_count,
            self.params.min_disks_per_vm,
            self.params.max_disks_per_vm,
        );
        let nic_count = self.draw_count(
            hint.nic_count,
            self.params.min_nics_per_vm,
            self.params.max_nics_per_vm,
        );

        let dc_name = inventory.datacenter(placement.datacenter).name.clone();
        let host_name = placement
            .host
            .map(|h| inventory.host(h).name.clone())
            .unwrap_or_else(|| crate::domain::NO_HOST.to_string());
        let ctx = SynthContext::new()
            .with("name", name.as_str())
            .with("name_prefix", prefix.as_str())
            .with("os_hints", hint.os_hints.clone())
            .with_opt("vcpu", hint.vcpu)
            .with_opt("memory_mib", hint.memory_mb)
            .with("disk_count", disk_count)
            .with_opt("disk_gb", hint.disk_gb)
            .with_opt("power_on_ratio", hint.power_on_ratio)
            .with("datacenter", dc_name.as_str())
            .with("cluster", inventory.cluster(placement.cluster).name.as_str())
            .with("host", host_name.as_str());
        let fields = self.synth.synthesize(EntityKind::Vm, &ctx, &mut self.rng).await;

        let power_state: PowerState = fields
            .text("power_state")
            .and_then(|s| s.parse().ok())
            .unwrap_or(PowerState::PoweredOff);
        let vcpu = fields
            .uint("vcpu")
            .and_then(|v| u32::try_from(v).ok())
            .filter(|v| *v > 0)
            .or(hint.vcpu)
            .unwrap_or(self.params.default_vcpu);
        let memory_mib = fields
            .uint("memory_mib")
            .filter(|m| *m > 0)
            .or(hint.memory_mb)
            .unwrap_or(self.params.default_memory_mb);

        let running = power_state.reports_guest_info();
        let provisioned_mib = fields.uint("provisioned_mib").unwrap_or(40_960).max(1);
        let in_use_mib = if running {
            fields
                .uint("in_use_mib")
                .unwrap_or(0)
                .min(provisioned_mib.saturating_sub(1))
        } else {
            0
        };
        let ip_address = if running {
            self.claim_guest_ip(fields.text("ip_address"), &dc_name)
        } else {
            String::new()
        };
        let dns_name = if running {
            naming::vm_dns_name(&name)
        } else {
            String::new()
        };

        let pool = if hint.networks.is_empty() {
            (0..nic_count)
                .map(|_| {
                    DEFAULT_NETWORKS
                        .choose(&mut self.rng)
                        .copied()
                        .unwrap_or("VM Network")
                        .to_string()
                })
                .collect::<Vec<_>>()
        } else {
            hint.networks.clone()
        };
        let networks: Vec<String> = (0..nic_count as usize)
            .filter_map(|i| pool.get(i % pool.len().max(1)).cloned())
            .collect();

        let folder = inventory.ensure_folder(
            placement.datacenter,
            hint.folder.as_deref().unwrap_or(DEFAULT_FOLDER),
        );
        let resource_pool = match (&hint.resource_pool, inventory.cluster(placement.cluster).root_pool()) {
            (Some(child), _) => inventory.ensure_child_pool(placement.cluster, child),
            (None, Some(root)) => root,
            (None, None) => inventory.ensure_child_pool(placement.cluster, "Resources"),
        };

        let uuid = naming::uuid_from_rng(&mut self.rng);
        let created = naming::date_before(&mut self.rng, inventory.generated_at(), 3 * 365);

        if placement.host.is_none() {
            warn!(vm = %name, "{}", SynthError::ResourceGapFallback("VM has no host".to_string()));
        }

        inventory.add_vm(VirtualMachine {
            id: VmId(0),
            name,
            uuid,
            power_state,
            host: placement.host,
            cluster: placement.cluster,
            datacenter: placement.datacenter,
            folder,
            resource_pool,
            vcpu,
            memory_mib,
            disk_count,
            nic_count: networks.len() as u32,
            networks,
            os: fields.text_or("os", "Other Linux (64-bit)"),
            provisioned_mib,
            in_use_mib,
            ip_address,
            dns_name,
            annotation: fields.text_or("annotation", ""),
            profile: profile_name.map(str::to_string),
            datastore_hint: hint.datastore,
            tags: hint.tags,
            created,
        })
    }

    /// `preferred` while no other VM holds it, else a fresh address in the datacenter's /16
    fn claim_guest_ip(&mut self, preferred: Option<String>, datacenter: &str) -> String {
        let octet = naming::datacenter_octet(datacenter);
        let mut ip = preferred
            .filter(|ip| !ip.is_empty())
            .unwrap_or_else(|| naming::private_ipv4(&mut self.rng, octet).to_string());
        for _ in 0..MAX_IP_DRAWS {
            if self.guest_ips.insert(ip.clone()) {
                return ip;
            }
            debug!(%ip, "guest address taken, drawing another");
            ip = naming::private_ipv4(&mut self.rng, octet).to_string();
        }
        ip
    }

    /// Host chosen uniformly among `hosts`
    fn pick_host(&mut self, hosts: &[HostId]) -> Option<HostId> {
        hosts.choose(&mut self.rng).copied()
    }
}

fn pick_u32(synthesized: Option<u64>, hint: Option<u32>, default: u32) -> u32 {
    synthesized
        .and_then(|v| u32::try_from(v).ok())
        .filter(|v| *v > 0)
        .or(hint)
        .unwrap_or(default)
        .max(1)
}

/// Synthesized capacity, then the hinted size in GB, then 1 TiB
fn capacity_mib(synthesized: Option<u64>, hint_gb: Option<u64>) -> u64 {
    synthesized
        .filter(|c| *c > 0)
        .or(hint_gb.map(|gb| gb.saturating_mul(1024)))
        .unwrap_or(1_048_576)
}
