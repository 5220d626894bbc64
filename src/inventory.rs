// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Store
//!
//! The in-memory graph of one generation run. It is an explicit context
//! object: the topology builder mutates it through `&mut Inventory`, then the
//! pipeline wraps it in an `Arc` and hands it to the report tasks.
//!
//! # Write Discipline
//!
//! ```text
//! Build phase      &mut Inventory       datacenters, clusters, hosts, datastores,
//!                                        pools, folders, VMs (append only)
//! Report phase     Arc<Inventory>       topology is read-only;
//!                  LazyRegistry (lock)  networks, switches, fallback datastores
//!                                        (create-if-absent by name)
//! ```
//!
//! Every mirrored membership list (datacenter → VMs, cluster → hosts, ...)
//! is maintained by the `add_*` methods here, so the builder never touches
//! two sides of a relation by hand.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::entities::*;
use crate::domain::naming;
use crate::domain::network::{Mtu, VlanId};

/// Inventory of one run
#[derive(Debug)]
pub struct Inventory {
    sdk: SdkServer,
    generated_at: DateTime<Utc>,
    datacenters: Vec<Datacenter>,
    clusters: Vec<Cluster>,
    hosts: Vec<Host>,
    datastores: Vec<Datastore>,
    resource_pools: Vec<ResourcePool>,
    folders: Vec<Folder>,
    vms: Vec<VirtualMachine>,
    lazy: LazyRegistry,
}

/// Content of a new cluster, before it is wired into the graph
#[derive(Debug, Clone)]
pub struct NewCluster {
    pub name: String,
    pub profile: Option<String>,
    pub ha_enabled: bool,
    pub drs_enabled: bool,
    pub drs_behavior: String,
    pub placeholder: bool,
}

/// Content of a new datastore, before it is wired into the graph
#[derive(Debug, Clone)]
pub struct NewDatastore {
    pub name: String,
    pub ds_type: String,
    pub capacity_mib: u64,
    pub accessible: bool,
    pub tags: Vec<String>,
}

impl Inventory {
    /// Create an empty inventory bound to one management server identity
    pub fn new(sdk: SdkServer, generated_at: DateTime<Utc>) -> Self {
        Self {
            sdk,
            generated_at,
            datacenters: Vec::new(),
            clusters: Vec::new(),
            hosts: Vec::new(),
            datastores: Vec::new(),
            resource_pools: Vec::new(),
            folders: Vec::new(),
            vms: Vec::new(),
            lazy: LazyRegistry::default(),
        }
    }

    pub fn sdk(&self) -> &SdkServer {
        &self.sdk
    }

    /// Anchor instant for every relative date in the run
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn datacenters(&self) -> &[Datacenter] {
        &self.datacenters
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// Datastores created during the build phase
    pub fn datastores(&self) -> &[Datastore] {
        &self.datastores
    }

    pub fn resource_pools(&self) -> &[ResourcePool] {
        &self.resource_pools
    }

    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub fn vms(&self) -> &[VirtualMachine] {
        &self.vms
    }

    pub fn lazy(&self) -> &LazyRegistry {
        &self.lazy
    }

    pub fn datacenter(&self, id: DatacenterId) -> &Datacenter {
        &self.datacenters[id.0]
    }

    pub fn cluster(&self, id: ClusterId) -> &Cluster {
        &self.clusters[id.0]
    }

    pub fn host(&self, id: HostId) -> &Host {
        &self.hosts[id.0]
    }

    pub fn datastore(&self, id: DatastoreId) -> &Datastore {
        &self.datastores[id.0]
    }

    pub fn resource_pool(&self, id: ResourcePoolId) -> &ResourcePool {
        &self.resource_pools[id.0]
    }

    pub fn folder(&self, id: FolderId) -> &Folder {
        &self.folders[id.0]
    }

    pub fn vm(&self, id: VmId) -> &VirtualMachine {
        &self.vms[id.0]
    }

    /// Host name of a VM, or the sentinel when placement failed
    pub fn vm_host_name(&self, vm: &VirtualMachine) -> &str {
        vm.host.map(|h| self.host(h).name.as_str()).unwrap_or(NO_HOST)
    }

    pub fn find_datacenter(&self, name: &str) -> Option<DatacenterId> {
        self.datacenters.iter().find(|d| d.name == name).map(|d| d.id)
    }

    /// Cluster expanded from `profile` inside `datacenter`
    pub fn find_cluster_by_profile(&self, datacenter: DatacenterId, profile: &str) -> Option<ClusterId> {
        self.datacenters[datacenter.0]
            .clusters
            .iter()
            .copied()
            .find(|c| self.clusters[c.0].profile.as_deref() == Some(profile))
    }

    pub fn find_cluster(&self, datacenter: DatacenterId, name: &str) -> Option<ClusterId> {
        self.datacenters[datacenter.0]
            .clusters
            .iter()
            .copied()
            .find(|c| self.clusters[c.0].name == name)
    }

    // ---------------------------------------------------------------------
    // Build-phase mutation
    // ---------------------------------------------------------------------

    /// Create a datacenter, or return the existing one with the same name
    pub fn add_datacenter(&mut self, name: &str) -> DatacenterId {
        if let Some(id) = self.find_datacenter(name) {
            return id;
        }
        let id = DatacenterId(self.datacenters.len());
        self.datacenters.push(Datacenter {
            id,
            name: name.to_string(),
            clusters: Vec::new(),
            hosts: Vec::new(),
            datastores: Vec::new(),
            folders: Vec::new(),
            vms: Vec::new(),
        });
        debug!(datacenter = name, "datacenter created");
        id
    }

    /// Create a cluster together with its default `Resources` pool
    pub fn add_cluster(&mut self, datacenter: DatacenterId, cluster: NewCluster) -> ClusterId {
        let id = ClusterId(self.clusters.len());
        self.clusters.push(Cluster {
            id,
            name: cluster.name,
            datacenter,
            profile: cluster.profile,
            hosts: Vec::new(),
            vms: Vec::new(),
            resource_pools: Vec::new(),
            ha_enabled: cluster.ha_enabled,
            drs_enabled: cluster.drs_enabled,
            drs_behavior: cluster.drs_behavior,
            placeholder: cluster.placeholder,
        });
        self.datacenters[datacenter.0].clusters.push(id);
        self.push_pool(id, "Resources".to_string(), None);
        debug!(cluster = %self.clusters[id.0].name, "cluster created");
        id
    }

    fn push_pool(&mut self, cluster: ClusterId, name: String, parent: Option<ResourcePoolId>) -> ResourcePoolId {
        let id = ResourcePoolId(self.resource_pools.len());
        self.resource_pools.push(ResourcePool {
            id,
            name,
            cluster,
            parent,
            vms: Vec::new(),
        });
        self.clusters[cluster.0].resource_pools.push(id);
        id
    }

    /// Child pool below the cluster's root pool, created if absent
    pub fn ensure_child_pool(&mut self, cluster: ClusterId, child: &str) -> ResourcePoolId {
        let root = self.clusters[cluster.0].root_pool();
        let Some(root) = root else {
            return self.push_pool(cluster, "Resources".to_string(), None);
        };
        let path = format!("{}/{}", self.resource_pools[root.0].name, child);
        if let Some(existing) = self.clusters[cluster.0]
            .resource_pools
            .iter()
            .copied()
            .find(|p| self.resource_pools[p.0].name == path)
        {
            return existing;
        }
        self.push_pool(cluster, path, Some(root))
    }

    /// Folder in a datacenter, created if absent
    pub fn ensure_folder(&mut self, datacenter: DatacenterId, name: &str) -> FolderId {
        if let Some(existing) = self.datacenters[datacenter.0]
            .folders
            .iter()
            .copied()
            .find(|f| self.folders[f.0].name == name)
        {
            return existing;
        }
        let id = FolderId(self.folders.len());
        self.folders.push(Folder {
            id,
            name: name.to_string(),
            datacenter,
            vms: Vec::new(),
        });
        self.datacenters[datacenter.0].folders.push(id);
        id
    }

    /// Add a host to a cluster; the host's datacenter is the cluster's
    pub fn add_host(
        &mut self,
        cluster: ClusterId,
        name: String,
        uuid: uuid::Uuid,
        hardware_profile: Option<String>,
        hardware: HostHardware,
    ) -> HostId {
        let datacenter = self.clusters[cluster.0].datacenter;
        let id = HostId(self.hosts.len());
        self.hosts.push(Host {
            id,
            name,
            uuid,
            cluster,
            datacenter,
            hardware_profile,
            hardware,
            local_datastores: Vec::new(),
            vms: Vec::new(),
        });
        self.clusters[cluster.0].hosts.push(id);
        self.datacenters[datacenter.0].hosts.push(id);
        id
    }

    /// Local datastore owned by exactly one host
    pub fn add_local_datastore(&mut self, host: HostId, ds: NewDatastore) -> DatastoreId {
        let datacenter = self.hosts[host.0].datacenter;
        let id = self.push_datastore(datacenter, ds, true, vec![host]);
        self.hosts[host.0].local_datastores.push(id);
        id
    }

    /// Shared datastore in a datacenter, initially connected to no host
    pub fn add_shared_datastore(&mut self, datacenter: DatacenterId, ds: NewDatastore) -> DatastoreId {
        self.push_datastore(datacenter, ds, false, Vec::new())
    }

    /// Connect a host to a shared datastore of the same datacenter
    ///
    /// Returns `false` (and leaves the graph untouched) for local datastores
    /// and for hosts from another datacenter.
    pub fn connect_shared_datastore(&mut self, datastore: DatastoreId, host: HostId) -> bool {
        let host_dc = self.hosts[host.0].datacenter;
        let ds = &mut self.datastores[datastore.0];
        if ds.local || ds.datacenter != host_dc {
            return false;
        }
        if !ds.connected_hosts.contains(&host) {
            ds.connected_hosts.push(host);
        }
        true
    }

    fn push_datastore(
        &mut self,
        datacenter: DatacenterId,
        ds: NewDatastore,
        local: bool,
        connected_hosts: Vec<HostId>,
    ) -> DatastoreId {
        let id = DatastoreId(self.datastores.len());
        self.datastores.push(Datastore {
            name: ds.name,
            ds_type: ds.ds_type,
            capacity_mib: ds.capacity_mib,
            accessible: ds.accessible,
            local,
            connected_hosts,
            datacenter,
            tags: ds.tags,
            placeholder: false,
        });
        self.datacenters[datacenter.0].datastores.push(id);
        id
    }

    /// Register a VM and mirror its membership in every container
    ///
    /// Cluster and datacenter are taken from the host when there is one, which
    /// is what keeps a VM's placement consistent with its host's.
    pub fn add_vm(&mut self, mut vm: VirtualMachine) -> VmId {
        let id = VmId(self.vms.len());
        vm.id = id;
        if let Some(host) = vm.host {
            vm.cluster = self.hosts[host.0].cluster;
            vm.datacenter = self.hosts[host.0].datacenter;
            self.hosts[host.0].vms.push(id);
        }
        self.clusters[vm.cluster.0].vms.push(id);
        self.datacenters[vm.datacenter.0].vms.push(id);
        self.folders[vm.folder.0].vms.push(id);
        self.resource_pools[vm.resource_pool.0].vms.push(id);
        self.vms.push(vm);
        id
    }

    /// Entity counts, used for logging and determinism checks
    pub fn counts(&self) -> InventoryCounts {
        InventoryCounts {
            datacenters: self.datacenters.len(),
            clusters: self.clusters.len(),
            hosts: self.hosts.len(),
            datastores: self.datastores.len(),
            resource_pools: self.resource_pools.len(),
            folders: self.folders.len(),
            vms: self.vms.len(),
        }
    }

    pub fn log_summary(&self) {
        let c = self.counts();
        info!(
            datacenters = c.datacenters,
            clusters = c.clusters,
            hosts = c.hosts,
            datastores = c.datastores,
            vms = c.vms,
            "inventory built"
        );
    }
}

/// Entity counts of the build-phase topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InventoryCounts {
    pub datacenters: usize,
    pub clusters: usize,
    pub hosts: usize,
    pub datastores: usize,
    pub resource_pools: usize,
    pub folders: usize,
    pub vms: usize,
}

/// Placement facts needed to create a port group on first use
#[derive(Debug, Clone)]
pub struct NetworkRequest<'a> {
    pub name: &'a str,
    pub datacenter: &'a str,
    /// Host of the referencing VM; standard switches are scoped to it
    pub host: &'a str,
}

#[derive(Debug, Default)]
struct LazyState {
    networks: Vec<Network>,
    switches: Vec<Switch>,
    datastores: Vec<Datastore>,
    network_index: HashMap<String, usize>,
    switch_index: HashMap<String, usize>,
    datastore_index: HashMap<String, usize>,
}

impl LazyState {
    /// Switch named `candidate.name`, registering `candidate` if absent
    fn ensure_switch(&mut self, candidate: Switch) -> Switch {
        if let Some(&i) = self.switch_index.get(&candidate.name) {
            return self.switches[i].clone();
        }
        let idx = self.switches.len();
        self.switch_index.insert(candidate.name.clone(), idx);
        debug!(switch = %candidate.name, "switch created on first reference");
        self.switches.push(candidate.clone());
        candidate
    }
}

fn host_switch(host: &str, datacenter: &str) -> Switch {
    Switch {
        name: naming::standard_switch_name(host),
        kind: SwitchKind::Standard,
        scope: SwitchScope::Host(host.to_string()),
        datacenter: datacenter.to_string(),
        mtu: Mtu::default(),
        ports: 128,
    }
}

/// Entities created on first reference during the report phase
///
/// All writes go through one lock, so concurrent report tasks asking for the
/// same name get the same entity: the first writer creates it and every later
/// caller (from any task) reuses it. Nothing is ever removed.
#[derive(Debug, Default)]
pub struct LazyRegistry {
    state: Mutex<LazyState>,
}

impl LazyRegistry {
    /// Port group by name, creating it and its switch if absent
    pub async fn ensure_network(&self, request: NetworkRequest<'_>) -> Network {
        let mut state = self.state.lock().await;
        if let Some(&i) = state.network_index.get(request.name) {
            return state.networks[i].clone();
        }

        let kind = Network::kind_for_name(request.name);
        let switch = match kind {
            SwitchKind::Distributed => state.ensure_switch(Switch {
                name: format!("DSwitch-{}", naming::slug(request.datacenter)),
                kind,
                scope: SwitchScope::Datacenter(request.datacenter.to_string()),
                datacenter: request.datacenter.to_string(),
                mtu: Mtu::jumbo(),
                ports: 512,
            }),
            SwitchKind::Standard => state.ensure_switch(host_switch(request.host, request.datacenter)),
        };

        let network = Network {
            name: request.name.to_string(),
            kind,
            switch: switch.name,
            vlan: VlanId::from_port_group_name(request.name),
            datacenter: request.datacenter.to_string(),
            host: match kind {
                SwitchKind::Standard => Some(request.host.to_string()),
                SwitchKind::Distributed => None,
            },
        };
        let idx = state.networks.len();
        state.networks.push(network.clone());
        state.network_index.insert(network.name.clone(), idx);
        debug!(network = %network.name, "network created on first reference");
        network
    }

    /// Standard switch of a host, creating it if absent
    ///
    /// Every host owns one; its uplinks (the host's physical NICs) and its
    /// port groups both point at it.
    pub async fn ensure_host_switch(&self, host: &str, datacenter: &str) -> Switch {
        self.state.lock().await.ensure_switch(host_switch(host, datacenter))
    }

    /// Placeholder datastore for a datacenter, minted if absent
    ///
    /// The first caller decides its attributes; later callers get that record.
    pub async fn ensure_fallback_datastore(&self, datacenter: DatacenterId, datacenter_name: &str) -> Datastore {
        let name = naming::fallback_datastore_name(datacenter_name);
        let mut state = self.state.lock().await;
        if let Some(&i) = state.datastore_index.get(&name) {
            return state.datastores[i].clone();
        }
        let ds = Datastore {
            name: name.clone(),
            ds_type: "VMFS".to_string(),
            capacity_mib: 1024 * 1024,
            accessible: true,
            local: false,
            connected_hosts: Vec::new(),
            datacenter,
            tags: vec!["placeholder".to_string()],
            placeholder: true,
        };
        let idx = state.datastores.len();
        state.datastores.push(ds.clone());
        state.datastore_index.insert(name, idx);
        ds
    }

    pub async fn find_network(&self, name: &str) -> Option<Network> {
        let state = self.state.lock().await;
        state.network_index.get(name).map(|&i| state.networks[i].clone())
    }

    pub async fn find_switch(&self, name: &str) -> Option<Switch> {
        let state = self.state.lock().await;
        state.switch_index.get(name).map(|&i| state.switches[i].clone())
    }

    /// Snapshot of all networks in creation order
    pub async fn networks(&self) -> Vec<Network> {
        self.state.lock().await.networks.clone()
    }

    /// Snapshot of all switches in creation order
    pub async fn switches(&self) -> Vec<Switch> {
        self.state.lock().await.switches.clone()
    }

    /// Snapshot of all minted fallback datastores in creation order
    pub async fn datastores(&self) -> Vec<Datastore> {
        self.state.lock().await.datastores.clone()
    }
}
