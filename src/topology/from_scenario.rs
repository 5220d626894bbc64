// Copyright (c) 2025 - Cowboy AI, Inc.
//! Scenario-driven expansion

use tracing::{debug, warn};

use super::{Placement, TopologyBuilder};
use crate::errors::SynthError;
use crate::inventory::Inventory;
use crate::scenario::{DatacenterSpec, Scenario};

impl TopologyBuilder<'_> {
    /// Depth-first walk: datacenter, shared datastores, clusters and hosts,
    /// then the deployment plan
    pub(super) async fn expand_scenario(&mut self, inventory: &mut Inventory, scenario: &Scenario) {
        for dc_spec in &scenario.datacenters {
            self.expand_datacenter(inventory, scenario, dc_spec).await;
        }
    }

    async fn expand_datacenter(&mut self, inventory: &mut Inventory, scenario: &Scenario, spec: &DatacenterSpec) {
        let datacenter = inventory.add_datacenter(&spec.name);

        for shared in &spec.shared_datastores {
            self.create_shared_datastore(inventory, datacenter, shared).await;
        }

        for (profile_name, profile) in &spec.cluster_profiles {
            let name = profile
                .cluster_name
                .clone()
                .unwrap_or_else(|| format!("{}-{}", spec.name, profile_name));
            let cluster = self
                .create_cluster(inventory, datacenter, name, Some(profile_name), Some(profile), false)
                .await;

            let hardware_name = profile.host_hardware_profile.as_deref();
            let hardware = hardware_name.and_then(|n| scenario.host_hardware_profiles.get(n));
            if let (Some(n), None) = (hardware_name, hardware) {
                Self::gap(format!(
                    "host hardware profile '{}' referenced by cluster profile '{}' is not defined",
                    n, profile_name
                ));
            }

            let num_hosts = profile.num_hosts.unwrap_or(self.params.default_hosts_per_cluster);
            if num_hosts == 0 {
                warn!(
                    cluster_profile = %profile_name,
                    datacenter = %spec.name,
                    "cluster profile declares no hosts"
                );
            }
            for _ in 0..num_hosts {
                self.create_host(inventory, cluster, hardware_name, hardware).await;
            }
        }

        for entry in &spec.deployment_plan {
            let profile = scenario.vm_profiles.get(&entry.profile_name);
            if profile.is_none() {
                Self::gap(format!("VM profile '{}' is not defined", entry.profile_name));
            }

            let cluster = match inventory.find_cluster_by_profile(datacenter, &entry.target_cluster_profile) {
                Some(cluster) => cluster,
                None => {
                    Self::gap(format!(
                        "target cluster profile '{}' does not exist in datacenter '{}'",
                        entry.target_cluster_profile, spec.name
                    ));
                    self.placeholder_cluster(inventory, datacenter).await
                }
            };

            let hosts = inventory.cluster(cluster).hosts.clone();
            if hosts.is_empty() && entry.count > 0 {
                warn!(
                    "{}",
                    SynthError::ResourceGapFallback(format!(
                        "cluster '{}' has no hosts; {} VMs of profile '{}' get no host",
                        inventory.cluster(cluster).name,
                        entry.count,
                        entry.profile_name
                    ))
                );
            }

            for _ in 0..entry.count {
                let placement = Placement {
                    host: self.pick_host(&hosts),
                    cluster,
                    datacenter,
                };
                self.create_vm(inventory, placement, Some(&entry.profile_name), profile)
                    .await;
            }
            debug!(
                profile = %entry.profile_name,
                count = entry.count,
                "deployment plan entry expanded"
            );
        }
    }
}
