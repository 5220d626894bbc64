// Copyright (c) 2025 - Cowboy AI, Inc.
//! Randomized expansion

use super::{Placement, TopologyBuilder};
use crate::domain::naming;
use crate::inventory::Inventory;
use crate::scenario::SharedDatastoreSpec;

const DATACENTER: &str = "Datacenter-01";
const CLUSTER: &str = "Cluster-01";

impl TopologyBuilder<'_> {
    /// One datacenter, one cluster, `max(1, vm_count / vms_per_host)` hosts
    /// and `vm_count` VMs placed uniformly at random
    pub(super) async fn expand_randomized(&mut self, inventory: &mut Inventory, vm_count: u32) {
        let existing = inventory.datacenters().first().map(|dc| dc.id);
        let datacenter = match existing {
            Some(dc) => dc,
            None => {
                let dc = inventory.add_datacenter(DATACENTER);
                let shared = SharedDatastoreSpec {
                    name: format!("{}-shared-01", naming::slug(DATACENTER)),
                    ..SharedDatastoreSpec::default()
                };
                self.create_shared_datastore(inventory, dc, &shared).await;
                dc
            }
        };

        let existing = inventory.datacenter(datacenter).clusters.first().copied();
        let cluster = match existing {
            Some(cluster) => cluster,
            None => {
                self.create_cluster(inventory, datacenter, CLUSTER.to_string(), None, None, false)
                    .await
            }
        };

        let target_hosts = (vm_count / self.params.vms_per_host).max(1) as usize;
        while inventory.cluster(cluster).hosts.len() < target_hosts {
            self.create_host(inventory, cluster, None, None).await;
        }

        let hosts = inventory.cluster(cluster).hosts.clone();
        for _ in 0..vm_count {
            let placement = Placement {
                host: self.pick_host(&hosts),
                cluster,
                datacenter,
            };
            self.create_vm(inventory, placement, None, None).await;
        }
    }
}
