// Copyright (c) 2025 - Cowboy AI, Inc.
//! Derived-Record Generators
//!
//! One generator per report category. A generator reads the built
//! inventory, expands entities into rows, asks the synthesizer for content
//! fields, and sets identity, placement and provenance columns itself.
//!
//! Every row ends with the `VI SDK Server` and `VI SDK UUID` columns.
//!
//! # Determinism
//!
//! Each category draws from its own RNG seeded from the run seed and the
//! category ordinal, and iterates entities in insertion order, so a
//! category's rows do not depend on how the concurrent tasks interleave.
//! Networks and switches are created through the lazy registry in VM order
//! by every category that needs them; whichever task gets there first, the
//! first reference (and therefore the created entity) is the same.

mod cluster;
mod disk;
mod host;
mod network;
mod vm;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::config::TierParams;
use crate::domain::VirtualMachine;
use crate::inventory::Inventory;
use crate::synth::FieldSynthesizer;

/// Provenance columns carried by every row
pub const PROVENANCE_HEADERS: [&str; 2] = ["VI SDK Server", "VI SDK UUID"];

/// Report categories in export order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReportCategory {
    VInfo,
    VCpu,
    VMemory,
    VDisk,
    VNetwork,
    VSnapshot,
    VTools,
    VHost,
    VHba,
    VNic,
    VSwitch,
    VPort,
    DvSwitch,
    DvPort,
    VCluster,
    VDatastore,
    VRp,
    VSource,
}

impl ReportCategory {
    pub const ALL: [ReportCategory; 18] = [
        Self::VInfo,
        Self::VCpu,
        Self::VMemory,
        Self::VDisk,
        Self::VNetwork,
        Self::VSnapshot,
        Self::VTools,
        Self::VHost,
        Self::VHba,
        Self::VNic,
        Self::VSwitch,
        Self::VPort,
        Self::DvSwitch,
        Self::DvPort,
        Self::VCluster,
        Self::VDatastore,
        Self::VRp,
        Self::VSource,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VInfo => "vInfo",
            Self::VCpu => "vCPU",
            Self::VMemory => "vMemory",
            Self::VDisk => "vDisk",
            Self::VNetwork => "vNetwork",
            Self::VSnapshot => "vSnapshot",
            Self::VTools => "vTools",
            Self::VHost => "vHost",
            Self::VHba => "vHBA",
            Self::VNic => "vNIC",
            Self::VSwitch => "vSwitch",
            Self::VPort => "vPort",
            Self::DvSwitch => "dvSwitch",
            Self::DvPort => "dvPort",
            Self::VCluster => "vCluster",
            Self::VDatastore => "vDatastore",
            Self::VRp => "vRP",
            Self::VSource => "vSource",
        }
    }

    /// Position in [`ReportCategory::ALL`]
    pub fn ordinal(&self) -> u64 {
        *self as u64
    }

    /// Column headers without the provenance pair
    fn domain_headers(&self) -> &'static [&'static str] {
        match self {
            Self::VInfo => vm::INFO_HEADERS,
            Self::VCpu => vm::CPU_HEADERS,
            Self::VMemory => vm::MEMORY_HEADERS,
            Self::VSnapshot => vm::SNAPSHOT_HEADERS,
            Self::VTools => vm::TOOLS_HEADERS,
            Self::VDisk => disk::DISK_HEADERS,
            Self::VNetwork => network::NETWORK_HEADERS,
            Self::VSwitch => network::SWITCH_HEADERS,
            Self::VPort => network::PORT_HEADERS,
            Self::DvSwitch => network::DV_SWITCH_HEADERS,
            Self::DvPort => network::DV_PORT_HEADERS,
            Self::VHost => host::HOST_HEADERS,
            Self::VHba => host::HBA_HEADERS,
            Self::VNic => host::NIC_HEADERS,
            Self::VCluster => cluster::CLUSTER_HEADERS,
            Self::VDatastore => cluster::DATASTORE_HEADERS,
            Self::VRp => cluster::RESOURCE_POOL_HEADERS,
            Self::VSource => cluster::SOURCE_HEADERS,
        }
    }

    /// Full header row, provenance last
    pub fn headers(&self) -> Vec<String> {
        self.domain_headers()
            .iter()
            .chain(PROVENANCE_HEADERS.iter())
            .map(|h| h.to_string())
            .collect()
    }
}

impl fmt::Display for ReportCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header-ordered rows of one report category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub category: ReportCategory,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Report {
    pub fn new(category: ReportCategory) -> Self {
        Self {
            category,
            headers: category.headers(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by header
    pub fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// All cells of one column, in row order
    pub fn column_values(&self, header: &str) -> Vec<&str> {
        match self.column(header) {
            Some(i) => self.rows.iter().filter_map(|r| r.get(i)).map(String::as_str).collect(),
            None => Vec::new(),
        }
    }
}

/// Shared, read-mostly state handed to every generator task
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub inventory: Arc<Inventory>,
    pub synth: Arc<FieldSynthesizer>,
    pub params: TierParams,
    pub seed: u64,
}

impl GenerationContext {
    /// RNG private to one category
    pub fn rng_for(&self, category: ReportCategory) -> StdRng {
        StdRng::seed_from_u64(
            self.seed
                .wrapping_add(category.ordinal().wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        )
    }

    /// Complete a row by appending the provenance pair
    fn row(&self, mut cells: Vec<String>) -> Vec<String> {
        let sdk = self.inventory.sdk();
        cells.push(sdk.name.clone());
        cells.push(sdk.uuid.to_string());
        cells
    }

    /// Host, cluster and datacenter names of a VM
    fn vm_placement(&self, vm: &VirtualMachine) -> [String; 3] {
        let inv = &self.inventory;
        [
            inv.vm_host_name(vm).to_string(),
            inv.cluster(vm.cluster).name.clone(),
            inv.datacenter(vm.datacenter).name.clone(),
        ]
    }
}

/// A task producing one report category
#[async_trait]
pub trait RecordGenerator: Send + Sync {
    fn category(&self) -> ReportCategory;

    async fn generate(&self, ctx: &GenerationContext) -> Report;
}

/// Generator for one of the built-in categories
#[derive(Debug, Clone, Copy)]
pub struct CategoryGenerator(pub ReportCategory);

#[async_trait]
impl RecordGenerator for CategoryGenerator {
    fn category(&self) -> ReportCategory {
        self.0
    }

    async fn generate(&self, ctx: &GenerationContext) -> Report {
        let mut rng = ctx.rng_for(self.0);
        let mut report = Report::new(self.0);
        report.rows = match self.0 {
            ReportCategory::VInfo => vm::info_rows(ctx),
            ReportCategory::VCpu => vm::cpu_rows(ctx, &mut rng),
            ReportCategory::VMemory => vm::memory_rows(ctx, &mut rng),
            ReportCategory::VSnapshot => vm::snapshot_rows(ctx, &mut rng).await,
            ReportCategory::VTools => vm::tools_rows(ctx, &mut rng),
            ReportCategory::VDisk => disk::disk_rows(ctx, &mut rng).await,
            ReportCategory::VNetwork => network::network_rows(ctx, &mut rng).await,
            ReportCategory::VSwitch => network::switch_rows(ctx).await,
            ReportCategory::VPort => network::port_rows(ctx).await,
            ReportCategory::DvSwitch => network::dv_switch_rows(ctx).await,
            ReportCategory::DvPort => network::dv_port_rows(ctx).await,
            ReportCategory::VHost => host::host_rows(ctx),
            ReportCategory::VHba => host::hba_rows(ctx, &mut rng).await,
            ReportCategory::VNic => host::nic_rows(ctx, &mut rng).await,
            ReportCategory::VCluster => cluster::cluster_rows(ctx),
            ReportCategory::VDatastore => cluster::datastore_rows(ctx, &mut rng).await,
            ReportCategory::VRp => cluster::resource_pool_rows(ctx),
            ReportCategory::VSource => cluster::source_rows(ctx),
        };
        report
    }
}

/// Integer to cell text
fn cell(value: impl ToString) -> String {
    value.to_string()
}

fn yes_no(value: bool) -> String {
    String::from(if value { "True" } else { "False" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    #[test]
    fn test_every_header_row_ends_with_provenance() {
        for category in ReportCategory::ALL {
            let headers = category.headers();
            let n = headers.len();
            assert_eq!(headers[n - 2], "VI SDK Server");
            assert_eq!(headers[n - 1], "VI SDK UUID");
        }
    }

    #[test]
    fn test_category_names_unique() {
        let names: HashSet<&str> = ReportCategory::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names.len(), ReportCategory::ALL.len());
    }

    #[test]
    fn test_ordinal_matches_position() {
        for (i, category) in ReportCategory::ALL.iter().enumerate() {
            assert_eq!(category.ordinal(), i as u64);
        }
    }

    #[test]
    fn test_column_lookup() {
        let mut report = Report::new(ReportCategory::VSource);
        let width = report.headers.len();
        report.rows.push(vec!["x".to_string(); width]);
        assert_eq!(report.column("VI SDK UUID"), Some(width - 1));
        assert_eq!(report.column_values("VI SDK Server"), vec!["x"]);
        assert!(report.column_values("nope").is_empty());
    }
}
