// Copyright (c) 2025 - Cowboy AI, Inc.
//! Synthetic virtualization inventory
//!
//! Builds a consistent inventory of datacenters, clusters, hosts, datastores
//! and virtual machines, either from a YAML scenario or at random, then
//! derives a family of tabular reports from it.
//!
//! - [`topology`] - builds the [`inventory::Inventory`] from a scenario or a VM count
//! - [`synth`] - fills entity content through a remote provider or the seeded fallback
//! - [`reports`] - one generator per report category
//! - [`pipeline`] - sequential and fan-out orchestration of a whole run
//! - [`export`] - CSV output of finished reports

#[cfg(feature = "remote")]
pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod export;
pub mod inventory;
pub mod pipeline;
pub mod reports;
pub mod scenario;
pub mod synth;
pub mod topology;

// Re-export commonly used types
pub use config::{ComplexityTier, ProviderKind, ProviderSettings, SynthConfig, TierParams};
pub use errors::{ExportError, ScenarioError, SynthError, SynthResult};
pub use inventory::Inventory;
pub use pipeline::{run_generation, GenerationOutput, RunOptions};
pub use reports::{Report, ReportCategory};
pub use scenario::Scenario;
pub use synth::{FieldSynthesizer, SynthContext};
