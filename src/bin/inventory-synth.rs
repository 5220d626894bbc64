// Copyright (c) 2025 - Cowboy AI, Inc.
//! Inventory Synth
//!
//! Builds a synthetic virtualization inventory and writes one CSV per report
//! category.
//!
//! Run with: cargo run --bin inventory-synth
//!
//! Configuration comes from environment variables:
//! - `INVENTORY_SEED` - master seed (default 42)
//! - `INVENTORY_TIER` - low, medium or high (default medium)
//! - `INVENTORY_VM_COUNT` - VM count for randomized runs
//! - `INVENTORY_SCENARIO` - path of a YAML scenario; randomized when unset
//! - `INVENTORY_OUTPUT_DIR` - CSV destination (default ./inventory-out)
//! - `INVENTORY_PROVIDER` - disabled, mock, openai or ollama

use anyhow::{Context, Result};
use inventory_synth::{
    config::SynthConfig,
    export::{CsvDirectorySink, ExportSink},
    pipeline::{run_generation, RunOptions},
    scenario::Scenario,
    synth::FieldSynthesizer,
};
use std::path::Path;
use tracing::info;

fn load_scenario(path: &Path) -> Result<Scenario> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario {}", path.display()))?;
    Scenario::from_yaml_str(&source)
        .with_context(|| format!("Invalid scenario {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = SynthConfig::from_env();
    info!("Configuration loaded:");
    info!("  - Seed: {}", config.seed);
    info!("  - Tier: {}", config.tier);
    info!("  - Output: {}", config.output_dir.display());

    let scenario = match &config.scenario_path {
        Some(path) => {
            info!("  - Scenario: {}", path.display());
            Some(load_scenario(path)?)
        }
        None => {
            info!("  - Randomized: {} VMs", config.target_vm_count());
            None
        }
    };

    let synth = FieldSynthesizer::from_settings(&config.provider);
    let output = run_generation(RunOptions::from_config(&config), scenario, synth).await;

    let mut sink = CsvDirectorySink::new(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;
    sink.write_all(&output.reports)
        .context("Failed to write reports")?;

    for (category, rows) in output.row_counts() {
        info!("  {:<12} {:>6} rows", category.as_str(), rows);
    }
    info!(
        "Wrote {} reports to {}",
        sink.written().len(),
        sink.dir().display()
    );

    Ok(())
}
