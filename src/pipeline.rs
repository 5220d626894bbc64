// Copyright (c) 2025 - Cowboy AI, Inc.
//! Generation Pipeline
//!
//! ```text
//! build topology ──> validate ──> vHost, vCluster (sequential)
//!                                      │
//!                  ┌───────────────────┴───────────────────┐
//!                  │ JoinSet: one task per remaining report │
//!                  └───────────────────┬───────────────────┘
//!                                      v
//!                               vDatastore (after join)
//! ```
//!
//! A panicking report task only loses its own category; the run completes
//! with everything else. Reports come back in [`ReportCategory::ALL`] order
//! whatever order the tasks finish in.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::{SynthConfig, TierParams};
use crate::domain::validate_inventory;
use crate::inventory::Inventory;
use crate::reports::{CategoryGenerator, GenerationContext, RecordGenerator, Report, ReportCategory};
use crate::scenario::Scenario;
use crate::synth::FieldSynthesizer;
use crate::topology::{self, BuildMode, TopologyBuilder};

/// Categories produced before the fan-out
pub const SEQUENTIAL: [ReportCategory; 2] = [ReportCategory::VHost, ReportCategory::VCluster];

/// Categories produced after the fan-out has joined
pub const POST_JOIN: [ReportCategory; 1] = [ReportCategory::VDatastore];

/// Parameters of one run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub seed: u64,
    pub params: TierParams,
    /// VM count for randomized mode
    pub vm_count: u32,
    /// Anchor for every synthesized date
    pub generated_at: DateTime<Utc>,
}

impl RunOptions {
    pub fn new(seed: u64, params: TierParams, vm_count: u32) -> Self {
        Self {
            seed,
            params,
            vm_count,
            generated_at: Utc::now(),
        }
    }

    pub fn from_config(config: &SynthConfig) -> Self {
        Self::new(config.seed, config.tier.params(), config.target_vm_count())
    }

    pub fn with_generated_at(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }
}

/// Everything one run produced
#[derive(Debug)]
pub struct GenerationOutput {
    pub inventory: Arc<Inventory>,
    pub reports: Vec<Report>,
}

impl GenerationOutput {
    pub fn report(&self, category: ReportCategory) -> Option<&Report> {
        self.reports.iter().find(|r| r.category == category)
    }

    /// Row count per produced category
    pub fn row_counts(&self) -> Vec<(ReportCategory, usize)> {
        self.reports.iter().map(|r| (r.category, r.len())).collect()
    }
}

/// Generators run concurrently by default
pub fn default_fanout() -> Vec<Arc<dyn RecordGenerator>> {
    ReportCategory::ALL
        .into_iter()
        .filter(|c| !SEQUENTIAL.contains(c) && !POST_JOIN.contains(c))
        .map(|c| Arc::new(CategoryGenerator(c)) as Arc<dyn RecordGenerator>)
        .collect()
}

/// Build the inventory and produce every report
pub async fn run_generation(
    options: RunOptions,
    scenario: Option<Scenario>,
    synth: FieldSynthesizer,
) -> GenerationOutput {
    run_with_generators(options, scenario, synth, default_fanout()).await
}

/// Like [`run_generation`] with a caller-chosen fan-out set
pub async fn run_with_generators(
    options: RunOptions,
    scenario: Option<Scenario>,
    synth: FieldSynthesizer,
    fanout: Vec<Arc<dyn RecordGenerator>>,
) -> GenerationOutput {
    let mut identity_rng = StdRng::seed_from_u64(options.seed ^ 0x5EED_5DC0_0000_0001);
    let mut inventory = Inventory::new(topology::sdk_server(&mut identity_rng), options.generated_at);

    let mode = match &scenario {
        Some(s) => BuildMode::Scenario(s),
        None => BuildMode::Randomized {
            vm_count: options.vm_count,
        },
    };
    TopologyBuilder::new(&synth, options.params.clone(), options.seed)
        .build(&mut inventory, mode)
        .await;

    let violations = validate_inventory(&inventory);
    for violation in &violations {
        warn!("inventory invariant violated: {}", violation);
    }

    let ctx = Arc::new(GenerationContext {
        inventory: Arc::new(inventory),
        synth: Arc::new(synth),
        params: options.params.normalized(),
        seed: options.seed,
    });

    let mut produced: HashMap<ReportCategory, Report> = HashMap::new();

    for category in SEQUENTIAL {
        let report = CategoryGenerator(category).generate(&ctx).await;
        produced.insert(category, report);
    }

    let mut tasks = JoinSet::new();
    for generator in fanout {
        let ctx = Arc::clone(&ctx);
        tasks.spawn(async move { generator.generate(&ctx).await });
    }
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(report) => {
                debug!(category = %report.category, rows = report.len(), "report task finished");
                produced.insert(report.category, report);
            }
            Err(e) => error!("report task failed, its category is dropped: {}", e),
        }
    }

    for category in POST_JOIN {
        let report = CategoryGenerator(category).generate(&ctx).await;
        produced.insert(category, report);
    }

    let mut reports = Vec::with_capacity(produced.len());
    for category in ReportCategory::ALL {
        if let Some(report) = produced.remove(&category) {
            info!(category = %category, rows = report.len(), "report generated");
            reports.push(report);
        }
    }

    let stats = ctx.synth.stats();
    info!(
        remote = stats.remote,
        fallback = stats.fallback,
        remote_failures = stats.remote_failures,
        "field synthesis finished"
    );

    GenerationOutput {
        inventory: Arc::clone(&ctx.inventory),
        reports,
    }
}
