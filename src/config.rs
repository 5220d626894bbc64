// Copyright (c) 2025 - Cowboy AI, Inc.
//! Run configuration
//!
//! Complexity tiers bundle the defaults the builder and the fallback
//! generators fall back to. Provider settings are read from the environment;
//! a missing credential never fails the run, it only downgrades the provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Named bundle of density and randomization defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTier {
    Low,
    #[default]
    Medium,
    High,
}

impl ComplexityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Default parameters of the tier
    pub fn params(&self) -> TierParams {
        match self {
            Self::Low => TierParams {
                default_vcpu: 1,
                default_memory_mb: 2048,
                min_nics_per_vm: 1,
                max_nics_per_vm: 1,
                min_disks_per_vm: 1,
                max_disks_per_vm: 2,
                snapshot_likelihood: 0.05,
                advanced_feature_likelihood: 0.05,
                default_hosts_per_cluster: 2,
                vms_per_host: 8,
                default_vm_count: 20,
            },
            Self::Medium => TierParams {
                default_vcpu: 2,
                default_memory_mb: 4096,
                min_nics_per_vm: 1,
                max_nics_per_vm: 2,
                min_disks_per_vm: 1,
                max_disks_per_vm: 3,
                snapshot_likelihood: 0.2,
                advanced_feature_likelihood: 0.2,
                default_hosts_per_cluster: 4,
                vms_per_host: 12,
                default_vm_count: 100,
            },
            Self::High => TierParams {
                default_vcpu: 4,
                default_memory_mb: 8192,
                min_nics_per_vm: 1,
                max_nics_per_vm: 4,
                min_disks_per_vm: 2,
                max_disks_per_vm: 6,
                snapshot_likelihood: 0.4,
                advanced_feature_likelihood: 0.5,
                default_hosts_per_cluster: 8,
                vms_per_host: 20,
                default_vm_count: 500,
            },
        }
    }
}

impl fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComplexityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(format!("unknown complexity tier: {}", other)),
        }
    }
}

/// Flat parameter mapping of a complexity tier
///
/// Deserializable so a scenario or caller can override individual values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierParams {
    pub default_vcpu: u32,
    pub default_memory_mb: u64,
    pub min_nics_per_vm: u32,
    pub max_nics_per_vm: u32,
    pub min_disks_per_vm: u32,
    pub max_disks_per_vm: u32,
    /// Chance that a VM has snapshots
    pub snapshot_likelihood: f64,
    /// Chance that a VM enables hot-add, reservations and similar extras
    pub advanced_feature_likelihood: f64,
    pub default_hosts_per_cluster: u32,
    /// Target VM density used to size randomized topologies
    pub vms_per_host: u32,
    /// VM count for randomized runs when none is given
    pub default_vm_count: u32,
}

impl TierParams {
    /// Clamp inconsistent overrides into usable ranges
    pub fn normalized(mut self) -> Self {
        self.default_vcpu = self.default_vcpu.max(1);
        self.default_memory_mb = self.default_memory_mb.max(128);
        self.max_nics_per_vm = self.max_nics_per_vm.max(self.min_nics_per_vm);
        self.max_disks_per_vm = self.max_disks_per_vm.max(self.min_disks_per_vm);
        self.snapshot_likelihood = probability(self.snapshot_likelihood);
        self.advanced_feature_likelihood = probability(self.advanced_feature_likelihood);
        self.vms_per_host = self.vms_per_host.max(1);
        self
    }
}

/// Likelihood usable by `gen_bool`; NaN and infinities count as never
fn probability(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl Default for TierParams {
    fn default() -> Self {
        ComplexityTier::default().params()
    }
}

/// Provider strategy requested for the field synthesizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Deterministic fallback only
    #[default]
    Disabled,
    /// In-process scripted provider, for demos and failure injection
    Mock,
    /// OpenAI-compatible chat completions endpoint
    OpenAi,
    /// Local Ollama endpoint
    Ollama,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "disabled" | "none" | "deterministic" => Ok(Self::Disabled),
            "mock" => Ok(Self::Mock),
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

/// Connection settings for the remote providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub ollama_url: String,
    pub ollama_model: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

impl ProviderSettings {
    /// Settings with every endpoint at its default and no provider selected
    pub fn disabled() -> Self {
        Self {
            kind: ProviderKind::Disabled,
            openai_api_key: None,
            openai_base_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-4o-mini".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.1".to_string(),
            timeout_secs: default_timeout(),
        }
    }

    /// Load settings from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::disabled();
        let kind = std::env::var("INVENTORY_PROVIDER")
            .ok()
            .and_then(|s| match s.parse() {
                Ok(kind) => Some(kind),
                Err(e) => {
                    tracing::warn!("{}; using the deterministic generator", e);
                    None
                }
            })
            .unwrap_or_default();

        Self {
            kind,
            openai_api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            openai_base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.openai_base_url),
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            ollama_url: std::env::var("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            ollama_model: std::env::var("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            timeout_secs: std::env::var("INVENTORY_PROVIDER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }
}

/// Configuration of one generation run
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub seed: u64,
    pub tier: ComplexityTier,
    /// VM count for randomized mode; `None` uses the tier default
    pub vm_count: Option<u32>,
    pub scenario_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub provider: ProviderSettings,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tier: ComplexityTier::Medium,
            vm_count: None,
            scenario_path: None,
            output_dir: PathBuf::from("./inventory-out"),
            provider: ProviderSettings::disabled(),
        }
    }
}

impl SynthConfig {
    /// Load configuration from environment variables
    ///
    /// Unparseable values fall back to their defaults with a warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let seed = std::env::var("INVENTORY_SEED")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.seed);

        let tier = std::env::var("INVENTORY_TIER")
            .ok()
            .and_then(|s| match s.parse() {
                Ok(t) => Some(t),
                Err(e) => {
                    tracing::warn!("{}; using {}", e, defaults.tier);
                    None
                }
            })
            .unwrap_or(defaults.tier);

        Self {
            seed,
            tier,
            vm_count: std::env::var("INVENTORY_VM_COUNT")
                .ok()
                .and_then(|s| s.parse().ok()),
            scenario_path: std::env::var("INVENTORY_SCENARIO").ok().map(PathBuf::from),
            output_dir: std::env::var("INVENTORY_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            provider: ProviderSettings::from_env(),
        }
    }

    /// VM count for randomized mode
    pub fn target_vm_count(&self) -> u32 {
        self.vm_count.unwrap_or_else(|| self.tier.params().default_vm_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("low", ComplexityTier::Low)]
    #[test_case("MEDIUM", ComplexityTier::Medium)]
    #[test_case(" high ", ComplexityTier::High)]
    fn test_tier_parse(input: &str, expected: ComplexityTier) {
        assert_eq!(input.parse::<ComplexityTier>().unwrap(), expected);
    }

    #[test_case("", ProviderKind::Disabled)]
    #[test_case("deterministic", ProviderKind::Disabled)]
    #[test_case("mock", ProviderKind::Mock)]
    #[test_case("OpenAI", ProviderKind::OpenAi)]
    #[test_case("ollama", ProviderKind::Ollama)]
    fn test_provider_parse(input: &str, expected: ProviderKind) {
        assert_eq!(input.parse::<ProviderKind>().unwrap(), expected);
    }

    #[test]
    fn test_tier_params_are_ordered() {
        for tier in [ComplexityTier::Low, ComplexityTier::Medium, ComplexityTier::High] {
            let p = tier.params();
            assert!(p.min_nics_per_vm <= p.max_nics_per_vm);
            assert!(p.min_disks_per_vm <= p.max_disks_per_vm);
            assert!(p.vms_per_host > 0);
        }
    }

    #[test]
    fn test_normalized_repairs_overrides() {
        let p = TierParams {
            min_disks_per_vm: 4,
            max_disks_per_vm: 1,
            snapshot_likelihood: 3.0,
            vms_per_host: 0,
            ..TierParams::default()
        }
        .normalized();
        assert_eq!(p.max_disks_per_vm, 4);
        assert_eq!(p.snapshot_likelihood, 1.0);
        assert_eq!(p.vms_per_host, 1);
    }

    #[test_case(f64::NAN ; "nan")]
    #[test_case(f64::INFINITY ; "infinity")]
    #[test_case(f64::NEG_INFINITY ; "negative infinity")]
    fn test_normalized_non_finite_likelihood_is_zero(value: f64) {
        let p = TierParams {
            snapshot_likelihood: value,
            advanced_feature_likelihood: value,
            ..TierParams::default()
        }
        .normalized();
        assert_eq!(p.snapshot_likelihood, 0.0);
        assert_eq!(p.advanced_feature_likelihood, 0.0);
    }

    #[test]
    fn test_tier_params_deserialize() {
        let json = serde_json::to_value(ComplexityTier::High.params()).unwrap();
        let back: TierParams = serde_json::from_value(json).unwrap();
        assert_eq!(back, ComplexityTier::High.params());
    }
}
