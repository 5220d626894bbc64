// Copyright (c) 2025 - Cowboy AI, Inc.
//! Field Synthesizer
//!
//! Fills the content attributes of an entity. Every call follows the same
//! path and always returns a usable map:
//!
//! ```text
//! synthesize(kind, ctx)
//!   ├── strategy Disabled ─────────────────────────────┐
//!   ├── provider does not support kind ────────────────┤
//!   └── remote attempt (once, no retry)                │
//!         prompt → complete → parse → coerce → rules   │
//!           ├── Ok  ──> field map                      │
//!           └── Err ──> warn! ─────────────────────────┤
//!                                                      v
//!                                   fallback::generate(kind, ctx, rng)
//! ```
//!
//! Errors never leave [`FieldSynthesizer::synthesize`]; they are logged and
//! absorbed here.

pub mod contract;
pub mod fallback;
pub mod fields;
pub mod provider;

pub use fields::{FieldMap, FieldValue};
pub use provider::{FieldProvider, MockProvider, PromptRequest, ProviderStrategy};

use rand::rngs::StdRng;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

use crate::config::ProviderSettings;
use crate::domain::EntityKind;
use crate::errors::{SynthError, SynthResult};

/// Hints and placement facts handed to the synthesizer
///
/// Serialized verbatim into provider prompts, so keys use the same names as
/// the contract fields where they overlap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthContext(Map<String, Value>);

impl SynthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Insert only when the hint is present
    pub fn with_opt<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(key, v),
            None => self,
        }
    }

    pub fn str(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(Value::as_str).map(str::to_string)
    }

    pub fn u64(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    pub fn f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    pub fn bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// String items of an array hint; absent or malformed yields empty
    pub fn str_list(&self, key: &str) -> Vec<String> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Counters for one run, logged by the pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SynthStats {
    pub remote: usize,
    pub fallback: usize,
    pub remote_failures: usize,
}

/// Dispatcher between the selected provider and the fallback generators
#[derive(Debug, Default)]
pub struct FieldSynthesizer {
    strategy: ProviderStrategy,
    remote: AtomicUsize,
    fallback: AtomicUsize,
    remote_failures: AtomicUsize,
}

impl FieldSynthesizer {
    pub fn new(strategy: ProviderStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Fallback-only synthesizer
    pub fn deterministic() -> Self {
        Self::new(ProviderStrategy::Disabled)
    }

    /// Resolve the provider named in `settings` once for the whole run
    pub fn from_settings(settings: &ProviderSettings) -> Self {
        Self::new(ProviderStrategy::resolve(settings))
    }

    pub fn strategy(&self) -> &ProviderStrategy {
        &self.strategy
    }

    pub fn stats(&self) -> SynthStats {
        SynthStats {
            remote: self.remote.load(Ordering::Relaxed),
            fallback: self.fallback.load(Ordering::Relaxed),
            remote_failures: self.remote_failures.load(Ordering::Relaxed),
        }
    }

    /// Content fields for one entity; never fails
    pub async fn synthesize(&self, kind: EntityKind, ctx: &SynthContext, rng: &mut StdRng) -> FieldMap {
        if let Some(provider) = self.strategy.provider() {
            if provider.supports(kind) {
                match self.try_remote(provider.as_ref(), kind, ctx).await {
                    Ok(map) => {
                        self.remote.fetch_add(1, Ordering::Relaxed);
                        return map;
                    }
                    Err(e) => {
                        self.remote_failures.fetch_add(1, Ordering::Relaxed);
                        warn!(
                            kind = %kind,
                            provider = provider.name(),
                            "remote synthesis failed, using fallback: {}",
                            e
                        );
                    }
                }
            } else {
                debug!(kind = %kind, "kind not served remotely");
            }
        }

        self.fallback.fetch_add(1, Ordering::Relaxed);
        fallback::generate(kind, ctx, rng)
    }

    async fn try_remote(
        &self,
        provider: &dyn FieldProvider,
        kind: EntityKind,
        ctx: &SynthContext,
    ) -> SynthResult<FieldMap> {
        let request = PromptRequest {
            kind,
            schema: contract::schema_description(kind),
            context: ctx.to_value(),
        };
        let raw = provider.complete(&request).await?;
        let value = contract::parse_response(kind, &raw)?;
        let mut map = contract::validate_and_coerce(kind, &value).map_err(|e| with_excerpt(e, &raw))?;
        contract::check_business_rules(kind, &mut map).map_err(|e| with_excerpt(e, &raw))?;
        Ok(map)
    }
}

/// Attach the raw response to a validation failure for diagnosis
fn with_excerpt(err: SynthError, raw: &str) -> SynthError {
    match err {
        SynthError::ProviderResponseInvalid { kind, reason } => SynthError::ProviderResponseInvalid {
            kind,
            reason: format!("{} (raw: {})", reason, contract::excerpt(raw)),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(9)
    }

    #[tokio::test]
    async fn test_disabled_uses_fallback() {
        let synth = FieldSynthesizer::deterministic();
        let map = synth.synthesize(EntityKind::Disk, &SynthContext::new(), &mut rng()).await;
        assert!(contract::satisfies_contract(EntityKind::Disk, &map));
        assert_eq!(synth.stats().fallback, 1);
        assert_eq!(synth.stats().remote, 0);
    }

    #[tokio::test]
    async fn test_valid_remote_answer_is_used() {
        let mock = Arc::new(MockProvider::plausible());
        let synth = FieldSynthesizer::new(ProviderStrategy::Active(mock.clone()));
        let map = synth.synthesize(EntityKind::Cluster, &SynthContext::new(), &mut rng()).await;
        assert_eq!(map.text("name").as_deref(), Some("mock"));
        assert_eq!(mock.calls(), 1);
        assert_eq!(synth.stats().remote, 1);
    }

    #[tokio::test]
    async fn test_malformed_remote_answer_falls_back() {
        let mock = Arc::new(MockProvider::always("not json at all"));
        let synth = FieldSynthesizer::new(ProviderStrategy::Active(mock.clone()));
        let map = synth.synthesize(EntityKind::Vm, &SynthContext::new(), &mut rng()).await;
        assert!(contract::satisfies_contract(EntityKind::Vm, &map));
        assert_eq!(synth.stats().remote_failures, 1);
    }

    #[tokio::test]
    async fn test_huge_host_topology_falls_back() {
        let mock = Arc::new(MockProvider::always(
            r#"{"name":"esx01","cluster":"c1","datacenter":"dc1","sockets":1e7,
                "cores_per_socket":1e7,"cpu_mhz":1e7,"memory_mib":262144,"esxi_version":"8.0.2"}"#,
        ));
        let synth = FieldSynthesizer::new(ProviderStrategy::Active(mock.clone()));
        let ctx = SynthContext::new().with("sockets", 10_000_000u64).with("cpu_mhz", u64::MAX);
        let map = synth.synthesize(EntityKind::Host, &ctx, &mut rng()).await;

        assert_eq!(mock.calls(), 1);
        assert_eq!(synth.stats().remote_failures, 1);
        assert_eq!(synth.stats().fallback, 1);
        assert!(contract::satisfies_contract(EntityKind::Host, &map));
        let sockets = map.uint("sockets").unwrap();
        let cores = map.uint("cores_per_socket").unwrap();
        let mhz = map.uint("cpu_mhz").unwrap();
        assert_eq!(sockets, u64::from(crate::domain::HostHardware::MAX_SOCKETS));
        assert_eq!(map.uint("cpu_mhz_total"), Some(sockets * cores * mhz));
    }

    #[tokio::test]
    async fn test_unsupported_kind_skips_provider() {
        let mock = Arc::new(MockProvider::plausible());
        let synth = FieldSynthesizer::new(ProviderStrategy::Active(mock.clone()));
        synth.synthesize(EntityKind::Snapshot, &SynthContext::new(), &mut rng()).await;
        synth.synthesize(EntityKind::Hba, &SynthContext::new(), &mut rng()).await;
        assert_eq!(mock.calls(), 0);
    }

    #[test]
    fn test_context_getters() {
        let ctx = SynthContext::new()
            .with("name", "web")
            .with("vcpu", 4)
            .with("ratio", 0.5)
            .with("os_hints", vec!["a", "b"])
            .with_opt::<u64>("missing", None);
        assert_eq!(ctx.str("name").as_deref(), Some("web"));
        assert_eq!(ctx.u64("vcpu"), Some(4));
        assert_eq!(ctx.f64("ratio"), Some(0.5));
        assert_eq!(ctx.str_list("os_hints"), vec!["a", "b"]);
        assert!(ctx.str("missing").is_none());
    }

    #[test]
    fn test_excerpt_attached_to_invalid() {
        let err = with_excerpt(SynthError::invalid(EntityKind::Nic, "bad"), "{\"x\":1}");
        assert!(err.to_string().contains("{\"x\":1}"));
    }
}
