// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provider Strategy
//!
//! A provider turns a prompt into raw text; it knows nothing about field
//! contracts. The strategy is chosen once per run by [`ProviderStrategy::resolve`],
//! which also performs the availability check, so a missing credential or a
//! build without the `remote` feature is reported once and never per call.
//!
//! ```text
//! ProviderKind ──resolve()──> ProviderStrategy
//!                                ├── Disabled
//!                                └── Active(Arc<dyn FieldProvider>)
//!                                      ├── MockProvider
//!                                      ├── OpenAiProvider   (feature "remote")
//!                                      └── OllamaProvider   (feature "remote")
//! ```

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{ProviderKind, ProviderSettings};
use crate::domain::EntityKind;
use crate::errors::{SynthError, SynthResult};

use super::contract;

/// Provider-agnostic request for one entity's fields
#[derive(Debug, Clone, Serialize)]
pub struct PromptRequest {
    pub kind: EntityKind,
    /// JSON schema-ish description of the expected object
    pub schema: Value,
    /// Profile hints and placement facts
    pub context: Value,
}

impl PromptRequest {
    /// System instruction shared by every chat-style provider
    pub const SYSTEM_PROMPT: &'static str = "You generate realistic but fictitious \
        virtualization inventory records. Answer with a single JSON object and nothing else.";

    /// User message rendered from the schema and context
    pub fn user_prompt(&self) -> String {
        format!(
            "Generate {} as JSON.\nSchema: {}\nContext: {}",
            self.kind.description(),
            self.schema,
            self.context
        )
    }
}

/// A source of raw structured text for a prompt
///
/// Implementations make exactly one attempt per call; the synthesizer never
/// retries.
#[async_trait]
pub trait FieldProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Whether this provider should be asked for `kind` at all
    fn supports(&self, kind: EntityKind) -> bool {
        contract::supports_remote(kind)
    }

    /// Ask the provider once and return its raw answer
    async fn complete(&self, request: &PromptRequest) -> SynthResult<String>;
}

/// Provider selection, fixed for the whole run
#[derive(Clone, Default)]
pub enum ProviderStrategy {
    /// Deterministic fallback only
    #[default]
    Disabled,
    /// Ask this provider first, fall back on any failure
    Active(Arc<dyn FieldProvider>),
}

impl std::fmt::Debug for ProviderStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Active(p) => write!(f, "Active({})", p.name()),
        }
    }
}

impl ProviderStrategy {
    /// Wrap an already-built provider
    pub fn active(provider: impl FieldProvider + 'static) -> Self {
        Self::Active(Arc::new(provider))
    }

    /// Choose and availability-check the provider named in `settings`
    ///
    /// Never fails: every unavailable provider downgrades to `Disabled` after
    /// a single warning.
    pub fn resolve(settings: &ProviderSettings) -> Self {
        match Self::try_resolve(settings) {
            Ok(strategy) => {
                if let Self::Active(p) = &strategy {
                    info!(provider = p.name(), "remote field provider enabled");
                }
                strategy
            }
            Err(e) => {
                warn!("{}; using the deterministic generator for this run", e);
                Self::Disabled
            }
        }
    }

    fn try_resolve(settings: &ProviderSettings) -> SynthResult<Self> {
        match settings.kind {
            ProviderKind::Disabled => Ok(Self::Disabled),
            ProviderKind::Mock => Ok(Self::active(MockProvider::plausible())),
            ProviderKind::OpenAi => Self::resolve_openai(settings),
            ProviderKind::Ollama => Self::resolve_ollama(settings),
        }
    }

    #[cfg(feature = "remote")]
    fn resolve_openai(settings: &ProviderSettings) -> SynthResult<Self> {
        let provider = crate::adapters::OpenAiProvider::new(settings)?;
        Ok(Self::active(provider))
    }

    #[cfg(not(feature = "remote"))]
    fn resolve_openai(_settings: &ProviderSettings) -> SynthResult<Self> {
        Err(SynthError::ProviderUnavailable(
            "openai provider requires the 'remote' feature".to_string(),
        ))
    }

    #[cfg(feature = "remote")]
    fn resolve_ollama(settings: &ProviderSettings) -> SynthResult<Self> {
        let provider = crate::adapters::OllamaProvider::new(settings)?;
        Ok(Self::active(provider))
    }

    #[cfg(not(feature = "remote"))]
    fn resolve_ollama(_settings: &ProviderSettings) -> SynthResult<Self> {
        Err(SynthError::ProviderUnavailable(
            "ollama provider requires the 'remote' feature".to_string(),
        ))
    }

    pub fn provider(&self) -> Option<&Arc<dyn FieldProvider>> {
        match self {
            Self::Disabled => None,
            Self::Active(p) => Some(p),
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

/// Scripted in-process provider
///
/// Answers from a per-kind table of canned responses; kinds without an entry
/// get the default answer. Used for demos and for failure injection.
#[derive(Debug, Default)]
pub struct MockProvider {
    responses: HashMap<EntityKind, String>,
    default_response: Option<String>,
    fail_with: Option<String>,
    calls: AtomicUsize,
}

impl MockProvider {
    /// Provider that returns `raw` for every kind
    pub fn always(raw: impl Into<String>) -> Self {
        Self {
            default_response: Some(raw.into()),
            ..Self::default()
        }
    }

    /// Provider whose every call fails with a transport error
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::default()
        }
    }

    /// Canned answer for one kind
    pub fn with_response(mut self, kind: EntityKind, raw: impl Into<String>) -> Self {
        self.responses.insert(kind, raw.into());
        self
    }

    /// Provider answering with plausible, contract-satisfying objects
    ///
    /// Content is identical for every call; structural fields are overwritten
    /// by the caller anyway.
    pub fn plausible() -> Self {
        let answers = [
            (
                EntityKind::Vm,
                serde_json::json!({
                    "name": "mock-vm", "power_state": "poweredOn",
                    "os": "Rocky Linux 9 (64-bit)", "provisioned_mib": 61_440,
                    "in_use_mib": 20_480,
                    "dns_name": "mock-vm.synth.local", "annotation": "mock provider"
                }),
            ),
            (
                EntityKind::Host,
                serde_json::json!({
                    "name": "mock-host", "cluster": "mock", "datacenter": "mock",
                    "sockets": 2, "cores_per_socket": 24, "cpu_mhz": 2800,
                    "memory_mib": 786_432, "esxi_version": "VMware ESXi 8.0.3",
                    "vendor": "Lenovo", "model": "ThinkSystem SR650 V3",
                    "cpu_model": "Intel(R) Xeon(R) Gold 6442Y"
                }),
            ),
            (
                EntityKind::Cluster,
                serde_json::json!({ "name": "mock", "ha_enabled": true, "drs_enabled": true }),
            ),
            (
                EntityKind::Datastore,
                serde_json::json!({
                    "name": "mock-ds", "type": "VMFS",
                    "capacity_mib": 2_097_152, "accessible": true
                }),
            ),
            (
                EntityKind::Disk,
                serde_json::json!({ "label": "Hard disk", "capacity_mib": 51_200, "thin": true }),
            ),
            (
                EntityKind::Nic,
                serde_json::json!({
                    "label": "Network adapter", "adapter_type": "vmxnet3",
                    "mac_address": "00:50:56:3e:00:01", "connected": true
                }),
            ),
        ];

        let mut provider = Self::default();
        for (kind, value) in answers {
            provider.responses.insert(kind, value.to_string());
        }
        provider
    }

    /// Number of calls received so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FieldProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &PromptRequest) -> SynthResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = &self.fail_with {
            return Err(SynthError::Transport(msg.clone()));
        }
        self.responses
            .get(&request.kind)
            .or(self.default_response.as_ref())
            .cloned()
            .ok_or_else(|| SynthError::invalid(request.kind, "mock has no response for this kind"))
    }
}
