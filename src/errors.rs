// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for inventory synthesis
//!
//! The synthesizer and the topology builder absorb every variant here: they
//! log and fall back. The types exist so the fallback decision is made on a
//! value, and so tests can assert on the reason a remote attempt was rejected.

use thiserror::Error;

use crate::domain::EntityKind;

/// Errors raised while synthesizing fields or resolving topology references
#[derive(Debug, Error)]
pub enum SynthError {
    /// A referenced profile, cluster or host is missing from the scenario
    #[error("Configuration gap: {0}")]
    ConfigurationGap(String),

    /// The selected remote provider cannot be used (credentials, feature, endpoint)
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The remote provider answered with something that fails the field contract
    #[error("Invalid provider response for {kind}: {reason}")]
    ProviderResponseInvalid { kind: EntityKind, reason: String },

    /// No host or datastore could satisfy a placement; a placeholder was minted
    #[error("Resource gap: {0}")]
    ResourceGapFallback(String),

    /// Transport failure while talking to a remote provider
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SynthError {
    /// Shorthand for a rejected provider response
    pub fn invalid(kind: EntityKind, reason: impl Into<String>) -> Self {
        SynthError::ProviderResponseInvalid {
            kind,
            reason: reason.into(),
        }
    }
}

/// Result type for synthesis operations
pub type SynthResult<T> = Result<T, SynthError>;

impl From<serde_json::Error> for SynthError {
    fn from(err: serde_json::Error) -> Self {
        SynthError::Serialization(err.to_string())
    }
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for SynthError {
    fn from(err: reqwest::Error) -> Self {
        SynthError::Transport(err.to_string())
    }
}

/// Errors raised when a scenario tree cannot be turned into a [`crate::scenario::Scenario`]
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("Scenario does not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),

    #[error("Scenario YAML could not be parsed: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Scenario declares no datacenters")]
    Empty,
}

/// Errors raised by export sinks
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
