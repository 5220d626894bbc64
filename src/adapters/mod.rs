// Copyright (c) 2025 - Cowboy AI, Inc.

//! Remote field providers
//!
//! HTTP-backed implementations of the `FieldProvider` trait. Both are
//! compiled only with the `remote` feature; without it, selecting them
//! resolves to the deterministic generator.

pub mod ollama;
pub mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
