// Copyright (c) 2025 - Cowboy AI, Inc.

//! Ollama Field Provider
//!
//! Talks to a local Ollama daemon through `/api/generate` with JSON mode
//! enabled and streaming disabled, so each entity is one request and one
//! response body.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::ProviderSettings;
use crate::errors::{SynthError, SynthResult};
use crate::synth::{FieldProvider, PromptRequest};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    system: &'a str,
    prompt: &'a str,
    format: &'static str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Local Ollama provider
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(settings: &ProviderSettings) -> SynthResult<Self> {
        if settings.ollama_url.trim().is_empty() {
            return Err(SynthError::ProviderUnavailable("OLLAMA_URL is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| {
                SynthError::ProviderUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: settings.ollama_url.trim_end_matches('/').to_string(),
            model: settings.ollama_model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

#[async_trait]
impl FieldProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &PromptRequest) -> SynthResult<String> {
        let prompt = request.user_prompt();
        let body = GenerateRequest {
            model: &self.model,
            system: PromptRequest::SYSTEM_PROMPT,
            prompt: &prompt,
            format: "json",
            stream: false,
        };

        let response = self.client.post(self.endpoint()).json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SynthError::Transport(format!(
                "ollama returned {}: {}",
                status,
                crate::synth::contract::excerpt(&text)
            )));
        }

        let parsed: GenerateResponse = response.json().await?;
        debug!(kind = %request.kind, model = %self.model, "ollama generation received");
        Ok(parsed.response)
    }
}
