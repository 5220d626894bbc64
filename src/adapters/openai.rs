// Copyright (c) 2025 - Cowboy AI, Inc.

//! OpenAI-compatible Field Provider
//!
//! Sends one chat-completions request per entity and returns the assistant
//! message text. Any endpoint that speaks the `/chat/completions` dialect
//! works (OpenAI itself, vLLM, LiteLLM, Azure gateways behind a proxy).
//!
//! ```text
//! POST {base_url}/chat/completions
//! Authorization: Bearer <OPENAI_API_KEY>
//! { model, messages: [system, user], response_format: { type: json_object } }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::ProviderSettings;
use crate::errors::{SynthError, SynthResult};
use crate::synth::{FieldProvider, PromptRequest};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatAnswer,
}

#[derive(Debug, Deserialize)]
struct ChatAnswer {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions backed provider
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    /// Build the provider; a missing API key makes it unavailable
    pub fn new(settings: &ProviderSettings) -> SynthResult<Self> {
        let key = settings
            .openai_api_key
            .as_deref()
            .ok_or_else(|| SynthError::ProviderUnavailable("OPENAI_API_KEY is not set".to_string()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    "Authorization",
                    format!("Bearer {}", key).parse().map_err(|e| {
                        SynthError::ProviderUnavailable(format!("Invalid API key: {}", e))
                    })?,
                );
                headers.insert(
                    "Content-Type",
                    "application/json".parse().map_err(|e| {
                        SynthError::ProviderUnavailable(format!("Invalid header: {}", e))
                    })?,
                );
                headers
            })
            .build()
            .map_err(|e| {
                SynthError::ProviderUnavailable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: settings.openai_base_url.trim_end_matches('/').to_string(),
            model: settings.openai_model.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

#[async_trait]
impl FieldProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &PromptRequest) -> SynthResult<String> {
        let user = request.user_prompt();
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: PromptRequest::SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user,
                },
            ],
            response_format: ResponseFormat { kind: "json_object" },
            temperature: 0.7,
        };

        let response = self.client.post(self.endpoint()).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SynthError::Transport(format!(
                "chat completions returned {}: {}",
                status,
                crate::synth::contract::excerpt(&text)
            )));
        }

        let parsed: ChatResponse = response.json().await?;
        debug!(kind = %request.kind, model = %self.model, "chat completion received");
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| SynthError::invalid(request.kind, "completion has no message content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;

    fn settings(key: Option<&str>) -> ProviderSettings {
        ProviderSettings {
            kind: ProviderKind::OpenAi,
            openai_api_key: key.map(str::to_string),
            openai_base_url: "http://localhost:8000/v1/".to_string(),
            ..ProviderSettings::disabled()
        }
    }

    #[test]
    fn test_missing_key_is_unavailable() {
        let err = OpenAiProvider::new(&settings(None)).unwrap_err();
        assert!(matches!(err, SynthError::ProviderUnavailable(_)));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = OpenAiProvider::new(&settings(Some("sk-test"))).unwrap();
        assert_eq!(provider.endpoint(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"{\"name\":\"x\"}"}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("{\"name\":\"x\"}"));
    }
}
