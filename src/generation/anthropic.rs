use super::{GenerationRequest, TextGenerator};
use crate::config::GenerationConfig;
use crate::error::{GenerationError, PermanentKind, TransientKind};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info};

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Messages API adapter.
pub struct AnthropicGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    api_version: String,
    timeout: Duration,
}

impl AnthropicGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let api_key = config
            .resolved_api_key()
            .context("No API key configured (set generation.api_key or ANTHROPIC_API_KEY)")?;
        let timeout = Duration::from_secs(config.timeout_seconds);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        info!(
            "Initialized generation client for model {} at {}",
            config.model, config.endpoint
        );

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
            api_version: config.api_version.clone(),
            timeout,
        })
    }

    fn classify_status(status: StatusCode, body: &str) -> GenerationError {
        let message = format!("status {}: {}", status.as_u16(), body);
        match status.as_u16() {
            429 => GenerationError::transient(TransientKind::RateLimited, message),
            408 | 504 => GenerationError::transient(TransientKind::Timeout, message),
            401 | 403 => GenerationError::permanent(PermanentKind::Auth, message),
            529 => GenerationError::transient(TransientKind::Unavailable, message),
            code if code >= 500 => GenerationError::transient(TransientKind::Unavailable, message),
            _ => GenerationError::permanent(PermanentKind::InvalidInput, message),
        }
    }

    fn classify_transport(&self, err: reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::transient(
                TransientKind::Timeout,
                format!("no response within {}s", self.timeout.as_secs()),
            )
        } else {
            GenerationError::transient(TransientKind::Network, err.to_string())
        }
    }

    fn extract_text(response: MessagesResponse) -> Result<String, GenerationError> {
        let text: String = response
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.trim().is_empty() {
            return Err(GenerationError::permanent(
                PermanentKind::MalformedResponse,
                "response contained no text content",
            ));
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn generate(&self, request: GenerationRequest) -> Result<String, GenerationError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: &request.instruction,
            messages: vec![Message {
                role: "user",
                content: &request.message,
            }],
        };

        debug!(
            "Sending generation request ({} instruction bytes, {} message bytes)",
            request.instruction.len(),
            request.message.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let text = match response.text().await {
                Ok(text) => text,
                Err(e) => {
                    debug!("Failed to read error body for status {}: {}", status, e);
                    String::new()
                }
            };
            error!("Generation request failed with status {}: {}", status, text);
            return Err(Self::classify_status(status, &text));
        }

        let parsed: MessagesResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.classify_transport(e)
            } else {
                GenerationError::permanent(PermanentKind::MalformedResponse, e.to_string())
            }
        })?;

        Self::extract_text(parsed)
    }
}
