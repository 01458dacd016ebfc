// Completion service client (Anthropic Messages API)
//
// One prompt in, raw text out. No history, no streaming, no retries.

use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ClaudeConfig, ConfigError};

const CLAUDE_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1000;

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{kind} - {message}")]
    Upstream {
        status: u16,
        kind: String,
        message: String,
    },
    #[error("Unexpected API response structure")]
    MalformedResponse,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

pub struct CompletionClient {
    client: Client,
    api_key: String,
    api_url: String,
    model: String,
}

impl CompletionClient {
    /// Fails with a `ConfigError` when no API key is configured.
    pub fn from_config(client: Client, config: &ClaudeConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            client,
            api_key: config.api_key()?.to_string(),
            api_url: config.api_url.clone(),
            model: config.model.clone(),
        })
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = ClaudeRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.api_url)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", CLAUDE_VERSION)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let envelope: ErrorEnvelope = serde_json::from_str(&body).unwrap_or_default();
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                kind: envelope.error.kind.unwrap_or_else(|| "UnknownError".to_string()),
                message: envelope
                    .error
                    .message
                    .unwrap_or_else(|| "Unknown error occurred".to_string()),
            });
        }

        let body = response.text().await?;
        let parsed: ClaudeResponse =
            serde_json::from_str(&body).map_err(|_| CompletionError::MalformedResponse)?;

        let text = parsed
            .content
            .into_iter()
            .filter(|block| block.block_type == "text")
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(CompletionError::MalformedResponse);
        }
        Ok(text)
    }
}
