use crate::config::CompletionConfig;
use crate::domain::model::{ChatTurn, CompletionRequest};
use crate::domain::ports::Completion;
use crate::utils::error::{RelayError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Serialize)]
struct MessagesBody<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: &'a [ChatTurn],
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

/// Client for an Anthropic-style `/v1/messages` endpoint.
pub struct CompletionClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl CompletionClient {
    pub fn from_config(config: &CompletionConfig) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            timeout: config.timeout,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Text blocks joined by newlines; other block types are skipped.
fn collect_text(response: MessagesResponse) -> String {
    response
        .content
        .into_iter()
        .filter(|block| block.kind == "text")
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Completion for CompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or(RelayError::NotConfigured {
            setting: "ZAI_API_KEY",
        })?;

        let body = MessagesBody {
            model: &self.model,
            max_tokens: self.max_tokens,
            messages: &request.messages,
            system: request.system.as_deref(),
        };

        tracing::debug!(
            "Requesting completion from {} ({} messages, timeout {:?})",
            self.model,
            request.messages.len(),
            self.timeout
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::ApiError {
                service: "AI",
                status,
                body,
            });
        }

        let parsed: MessagesResponse = response.json().await?;
        Ok(collect_text(parsed))
    }
}
