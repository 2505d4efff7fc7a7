//! Azure OpenAI chat-completions client

use super::{RenderedPrompt, TextGenerator};
use crate::config::GenerationConfig;
use crate::error::{ErrorCode, OutreachError, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<Message<'a>>,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Chat-completions client for one Azure deployment
///
/// Each call makes one request. A rate-limited or failed request fails the
/// contact, which the runner counts and skips.
pub struct AzureOpenAiClient {
    client: Client,
    url: String,
    api_key: String,
}

impl AzureOpenAiClient {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| OutreachError::generation("Failed to create HTTP client").with_source(e))?;

        Ok(Self {
            client,
            url: completions_url(config),
            api_key: config.api_key.clone(),
        })
    }

    async fn make_request(&self, request: &ChatRequest<'_>) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .header("api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                OutreachError::generation_with_code(
                    ErrorCode::GENERATION_REQUEST_FAILED,
                    "Chat completion request failed",
                )
                .with_source(e)
            })?;

        match response.status() {
            StatusCode::OK => {
                let body: ChatResponse = response.json().await.map_err(|e| {
                    OutreachError::generation_with_code(
                        ErrorCode::GENERATION_REQUEST_FAILED,
                        "Failed to parse chat completion",
                    )
                    .with_source(e)
                })?;
                body.content().ok_or_else(|| {
                    OutreachError::generation_with_code(
                        ErrorCode::GENERATION_EMPTY_OUTPUT,
                        "Chat completion had no message content",
                    )
                })
            }
            StatusCode::TOO_MANY_REQUESTS => Err(OutreachError::generation_with_code(
                ErrorCode::GENERATION_RATE_LIMITED,
                "Rate limit exceeded",
            )),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(OutreachError::generation_with_code(
                    ErrorCode::GENERATION_UNAUTHORIZED,
                    "Invalid API key",
                ))
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                Err(OutreachError::generation_with_code(
                    ErrorCode::GENERATION_REQUEST_FAILED,
                    format!("API error {}: {}", status, error_text),
                ))
            }
        }
    }
}

/// Deployment URL for the chat-completions route
pub fn completions_url(config: &GenerationConfig) -> String {
    format!(
        "{}/openai/deployments/{}/chat/completions?api-version={}",
        config.endpoint.trim_end_matches('/'),
        config.deployment,
        config.api_version
    )
}

#[async_trait]
impl TextGenerator for AzureOpenAiClient {
    async fn generate(&self, prompt: &RenderedPrompt) -> Result<String> {
        let request = ChatRequest {
            messages: vec![
                Message {
                    role: "system",
                    content: &prompt.system,
                },
                Message {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let content = self.make_request(&request).await?;
        debug!("Chat completion returned {} chars", content.len());
        Ok(content)
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
    }
}
