// OpenAI-compatible chat completions client

use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, TokenUsage};
use crate::types::Message;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Upper bound for a single completion round-trip
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// OpenAI client (HTTP direct, no SDK)
///
/// Works against any provider exposing `POST {base_url}/chat/completions`
/// with the OpenAI request/response shape.
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    /// Create new client with API key, default base URL and timeout
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_settings(api_key, OPENAI_API_BASE, DEFAULT_TIMEOUT)
    }

    /// Create client against a custom base URL with an explicit timeout
    pub fn with_settings(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build chat completion request payload
    fn build_chat_request(&self, model: &str, messages: &[Message], options: &ChatOptions) -> Value {
        let mut request = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": false,
        });

        if let Some(obj) = request.as_object_mut() {
            // o1 and gpt-5 families reject temperature and expect max_completion_tokens
            let is_reasoning_model = model.starts_with("o1") || model.starts_with("gpt-5");

            if let Some(temp) = options.temperature {
                if !is_reasoning_model {
                    obj.insert("temperature".to_string(), serde_json::json!(temp));
                }
            }
            if let Some(max_tokens) = options.max_tokens {
                let token_field = if is_reasoning_model {
                    "max_completion_tokens"
                } else {
                    "max_tokens"
                };
                obj.insert(token_field.to_string(), serde_json::json!(max_tokens));
            }
        }

        request
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_chat_request(&request.model, &request.messages, &request.options);

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("OpenAI API error ({}): {}", status, error_text);
        }

        let raw: OpenAIChatResponse = response
            .json()
            .await
            .context("Failed to parse response")?;

        let choice = raw.choices.into_iter().next();
        let usage = raw.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        tracing::debug!(
            model = %raw.model,
            total_tokens = usage.as_ref().map(|u| u.total_tokens).unwrap_or_default(),
            "Chat completion received"
        );

        Ok(ChatResponse {
            finish_reason: choice.as_ref().and_then(|c| c.finish_reason.clone()),
            content: choice.and_then(|c| c.message.content),
            usage,
        })
    }
}

// ============================================================================
// OPENAI-SPECIFIC RESPONSE TYPES
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
struct OpenAIChatResponse {
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Choice {
    pub message: ResponseMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ResponseMessage {
    pub role: String,
    pub content: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
