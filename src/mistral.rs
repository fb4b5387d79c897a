//! Mistral API Client
//!
//! Chat-completions client used as the coach's text generator.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::feedback::{GenerationRequest, TextGenerator};

/// Mistral API client
#[derive(Clone)]
pub struct MistralClient {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

/// Message in conversation
#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

/// API request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
}

/// API response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

impl MistralClient {
    pub fn new(api_key: Option<&str>, api_url: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.map(|s| s.to_string()),
            api_url: api_url.to_string(),
            model: model.to_string(),
        }
    }

    /// Create from config
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(config.api_key.as_deref(), &config.api_url, &config.model)
    }
}

#[async_trait]
impl TextGenerator for MistralClient {
    fn name(&self) -> &str {
        "mistral"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_ref().ok_or(GenerationError::MissingApiKey)?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                Message { role: "system", content: &request.system },
                Message { role: "user", content: &request.user },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!("Calling Mistral API: model={}, context_len={}", self.model, request.system.len());

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, body });
        }

        let result: ChatResponse = response.json().await?;

        if let Some(usage) = &result.usage {
            info!(
                "Mistral response: model={}, in={}, out={}",
                self.model, usage.prompt_tokens, usage.completion_tokens
            );
        }

        extract_text(result)
    }
}

/// First choice's content, or `EmptyResponse`
fn extract_text(response: ChatResponse) -> Result<String, GenerationError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(GenerationError::EmptyResponse)
}
