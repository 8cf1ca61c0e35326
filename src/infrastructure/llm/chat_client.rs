//! OpenAI-compatible chat completions client

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::core::{LlmConfig, env_secret};
use crate::generation::{ConversationMessage, SecretValue};

/// Errors from the chat completions endpoint
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited by the model provider")]
    RateLimited,

    #[error("Authentication with the model provider failed")]
    AuthFailed,

    #[error("Model returned no content")]
    EmptyResponse,

    #[error("Environment variable {0} is not set")]
    MissingApiKey(String),
}

#[derive(Debug, Clone, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Clone, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
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

/// Settings for a single completion call
#[derive(Debug, Clone, Copy)]
pub struct CompletionOptions<'a> {
    pub model: &'a str,
    pub temperature: f32,
    /// Ask the provider for a JSON object response
    pub json_response: bool,
}

/// Chat completions over any OpenAI-compatible API
pub struct ChatCompletionClient {
    client: Client,
    api_key: SecretValue,
    api_base: String,
}

impl ChatCompletionClient {
    pub fn new(
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key: SecretValue::new(api_key),
            api_base: api_base.into(),
        })
    }

    /// Build from the `[llm]` section; the API key must be present in its env var
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = env_secret(&config.api_key_env)
            .ok_or_else(|| LlmError::MissingApiKey(config.api_key_env.clone()))?;
        Self::new(
            config.base_url.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    /// Send the conversation and return the first choice's content
    #[instrument(skip(self, messages), fields(model = %options.model))]
    pub async fn complete(
        &self,
        messages: &[ConversationMessage],
        options: CompletionOptions<'_>,
    ) -> Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: options.model,
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
            temperature: options.temperature,
            response_format: options
                .json_response
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        debug!(messages = messages.len(), "Sending chat completion request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_base.trim_end_matches('/')))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(LlmError::RateLimited);
            }
            if status.as_u16() == 401 {
                return Err(LlmError::AuthFailed);
            }

            return Err(LlmError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)
    }
}
