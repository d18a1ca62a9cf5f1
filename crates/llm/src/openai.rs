//! OpenAI-compatible chat-completion backend.
//!
//! Sends role-tagged messages in order and returns the top completion. Rate
//! limits and API failures are logged and re-raised; the caller decides what
//! a failed completion means for its round.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use news_rag_config::ChatModelConfig;
use news_rag_core::{ChatModel, Message, Result};

use crate::LlmError;

/// Configuration for the chat backend.
#[derive(Debug, Clone)]
pub struct OpenAiChatConfig {
    /// API key (from OPENAI_API_KEY or direct).
    pub api_key: String,
    /// Model name, e.g. "gpt-4o".
    pub model: String,
    /// API endpoint (override for testing or proxies).
    pub endpoint: String,
    /// Per-call timeout.
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub max_tokens: Option<usize>,
}

impl Default for OpenAiChatConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            model: "gpt-4o".to_string(),
            endpoint: "https://api.openai.com".to_string(),
            timeout: Duration::from_secs(30),
            temperature: None,
            max_tokens: None,
        }
    }
}

impl OpenAiChatConfig {
    /// Build from the settings section, taking the key from the environment.
    pub fn from_settings(config: &ChatModelConfig) -> Self {
        Self {
            model: config.name.clone(),
            endpoint: config.endpoint.clone(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Chat backend speaking the `/v1/chat/completions` protocol.
pub struct OpenAiChatBackend {
    config: OpenAiChatConfig,
    client: Client,
}

impl OpenAiChatBackend {
    pub fn new(config: OpenAiChatConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LlmError::Configuration(
                "OPENAI_API_KEY not set; provide it via environment or config".to_string(),
            )
            .into());
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn request_completion(&self, messages: &[Message]) -> std::result::Result<String, LlmError> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.config.endpoint))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            tracing::warn!(model = %self.config.model, "chat completion rate limited");
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(model = %self.config.model, status = status.as_u16(), "chat completion failed");
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("response contained no choices".to_string()))
    }
}

#[async_trait]
impl ChatModel for OpenAiChatBackend {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        if messages.is_empty() {
            return Err(
                LlmError::InvalidResponse("cannot complete an empty message list".to_string())
                    .into(),
            );
        }
        let text = self.request_completion(messages).await?;
        tracing::debug!(
            model = %self.config.model,
            messages = messages.len(),
            response_chars = text.len(),
            "chat completion finished"
        );
        Ok(text)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_rejected() {
        let config = OpenAiChatConfig {
            api_key: String::new(),
            ..Default::default()
        };
        assert!(OpenAiChatBackend::new(config).is_err());
    }

    #[test]
    fn request_serializes_roles_in_order() {
        let messages = vec![
            Message::system("You are a news assistant."),
            Message::user("What happened today?"),
        ];
        let request = ChatCompletionRequest {
            model: "gpt-4o",
            messages: &messages,
            temperature: None,
            max_tokens: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn transient_classification() {
        use news_rag_core::Transient;

        assert!(LlmError::RateLimited.is_transient());
        assert!(LlmError::Timeout.is_transient());
        assert!(LlmError::Api {
            status: 503,
            message: String::new()
        }
        .is_transient());
        assert!(!LlmError::Api {
            status: 400,
            message: String::new()
        }
        .is_transient());
        assert!(!LlmError::Configuration("x".to_string()).is_transient());
    }
}
