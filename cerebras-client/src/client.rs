//! Reqwest-backed chat-completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{error_from_status, ClientError, Result};
use crate::TextCompletion;

/// Default completions endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.cerebras.ai/v1/chat/completions";

/// Default model served by the provider.
pub const DEFAULT_MODEL: &str = "llama3.3-70b";

const SYSTEM_PROMPT: &str = "You are a helpful assistant. Provide a direct, clear response \
without showing your thinking process. Respond directly without using <think> tags or \
showing internal reasoning.";

/// Connection settings for [`CerebrasClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Per-request deadline; exceeding it is a [`ClientError::Timeout`]
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            temperature: 0.7,
            max_tokens: 800,
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Client for the provider's chat-completions endpoint.
///
/// A client built without a credential fails every call with
/// [`ClientError::AuthenticationFailed`], which the pipeline treats as a
/// permanent provider failure and answers with its deterministic fallback.
pub struct CerebrasClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl CerebrasClient {
    pub fn new(config: ClientConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("failed to build reqwest client");
        Self { config, http }
    }

    /// Client reading the credential from `CEREBRAS_API_KEY`.
    pub fn from_env() -> Self {
        let config = ClientConfig {
            api_key: std::env::var("CEREBRAS_API_KEY")
                .ok()
                .filter(|key| !key.is_empty()),
            ..Default::default()
        };
        Self::new(config)
    }

    /// Client with an explicit credential (overrides the environment).
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        let config = ClientConfig {
            api_key: Some(api_key.into()),
            ..Default::default()
        };
        Self::new(config)
    }

    pub fn has_credential(&self) -> bool {
        self.config.api_key.is_some()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

#[async_trait]
impl TextCompletion for CerebrasClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            ClientError::AuthenticationFailed("CEREBRAS_API_KEY not configured".to_string())
        })?;

        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .http
            .post(&self.config.base_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout(self.config.timeout)
                } else {
                    ClientError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        if status != 200 {
            return Err(error_from_status(status, &text));
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ClientError::InvalidResponse("empty choices array".to_string()))
    }
}
