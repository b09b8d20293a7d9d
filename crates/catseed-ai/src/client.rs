//! HTTP client for an OpenAI-compatible chat-completions API.
//!
//! Sends a single user message per call and asks for a JSON object back.
//! API-level failures are surfaced as [`AiError::Api`] with the status code
//! and the server's error message.

use std::time::Duration;

use catseed_core::{AppConfig, ConfigError};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::error::AiError;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Longest slice of an error body kept in [`AiError::Api`].
const ERROR_BODY_CHARS: usize = 300;

/// Connection and retry settings for [`OpenAiClient`].
#[derive(Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    /// Extra attempts after the first one.
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for OpenAiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiSettings")
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .finish()
    }
}

impl OpenAiSettings {
    /// Settings with the default endpoint, model and retry policy.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.2,
            timeout_secs: 60,
            max_retries: 3,
            retry_backoff_base_ms: 1_000,
        }
    }

    /// Builds settings from the application config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if no API key is configured.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: config.require_openai_api_key()?.to_string(),
            model: config.openai_model.clone(),
            base_url: config.openai_base_url.clone(),
            temperature: config.ai_temperature,
            timeout_secs: config.ai_request_timeout_secs,
            max_retries: config.ai_max_retries,
            retry_backoff_base_ms: config.ai_retry_backoff_base_ms,
        })
    }
}

/// Client for the chat-completions endpoint.
pub struct OpenAiClient {
    client: Client,
    endpoint: Url,
    api_key: String,
    model: String,
    temperature: f32,
    pub(crate) max_retries: u32,
    pub(crate) retry_backoff_base_ms: u64,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl OpenAiClient {
    /// Creates a client from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`AiError::InvalidBaseUrl`] if `base_url` does not
    /// parse.
    pub fn new(settings: &OpenAiSettings) -> Result<Self, AiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("catseed/0.1 (catalog-seeding)")
            .build()?;

        let endpoint = format!(
            "{}/chat/completions",
            settings.base_url.trim_end_matches('/')
        );
        let endpoint = Url::parse(&endpoint).map_err(|e| AiError::InvalidBaseUrl {
            url: settings.base_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            endpoint,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            temperature: settings.temperature,
            max_retries: settings.max_retries,
            retry_backoff_base_ms: settings.retry_backoff_base_ms,
        })
    }

    /// The model name sent with every request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends `prompt` as a single user message and returns the reply text.
    ///
    /// This makes exactly one request; retries live in the suggester.
    ///
    /// # Errors
    ///
    /// - [`AiError::Http`] on network failure.
    /// - [`AiError::Api`] if the API answers with a non-2xx status.
    /// - [`AiError::Deserialize`] if the completion envelope has the wrong shape.
    /// - [`AiError::EmptyResponse`] if there is no message content.
    pub async fn complete_json(&self, prompt: &str) -> Result<String, AiError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "requesting completion");

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AiError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| AiError::Deserialize {
                context: format!("chat completion ({})", self.model),
                source: e,
            })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(AiError::EmptyResponse)
    }
}

/// The server's `error.message` when present, otherwise the head of the body.
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => body.chars().take(ERROR_BODY_CHARS).collect(),
    }
}
