//! OpenAI-compatible completion service.
//!
//! Talks to any server exposing `POST {base_url}/chat/completions` with the
//! OpenAI request/response shape. Local model servers (Ollama, llama.cpp,
//! LM Studio) speak this protocol, so the same adapter covers on-device and
//! hosted models.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAICompatibleConfig::new("http://localhost:11434/v1", "llama3.2")
//!     .with_timeout(Duration::from_secs(60));
//!
//! let service = OpenAICompatibleService::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{CompletionError, CompletionService};

/// Retry-after used when the server does not say.
const DEFAULT_RETRY_AFTER_SECS: u32 = 30;

/// Configuration for the OpenAI-compatible service.
#[derive(Debug, Clone)]
pub struct OpenAICompatibleConfig {
    /// Bearer token, if the server requires one.
    api_key: Option<Secret<String>>,
    /// Model identifier.
    pub model: String,
    /// Base URL, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Optional system prompt sent before every user prompt.
    pub system_prompt: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
}

impl OpenAICompatibleConfig {
    /// Creates a configuration for `model` served at `base_url`.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: None,
            model: model.into(),
            base_url: base_url.into(),
            system_prompt: None,
            timeout: Duration::from_secs(120),
            max_retries: 2,
        }
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(Secret::new(api_key.into()));
        self
    }

    /// Sets the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum retry count.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key.as_ref().map(|key| key.expose_secret().as_str())
    }
}

/// Completion service backed by an OpenAI-compatible HTTP endpoint.
pub struct OpenAICompatibleService {
    config: OpenAICompatibleConfig,
    client: Client,
    last_error: Mutex<Option<String>>,
}

impl OpenAICompatibleService {
    /// Creates the service, building the HTTP client.
    pub fn new(config: OpenAICompatibleConfig) -> Result<Self, CompletionError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CompletionError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            client,
            last_error: Mutex::new(None),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn to_request(&self, prompt: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref system) = self.config.system_prompt {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        });

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            stream: false,
        }
    }

    async fn send_request(&self, prompt: &str) -> Result<Response, CompletionError> {
        let mut builder = self
            .client
            .post(self.completions_url())
            .header("Content-Type", "application/json")
            .json(&self.to_request(prompt));

        if let Some(key) = self.config.api_key() {
            builder = builder.header("Authorization", format!("Bearer {}", key));
        }

        builder.send().await.map_err(|e| {
            if e.is_timeout() {
                CompletionError::Timeout {
                    timeout_secs: self.config.timeout.as_secs() as u32,
                }
            } else if e.is_connect() {
                CompletionError::network(format!("Connection failed: {}", e))
            } else {
                CompletionError::network(e.to_string())
            }
        })
    }

    async fn read_reply(&self, response: Response) -> Result<String, CompletionError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CompletionError::network(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(error_for_status(status.as_u16(), body));
        }

        parse_reply_body(&body)
    }

    async fn attempt(&self, prompt: &str) -> Result<String, CompletionError> {
        let response = self.send_request(prompt).await?;
        self.read_reply(response).await
    }

    fn remember_error(&self, error: &CompletionError) {
        let mut last = self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *last = Some(error.to_string());
    }
}

#[async_trait]
impl CompletionService for OpenAICompatibleService {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let mut retry_count = 0;

        loop {
            match self.attempt(prompt).await {
                Ok(reply) => return Ok(reply),
                Err(err) => {
                    if !err.is_retryable() || retry_count >= self.config.max_retries {
                        tracing::warn!(model = %self.config.model, error = %err, "completion failed");
                        self.remember_error(&err);
                        return Err(err);
                    }
                    tracing::debug!(attempt = retry_count + 1, error = %err, "retrying completion");
                }
            }

            // Exponential backoff: 1s, 2s, 4s, ...
            sleep(Duration::from_secs(1 << retry_count)).await;
            retry_count += 1;
        }
    }

    fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Maps a non-success HTTP status to a completion error.
fn error_for_status(status: u16, body: String) -> CompletionError {
    match status {
        401 | 403 => CompletionError::AuthenticationFailed,
        429 => CompletionError::rate_limited(parse_retry_after(&body)),
        400 | 404 | 422 => CompletionError::InvalidRequest(body),
        500..=599 => CompletionError::unavailable(format!("Server error {}: {}", status, body)),
        _ => CompletionError::network(format!("Unexpected status {}: {}", status, body)),
    }
}

/// Parses "try again in Xs" from an error body.
fn parse_retry_after(body: &str) -> u32 {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.get("message")?.as_str().map(str::to_string));

    message
        .as_deref()
        .and_then(|s| s.find("try again in ").map(|idx| &s[idx + 13..]))
        .and_then(|rest| {
            let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        })
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

/// Extracts the first choice's content from a success body.
fn parse_reply_body(body: &str) -> Result<String, CompletionError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| CompletionError::parse(format!("Failed to parse response: {}", e)))?;

    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| CompletionError::parse("No choices in response"))?;

    if content.trim().is_empty() {
        return Err(CompletionError::EmptyResponse);
    }
    Ok(content)
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
