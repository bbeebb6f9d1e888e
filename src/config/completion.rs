//! Completion service configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ConfigValidationError;
use crate::adapters::ai::OpenAICompatibleConfig;

/// Completion endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token; local servers usually need none
    pub api_key: Option<Secret<String>>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries on transient failure
    #[serde(default = "default_retries")]
    pub max_retries: u32,

    /// System prompt sent ahead of every request
    pub system_prompt: Option<String>,
}

impl CompletionConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Builds the adapter configuration.
    pub fn to_service_config(&self) -> OpenAICompatibleConfig {
        use secrecy::ExposeSecret;

        let mut config = OpenAICompatibleConfig::new(&self.base_url, &self.model)
            .with_timeout(self.timeout())
            .with_max_retries(self.max_retries);

        if let Some(key) = self.api_key.as_ref().filter(|k| !k.expose_secret().is_empty()) {
            config = config.with_api_key(key.expose_secret().clone());
        }
        if let Some(prompt) = self.system_prompt.as_ref().filter(|p| !p.trim().is_empty()) {
            config = config.with_system_prompt(prompt.clone());
        }
        config
    }

    /// Validate completion configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigValidationError::InvalidBaseUrl);
        }
        if self.model.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired("COMPLETION__MODEL"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 600 {
            return Err(ConfigValidationError::InvalidTimeout);
        }
        if self.max_retries > 10 {
            return Err(ConfigValidationError::TooManyRetries);
        }
        Ok(())
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout(),
            max_retries: default_retries(),
            system_prompt: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_timeout() -> u64 {
    120
}

fn default_retries() -> u32 {
    2
}
