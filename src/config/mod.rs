//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `ARTIFACT_CHAT`
//! prefix and nested values are separated by double underscores. Every
//! value has a default, so an empty environment yields a working setup
//! against a local model server.
//!
//! # Example
//!
//! ```no_run
//! use artifact_chat::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Using model {}", config.completion.model);
//! ```

mod artifacts;
mod completion;
mod conversation;
mod error;

pub use artifacts::ArtifactsConfig;
pub use completion::CompletionConfig;
pub use conversation::ConversationConfig;
pub use error::{ConfigError, ConfigValidationError};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Completion endpoint (URL, model, credentials)
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Artifact output location
    #[serde(default)]
    pub artifacts: ArtifactsConfig,

    /// Conversation behaviour
    #[serde(default)]
    pub conversation: ConversationConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ARTIFACT_CHAT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `ARTIFACT_CHAT__COMPLETION__MODEL=qwen2.5` -> `completion.model`
    /// - `ARTIFACT_CHAT__ARTIFACTS__DIRECTORY=/tmp/out` -> `artifacts.directory`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ARTIFACT_CHAT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` for the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        self.completion.validate()?;
        self.artifacts.validate()?;
        self.conversation.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::PathBuf;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "ARTIFACT_CHAT__COMPLETION__MODEL",
        "ARTIFACT_CHAT__COMPLETION__BASE_URL",
        "ARTIFACT_CHAT__COMPLETION__TIMEOUT_SECS",
        "ARTIFACT_CHAT__ARTIFACTS__DIRECTORY",
        "ARTIFACT_CHAT__CONVERSATION__SINGLE_FLIGHT",
    ];

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.completion.model, "llama3.2");
        assert_eq!(config.artifacts.file_name, "widget");
        assert!(config.conversation.single_flight);
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("ARTIFACT_CHAT__COMPLETION__MODEL", "qwen2.5-coder");
        env::set_var("ARTIFACT_CHAT__COMPLETION__BASE_URL", "http://127.0.0.1:8080/v1");
        env::set_var("ARTIFACT_CHAT__COMPLETION__TIMEOUT_SECS", "45");
        env::set_var("ARTIFACT_CHAT__ARTIFACTS__DIRECTORY", "/tmp/widgets");
        env::set_var("ARTIFACT_CHAT__CONVERSATION__SINGLE_FLIGHT", "false");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.completion.model, "qwen2.5-coder");
        assert_eq!(config.completion.base_url, "http://127.0.0.1:8080/v1");
        assert_eq!(config.completion.timeout_secs, 45);
        assert_eq!(config.artifacts.directory, PathBuf::from("/tmp/widgets"));
        assert!(!config.conversation.single_flight);
    }

    #[test]
    fn test_validate_defaults() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_reports_first_bad_section() {
        let mut config = AppConfig::default();
        config.completion.base_url = "ftp://nope".to_string();
        config.artifacts.extension = "j/s".to_string();

        assert_eq!(config.validate(), Err(ConfigValidationError::InvalidBaseUrl));
    }

    #[test]
    fn test_validation_error_converts_to_config_error() {
        let err: ConfigError = ConfigValidationError::InvalidTimeout.into();
        assert!(err.to_string().starts_with("Validation failed"));
    }
}
