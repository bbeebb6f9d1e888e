//! Completion Service Port - Interface for text-completion backends.
//!
//! The controller sends one prompt and waits for one reply. Backends may be a
//! local model server, a hosted API, or a test double.
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl CompletionService for Echo {
//!     async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
//!         Ok(prompt.to_string())
//!     }
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

/// Port for single-shot text completion.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends `prompt` and waits for the full reply.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;

    /// Message of the most recent failure, for services that keep one.
    fn last_error(&self) -> Option<String> {
        None
    }
}

/// Completion failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CompletionError {
    /// Rate limited by the backend.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Backend is down or overloaded.
    #[error("service unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse the backend response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Backend rejected the request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },

    /// Backend answered without any content.
    #[error("the model returned an empty response")]
    EmptyResponse,
}

impl CompletionError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CompletionError::RateLimited { .. }
                | CompletionError::Unavailable { .. }
                | CompletionError::Network(_)
                | CompletionError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(CompletionError::rate_limited(5).is_retryable());
        assert!(CompletionError::unavailable("down").is_retryable());
        assert!(CompletionError::network("reset").is_retryable());
        assert!(CompletionError::Timeout { timeout_secs: 30 }.is_retryable());
    }

    #[test]
    fn non_retryable_errors() {
        assert!(!CompletionError::AuthenticationFailed.is_retryable());
        assert!(!CompletionError::parse("bad json").is_retryable());
        assert!(!CompletionError::InvalidRequest("too long".into()).is_retryable());
        assert!(!CompletionError::EmptyResponse.is_retryable());
    }

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(
            CompletionError::unavailable("model not loaded").to_string(),
            "service unavailable: model not loaded"
        );
        assert_eq!(
            CompletionError::Timeout { timeout_secs: 120 }.to_string(),
            "request timed out after 120s"
        );
    }

    struct Silent;

    #[async_trait]
    impl CompletionService for Silent {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            Err(CompletionError::EmptyResponse)
        }
    }

    #[tokio::test]
    async fn last_error_defaults_to_none() {
        let service = Silent;
        assert!(service.complete("hi").await.is_err());
        assert_eq!(service.last_error(), None);
    }
}
