//! Conversation behaviour switches

use serde::Deserialize;

use super::error::ConfigValidationError;

/// Controller behaviour configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Run code-block extraction on assistant replies
    #[serde(default = "default_true")]
    pub extraction_enabled: bool,

    /// Reject submits while a reply is outstanding
    #[serde(default = "default_true")]
    pub single_flight: bool,

    /// Fence tag requested by structured prompts
    #[serde(default = "default_structured_tag")]
    pub structured_tag: String,
}

impl ConversationConfig {
    /// Validate conversation configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let tag = self.structured_tag.as_str();
        if tag.is_empty() || !tag.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(ConfigValidationError::InvalidStructuredTag);
        }
        Ok(())
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            extraction_enabled: true,
            single_flight: true,
            structured_tag: default_structured_tag(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_structured_tag() -> String {
    "javascript".to_string()
}
