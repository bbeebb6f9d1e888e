//! Prompt decorations for structured replies.
//!
//! Each strategy wraps the caller's prompt in a fixed template asking the
//! completion service to answer inside a fenced block with a given tag.
//! The templates differ only in phrasing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Instruction appended to every base prompt before templating.
pub const HTML_CSS_INSTRUCTION: &str = "include the HTML followed by the CSS";

/// Phrasing used to request a structured reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptStrategy {
    /// Polite, general instruction.
    #[default]
    Standard,
    /// Terse imperative.
    Direct,
    /// Casts the model as a specialist.
    RoleBased,
    /// Leans on markdown conventions.
    MarkdownFriendly,
}

impl PromptStrategy {
    /// All strategies, in declaration order.
    pub const ALL: [PromptStrategy; 4] = [
        PromptStrategy::Standard,
        PromptStrategy::Direct,
        PromptStrategy::RoleBased,
        PromptStrategy::MarkdownFriendly,
    ];

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptStrategy::Standard => "standard",
            PromptStrategy::Direct => "direct",
            PromptStrategy::RoleBased => "role_based",
            PromptStrategy::MarkdownFriendly => "markdown_friendly",
        }
    }

    /// Wraps `prompt` in this strategy's template.
    pub fn render(&self, prompt: &str, content_tag: &str) -> String {
        match self {
            PromptStrategy::Standard => format!(
                "{prompt}\n\nPlease provide your complete answer inside a single fenced code block \
                 that starts with ```{content_tag} and ends with ```."
            ),
            PromptStrategy::Direct => format!(
                "{prompt}\n\nRespond only with a ```{content_tag} code block. No explanations."
            ),
            PromptStrategy::RoleBased => format!(
                "You are an expert front-end developer who always delivers working code.\n\n\
                 Task: {prompt}\n\nReturn the finished result in a ```{content_tag} fenced code block."
            ),
            PromptStrategy::MarkdownFriendly => format!(
                "{prompt}\n\nFormat your reply as markdown. Put the code in a fenced block \
                 tagged `{content_tag}`, like this:\n```{content_tag}\n...\n```"
            ),
        }
    }
}

impl fmt::Display for PromptStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PromptStrategy {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "" | "default" | "standard" => Ok(PromptStrategy::Standard),
            "direct" => Ok(PromptStrategy::Direct),
            "role_based" | "role" => Ok(PromptStrategy::RoleBased),
            "markdown_friendly" | "markdown" => Ok(PromptStrategy::MarkdownFriendly),
            other => Err(ValidationError::invalid_format(
                "strategy",
                format!("unknown prompt strategy '{}'", other),
            )),
        }
    }
}

/// Builds the prompt actually sent to the completion service.
///
/// The fixed HTML/CSS instruction is appended to `base_prompt` first, then
/// the result is wrapped in the strategy template.
pub fn decorate_prompt(base_prompt: &str, strategy: PromptStrategy, content_tag: &str) -> String {
    let instructed = format!("{} {}", base_prompt.trim_end(), HTML_CSS_INSTRUCTION);
    strategy.render(&instructed, content_tag)
}
