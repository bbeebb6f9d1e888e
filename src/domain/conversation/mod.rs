//! Conversation domain module.
//!
//! Holds the conversation entries, the reply extraction logic, prompt
//! decorations and the per-dispatch lifecycle.

mod entry;
mod extractor;
mod phase;
mod policy;
mod prompts;
mod state;

pub use entry::ConversationEntry;
pub use extractor::{
    CodeBlock, CodeBlockExtractor, ExtractionResult, ExtractionSource, END_MARKER,
    FALLBACK_TAGS, START_MARKER,
};
pub use phase::DispatchPhase;
pub use policy::{detect_script_artifact, reply_signals_generated_widget, WIDGET_PLACEHOLDER};
pub use prompts::{decorate_prompt, PromptStrategy, HTML_CSS_INSTRUCTION};
pub use state::ConversationState;
