//! Domain layer containing the conversation model and extraction logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors, state machines)
//! - `conversation` - Entries, extraction, prompt templates and conversation state

pub mod conversation;
pub mod foundation;
