//! Artifact Chat - Conversational code generation with artifact extraction
//!
//! Sends prompts to a text-completion service, keeps the conversation
//! history, pulls code blocks out of replies and offers generated scripts
//! for saving.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
