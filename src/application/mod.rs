//! Application layer - Orchestration of the conversation core.
//!
//! The controller coordinates the completion and persistence ports around
//! the conversation domain.

pub mod controller;

pub use controller::{
    ControllerConfig, ConversationController, ConversationError, ConversationEvent, SaveOutcome,
    GENERIC_FAILURE_MESSAGE,
};
