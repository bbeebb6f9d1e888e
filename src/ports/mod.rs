//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the conversation core and the outside world. Adapters implement these
//! ports.
//!
//! - `CompletionService` - Sends a prompt, returns the reply
//! - `ArtifactPersistence` - Saves extracted content and reports where

mod artifact_persistence;
mod completion_service;

pub use artifact_persistence::{ArtifactPersistence, PersistenceError};
pub use completion_service::{CompletionError, CompletionService};
