//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the conversation core to external systems:
//! - `ai` - Completion services (OpenAI-compatible HTTP, mock)
//! - `storage` - Artifact persistence (local filesystem)

pub mod ai;
pub mod storage;

pub use ai::{MockCompletionService, OpenAICompatibleConfig, OpenAICompatibleService};
pub use storage::LocalArtifactStore;
