//! Completion Service Adapters.
//!
//! Implementations of the CompletionService port.
//!
//! ## Available Adapters
//!
//! - `MockCompletionService` - Configurable mock for testing
//! - `OpenAICompatibleService` - Any server speaking the OpenAI chat API
//!   (Ollama, llama.cpp, LM Studio, hosted endpoints)

mod mock_completion;
mod openai_compatible;

pub use mock_completion::{MockCompletionService, MockResponse};
pub use openai_compatible::{OpenAICompatibleConfig, OpenAICompatibleService};
