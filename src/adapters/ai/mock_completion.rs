//! Mock completion service for testing.
//!
//! Provides a configurable implementation of the CompletionService port so
//! tests and demos can run without a model server.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in call order
//! - Per-response delays to control settlement order
//! - Error injection
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let service = MockCompletionService::new()
//!     .with_response("```javascript\nalert(1)\n```")
//!     .with_delay(Duration::from_millis(50));
//!
//! let reply = service.complete("make an alert").await?;
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{CompletionError, CompletionService};

/// Reply returned when the queue is exhausted.
const DEFAULT_REPLY: &str = "Mock response";

/// A configured mock outcome.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a successful completion.
    Success { content: String, delay: Duration },
    /// Return an error.
    Error {
        error: CompletionError,
        delay: Duration,
    },
}

impl MockResponse {
    fn delay(&self) -> Duration {
        match self {
            MockResponse::Success { delay, .. } | MockResponse::Error { delay, .. } => *delay,
        }
    }
}

/// Mock completion service.
#[derive(Debug, Clone)]
pub struct MockCompletionService {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Latency for responses queued without an explicit delay.
    delay: Duration,
    /// Prompts received, in call order.
    calls: Arc<Mutex<Vec<String>>>,
    /// Message of the most recent failure.
    last_error: Arc<Mutex<Option<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for MockCompletionService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCompletionService {
    /// Creates a mock with an empty queue and no latency.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            last_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Sets the latency applied to responses queued afterwards without an
    /// explicit delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues a successful reply.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        let delay = self.delay;
        self.with_delayed_response(content, delay)
    }

    /// Queues a successful reply that settles after `delay`.
    pub fn with_delayed_response(self, content: impl Into<String>, delay: Duration) -> Self {
        lock(&self.responses).push_back(MockResponse::Success {
            content: content.into(),
            delay,
        });
        self
    }

    /// Queues a failure.
    pub fn with_error(self, error: CompletionError) -> Self {
        let delay = self.delay;
        self.with_delayed_error(error, delay)
    }

    /// Queues a failure that settles after `delay`.
    pub fn with_delayed_error(self, error: CompletionError, delay: Duration) -> Self {
        lock(&self.responses).push_back(MockResponse::Error { error, delay });
        self
    }

    /// Returns the number of calls made.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all prompts received.
    pub fn get_calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    fn next_response(&self) -> MockResponse {
        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: DEFAULT_REPLY.to_string(),
                delay: self.delay,
            })
    }
}

#[async_trait]
impl CompletionService for MockCompletionService {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        lock(&self.calls).push(prompt.to_string());

        let response = self.next_response();
        let delay = response.delay();
        if !delay.is_zero() {
            sleep(delay).await;
        }

        match response {
            MockResponse::Success { content, .. } => Ok(content),
            MockResponse::Error { error, .. } => {
                *lock(&self.last_error) = Some(error.to_string());
                Err(error)
            }
        }
    }

    fn last_error(&self) -> Option<String> {
        lock(&self.last_error).clone()
    }
}
