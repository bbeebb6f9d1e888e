//! Conversation controller.
//!
//! Owns the conversation state, sends prompts to the completion service and
//! runs the post-reply policies (artifact detection, widget heuristic).
//! Front-ends observe it by polling [`ConversationController::snapshot`] or
//! by subscribing to [`ConversationEvent`]s.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::ConversationConfig;
use crate::domain::conversation::{
    decorate_prompt, detect_script_artifact, reply_signals_generated_widget, ConversationEntry,
    ConversationState, DispatchPhase, PromptStrategy, WIDGET_PLACEHOLDER,
};
use crate::domain::foundation::StateMachine;
use crate::ports::{ArtifactPersistence, CompletionError, CompletionService, PersistenceError};

/// Entry text used when a failure carries no message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to get a response from the model";

/// Controller API misuse.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversationError {
    /// A reply is still outstanding and single-flight is enforced.
    #[error("a reply is still pending")]
    ReplyPending,

    /// Save requested without an artifact to save.
    #[error("no artifact is waiting to be saved")]
    NoPendingArtifact,
}

/// Change notifications published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationEvent {
    /// An entry was appended to the history.
    EntryAppended { entry: ConversationEntry },
    /// The awaiting-reply flag flipped.
    AwaitingChanged { awaiting: bool },
    /// An artifact is ready to be saved.
    ArtifactReady { content: String },
    /// The pending artifact was saved.
    SaveCompleted { location: PathBuf },
    /// Saving failed; the alert is raised.
    SaveFailed { message: String },
    /// History was cleared.
    Cleared,
}

/// Outcome of [`ConversationController::save_pending_artifact`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved(PathBuf),
    Cancelled,
    Failed(String),
}

/// Controller behaviour switches.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Run extraction on assistant entries.
    pub extraction_enabled: bool,
    /// Reject submits while a reply is outstanding.
    pub single_flight: bool,
    /// Directory hint passed to the persistence collaborator.
    pub suggested_directory: Option<PathBuf>,
    /// Capacity of the event channel.
    pub event_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            extraction_enabled: true,
            single_flight: true,
            suggested_directory: None,
            event_capacity: 128,
        }
    }
}

impl ControllerConfig {
    /// Sets the directory hint passed to the persistence collaborator.
    pub fn with_suggested_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.suggested_directory = Some(directory.into());
        self
    }
}

impl From<&ConversationConfig> for ControllerConfig {
    fn from(config: &ConversationConfig) -> Self {
        Self {
            extraction_enabled: config.extraction_enabled,
            single_flight: config.single_flight,
            ..Default::default()
        }
    }
}

struct Inner {
    completion: Arc<dyn CompletionService>,
    persistence: Arc<dyn ArtifactPersistence>,
    config: ControllerConfig,
    state: Mutex<ConversationState>,
    events: broadcast::Sender<ConversationEvent>,
}

/// Handle to a conversation.
///
/// Clones share the same state. All mutation goes through one mutex which
/// is never held across an `.await`.
#[derive(Clone)]
pub struct ConversationController {
    inner: Arc<Inner>,
}

impl ConversationController {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        persistence: Arc<dyn ArtifactPersistence>,
        config: ControllerConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                completion,
                persistence,
                config,
                state: Mutex::new(ConversationState::new()),
                events,
            }),
        }
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> ConversationState {
        self.state().clone()
    }

    /// Subscribes to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<ConversationEvent> {
        self.inner.events.subscribe()
    }

    /// Replaces the staged input.
    pub fn stage_input(&self, text: impl Into<String>) {
        self.state().stage_input(text);
    }

    /// Sends the staged input.
    ///
    /// Returns `Ok(None)` without doing anything when the trimmed input is
    /// empty. Otherwise appends the user entry, clears the buffer, waits for
    /// the reply and returns the settled phase.
    ///
    /// # Errors
    ///
    /// [`ConversationError::ReplyPending`] when single-flight is enforced
    /// and a reply is outstanding. State is left untouched.
    pub async fn submit_pending_input(&self) -> Result<Option<DispatchPhase>, ConversationError> {
        let (prompt, events) = {
            let mut state = self.state();
            if state.pending_input().trim().is_empty() {
                return Ok(None);
            }
            self.check_single_flight(&state)?;

            let Some(text) = state.take_pending_input() else {
                return Ok(None);
            };
            let events = self.record_user_entry(&mut state, ConversationEntry::user(&text));
            (text, events)
        };
        self.publish(events);

        Ok(Some(self.dispatch(prompt).await))
    }

    /// Runs [`submit_pending_input`](Self::submit_pending_input) on a
    /// background task.
    pub fn spawn_submit(&self) -> JoinHandle<Result<Option<DispatchPhase>, ConversationError>> {
        let controller = self.clone();
        tokio::spawn(async move { controller.submit_pending_input().await })
    }

    /// Asks for a fenced block tagged `content_tag`.
    ///
    /// The visible user entry is `base_prompt` as given; the service
    /// receives the decorated prompt.
    pub async fn request_structured_reply(
        &self,
        base_prompt: &str,
        strategy: PromptStrategy,
        content_tag: &str,
    ) -> Result<DispatchPhase, ConversationError> {
        let prompt = decorate_prompt(base_prompt, strategy, content_tag);

        let events = {
            let mut state = self.state();
            self.check_single_flight(&state)?;
            self.record_user_entry(&mut state, ConversationEntry::user(base_prompt))
        };
        self.publish(events);

        tracing::debug!(strategy = %strategy, tag = content_tag, "requesting structured reply");
        Ok(self.dispatch(prompt).await)
    }

    /// Empties the history and drops any pending artifact.
    pub fn clear_conversation(&self) {
        self.state().clear();
        tracing::info!("conversation cleared");
        self.publish(vec![ConversationEvent::Cleared]);
    }

    /// Hands the pending artifact to the persistence collaborator.
    ///
    /// Failures raise the alert and are reported as
    /// [`SaveOutcome::Failed`]; cancellation changes nothing.
    ///
    /// # Errors
    ///
    /// [`ConversationError::NoPendingArtifact`] when nothing is pending.
    pub async fn save_pending_artifact(
        &self,
        suggested_name: &str,
        extension: &str,
    ) -> Result<SaveOutcome, ConversationError> {
        let content = self
            .state()
            .pending_artifact()
            .map(str::to_string)
            .ok_or(ConversationError::NoPendingArtifact)?;

        let result = self
            .inner
            .persistence
            .save(
                &content,
                suggested_name,
                extension,
                self.inner.config.suggested_directory.as_deref(),
            )
            .await;

        let outcome = match result {
            Ok(location) => {
                tracing::info!(path = %location.display(), "artifact saved");
                self.state().record_save_success(location.clone());
                self.publish(vec![ConversationEvent::SaveCompleted {
                    location: location.clone(),
                }]);
                SaveOutcome::Saved(location)
            }
            Err(PersistenceError::Cancelled) => {
                tracing::debug!("artifact save cancelled");
                SaveOutcome::Cancelled
            }
            Err(err) => {
                let message = err.to_string();
                tracing::warn!(error = %message, "artifact save failed");
                self.state().record_save_failure(message.clone());
                self.publish(vec![ConversationEvent::SaveFailed {
                    message: message.clone(),
                }]);
                SaveOutcome::Failed(message)
            }
        };
        Ok(outcome)
    }

    pub fn dismiss_save_prompt(&self) {
        self.state().dismiss_save_prompt();
    }

    pub fn dismiss_alert(&self) {
        self.state().dismiss_alert();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Settles a dispatch already counted by `record_user_entry`.
    ///
    /// The exchange runs on its own task, so dropping the caller's future
    /// does not leave the dispatch counted forever.
    async fn dispatch(&self, prompt: String) -> DispatchPhase {
        let controller = self.clone();
        let task = tokio::spawn(async move { controller.run_exchange(prompt).await });

        match task.await {
            Ok(settled) => settled,
            Err(err) => {
                // The task panicked before settling.
                tracing::error!(error = %err, "dispatch task failed");
                let events = self.settle(|state| apply_failure(state, GENERIC_FAILURE_MESSAGE));
                self.publish(events);
                DispatchPhase::AppendedFailure
            }
        }
    }

    async fn run_exchange(&self, prompt: String) -> DispatchPhase {
        let phase = advance(DispatchPhase::Idle, DispatchPhase::Awaiting);
        tracing::debug!(prompt_len = prompt.len(), "awaiting completion");

        let result = self.inner.completion.complete(&prompt).await;

        let (settled, events) = match result {
            Ok(reply) => {
                let events = self.settle(|state| self.apply_reply(state, &reply));
                (advance(phase, DispatchPhase::AppendedSuccess), events)
            }
            Err(err) => {
                let message = failure_message(&err, self.inner.completion.last_error());
                tracing::warn!(error = %message, "completion failed");
                let events = self.settle(|state| apply_failure(state, &message));
                (advance(phase, DispatchPhase::AppendedFailure), events)
            }
        };
        self.publish(events);

        advance(settled, DispatchPhase::Idle);
        settled
    }

    /// Applies the outcome and ends the dispatch in one critical section.
    fn settle<F>(&self, apply: F) -> Vec<ConversationEvent>
    where
        F: FnOnce(&mut ConversationState) -> Vec<ConversationEvent>,
    {
        let mut state = self.state();
        let mut events = apply(&mut state);
        state.end_dispatch();
        if !state.is_awaiting_reply() {
            events.push(ConversationEvent::AwaitingChanged { awaiting: false });
        }
        events
    }

    fn apply_reply(&self, state: &mut ConversationState, reply: &str) -> Vec<ConversationEvent> {
        let mut events = Vec::new();

        let entry = ConversationEntry::assistant(reply, self.inner.config.extraction_enabled);
        state.append(entry.clone());
        state.record_reply_received();
        events.push(ConversationEvent::EntryAppended { entry });

        let artifact = detect_script_artifact(reply);
        if let Some(ref block) = artifact {
            tracing::info!(tag = %block.language_tag, bytes = block.content.len(), "script artifact detected");
            state.offer_artifact(block.content.clone());
            events.push(ConversationEvent::ArtifactReady {
                content: block.content.clone(),
            });
        }

        // A detected script takes precedence over the widget placeholder.
        if reply_signals_generated_widget(reply) && artifact.is_none() {
            tracing::info!("reply reports a generated widget");
            state.offer_artifact(WIDGET_PLACEHOLDER);
            events.push(ConversationEvent::ArtifactReady {
                content: WIDGET_PLACEHOLDER.to_string(),
            });
        }

        events
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn state(&self) -> MutexGuard<'_, ConversationState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_single_flight(&self, state: &ConversationState) -> Result<(), ConversationError> {
        if self.inner.config.single_flight && state.is_awaiting_reply() {
            tracing::debug!("submit rejected, reply pending");
            return Err(ConversationError::ReplyPending);
        }
        Ok(())
    }

    /// Appends the user entry and counts the dispatch it starts.
    fn record_user_entry(
        &self,
        state: &mut ConversationState,
        entry: ConversationEntry,
    ) -> Vec<ConversationEvent> {
        let was_awaiting = state.is_awaiting_reply();
        state.append(entry.clone());
        state.begin_dispatch();

        let mut events = vec![ConversationEvent::EntryAppended { entry }];
        if !was_awaiting {
            events.push(ConversationEvent::AwaitingChanged { awaiting: true });
        }
        events
    }

    fn publish(&self, events: Vec<ConversationEvent>) {
        for event in events {
            // No subscribers is fine
            let _ = self.inner.events.send(event);
        }
    }
}

fn apply_failure(state: &mut ConversationState, message: &str) -> Vec<ConversationEvent> {
    let entry = ConversationEntry::assistant(format!("Error: {}", message), false);
    state.append(entry.clone());
    state.record_dispatch_error(message);
    vec![ConversationEvent::EntryAppended { entry }]
}

/// Picks the message embedded in the failure entry.
///
/// The error's own message wins, then the service's remembered error, then
/// [`GENERIC_FAILURE_MESSAGE`].
fn failure_message(error: &CompletionError, last_error: Option<String>) -> String {
    pick_failure_message(&error.to_string(), last_error)
}

fn pick_failure_message(error_message: &str, last_error: Option<String>) -> String {
    if !error_message.trim().is_empty() {
        return error_message.to_string();
    }
    last_error
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
}

/// Moves the dispatch phase along an edge that is valid by construction.
fn advance(phase: DispatchPhase, target: DispatchPhase) -> DispatchPhase {
    phase.transition_to(target).unwrap_or_else(|err| {
        tracing::error!(?phase, ?target, error = %err, "invalid dispatch transition");
        target
    })
}
