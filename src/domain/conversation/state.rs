//! Conversation state owned by a single controller.
//!
//! All mutation goes through these methods; the controller holds the state
//! behind one lock so observers never see a partial update.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::entry::ConversationEntry;

/// Mutable state of one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    /// Entries in append order.
    history: Vec<ConversationEntry>,
    /// Text staged by the user but not yet sent.
    pending_input: String,
    /// Dispatches issued and not yet settled.
    in_flight: usize,
    /// Message from the most recent failed dispatch.
    last_error_message: Option<String>,
    /// Extracted block waiting to be saved.
    pending_artifact: Option<String>,
    /// Whether the front-end should offer to save `pending_artifact`.
    show_save_prompt: bool,
    /// A reply has been received since the last clear.
    booted: bool,
    /// Message from the most recent failed save.
    persistence_error_message: Option<String>,
    /// Whether the front-end should raise a save-failure alert.
    show_alert: bool,
    /// Location of the most recent successful save.
    last_saved_location: Option<PathBuf>,
}

impl ConversationState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn history(&self) -> &[ConversationEntry] {
        &self.history
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    /// True while any dispatch is outstanding.
    pub fn is_awaiting_reply(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn last_error_message(&self) -> Option<&str> {
        self.last_error_message.as_deref()
    }

    pub fn pending_artifact(&self) -> Option<&str> {
        self.pending_artifact.as_deref()
    }

    pub fn show_save_prompt(&self) -> bool {
        self.show_save_prompt
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    pub fn persistence_error_message(&self) -> Option<&str> {
        self.persistence_error_message.as_deref()
    }

    pub fn show_alert(&self) -> bool {
        self.show_alert
    }

    pub fn last_saved_location(&self) -> Option<&PathBuf> {
        self.last_saved_location.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    pub fn stage_input(&mut self, text: impl Into<String>) {
        self.pending_input = text.into();
    }

    /// Takes the trimmed staged input, leaving the buffer empty.
    ///
    /// Returns `None` (and leaves the buffer untouched) when the trimmed
    /// input is empty.
    pub fn take_pending_input(&mut self) -> Option<String> {
        let trimmed = self.pending_input.trim();
        if trimmed.is_empty() {
            return None;
        }
        let text = trimmed.to_string();
        self.pending_input.clear();
        Some(text)
    }

    pub fn append(&mut self, entry: ConversationEntry) {
        self.history.push(entry);
    }

    /// Records the start of a dispatch.
    pub fn begin_dispatch(&mut self) {
        self.in_flight += 1;
        self.last_error_message = None;
    }

    /// Records the settlement of a dispatch.
    pub fn end_dispatch(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn record_reply_received(&mut self) {
        self.booted = true;
    }

    pub fn record_dispatch_error(&mut self, message: impl Into<String>) {
        self.last_error_message = Some(message.into());
    }

    /// Offers `content` for saving.
    pub fn offer_artifact(&mut self, content: impl Into<String>) {
        self.pending_artifact = Some(content.into());
        self.show_save_prompt = true;
    }

    pub fn dismiss_save_prompt(&mut self) {
        self.show_save_prompt = false;
    }

    pub fn record_save_success(&mut self, location: PathBuf) {
        self.pending_artifact = None;
        self.show_save_prompt = false;
        self.persistence_error_message = None;
        self.show_alert = false;
        self.last_saved_location = Some(location);
    }

    pub fn record_save_failure(&mut self, message: impl Into<String>) {
        self.persistence_error_message = Some(message.into());
        self.show_alert = true;
    }

    pub fn dismiss_alert(&mut self) {
        self.show_alert = false;
    }

    /// Empties history and drops artifact state.
    ///
    /// In-flight dispatches keep counting; their replies will land in the
    /// fresh history.
    pub fn clear(&mut self) {
        self.history.clear();
        self.pending_artifact = None;
        self.show_save_prompt = false;
        self.booted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_idle_and_empty() {
        let state = ConversationState::new();

        assert!(state.history().is_empty());
        assert!(!state.is_awaiting_reply());
        assert!(!state.is_booted());
        assert!(state.pending_artifact().is_none());
    }

    #[test]
    fn take_pending_input_trims_and_clears() {
        let mut state = ConversationState::new();
        state.stage_input("  hello there \n");

        assert_eq!(state.take_pending_input().as_deref(), Some("hello there"));
        assert_eq!(state.pending_input(), "");
    }

    #[test]
    fn take_pending_input_ignores_whitespace_only() {
        let mut state = ConversationState::new();
        state.stage_input("   \n\t");

        assert_eq!(state.take_pending_input(), None);
        assert_eq!(state.pending_input(), "   \n\t");
    }

    #[test]
    fn awaiting_tracks_every_outstanding_dispatch() {
        let mut state = ConversationState::new();
        state.begin_dispatch();
        state.begin_dispatch();
        state.end_dispatch();
        assert!(state.is_awaiting_reply());
        state.end_dispatch();
        assert!(!state.is_awaiting_reply());
    }

    #[test]
    fn begin_dispatch_clears_last_error() {
        let mut state = ConversationState::new();
        state.record_dispatch_error("boom");
        state.begin_dispatch();
        assert_eq!(state.last_error_message(), None);
    }

    #[test]
    fn end_dispatch_never_underflows() {
        let mut state = ConversationState::new();
        state.end_dispatch();
        assert_eq!(state.in_flight(), 0);
    }

    #[test]
    fn save_success_clears_artifact_and_alert() {
        let mut state = ConversationState::new();
        state.offer_artifact("code");
        state.record_save_failure("disk full");
        state.record_save_success(PathBuf::from("/tmp/widget.js"));

        assert!(state.pending_artifact().is_none());
        assert!(!state.show_save_prompt());
        assert!(!state.show_alert());
        assert_eq!(state.persistence_error_message(), None);
        assert_eq!(
            state.last_saved_location(),
            Some(&PathBuf::from("/tmp/widget.js"))
        );
    }

    #[test]
    fn save_failure_keeps_artifact_for_retry() {
        let mut state = ConversationState::new();
        state.offer_artifact("code");
        state.record_save_failure("permission denied");

        assert_eq!(state.pending_artifact(), Some("code"));
        assert!(state.show_alert());
        state.dismiss_alert();
        assert!(!state.show_alert());
    }

    #[test]
    fn clear_resets_history_artifact_and_boot() {
        let mut state = ConversationState::new();
        state.append(ConversationEntry::user("hi"));
        state.offer_artifact("code");
        state.record_reply_received();
        state.stage_input("draft");

        state.clear();

        assert!(state.history().is_empty());
        assert!(state.pending_artifact().is_none());
        assert!(!state.show_save_prompt());
        assert!(!state.is_booted());
        assert_eq!(state.pending_input(), "draft");
    }
}
