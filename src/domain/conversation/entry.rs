//! Conversation entry entity.
//!
//! Entries are immutable records of what the user typed or what the
//! completion service answered. Assistant entries carry the extraction
//! result computed once at construction.

use crate::domain::foundation::{EntryId, Timestamp};
use serde::{Deserialize, Serialize};

use super::extractor::{CodeBlockExtractor, ExtractionResult};

/// An immutable entry in the conversation history.
///
/// # Invariants
///
/// - `id` is unique and assigned at construction
/// - `extraction` is `None` for user entries and for entries built with
///   extraction disabled
/// - nothing changes after construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    id: EntryId,
    text: String,
    is_from_user: bool,
    created_at: Timestamp,
    extraction: Option<ExtractionResult>,
}

impl ConversationEntry {
    /// Creates an entry, running extraction only for assistant entries with
    /// extraction enabled.
    pub fn new(text: impl Into<String>, is_from_user: bool, extraction_enabled: bool) -> Self {
        let text = text.into();
        let extraction = if is_from_user || !extraction_enabled {
            None
        } else {
            Some(CodeBlockExtractor::new().extract(&text))
        };

        Self {
            id: EntryId::new(),
            text,
            is_from_user,
            created_at: Timestamp::now(),
            extraction,
        }
    }

    /// Creates a user entry. Extraction is never computed.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, true, false)
    }

    /// Creates an assistant entry.
    pub fn assistant(text: impl Into<String>, extraction_enabled: bool) -> Self {
        Self::new(text, false, extraction_enabled)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Returns the entry ID.
    pub fn id(&self) -> &EntryId {
        &self.id
    }

    /// Returns the raw text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true if the user authored this entry.
    pub fn is_from_user(&self) -> bool {
        self.is_from_user
    }

    /// Returns when the entry was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns the memoized extraction, if it was computed.
    pub fn extraction(&self) -> Option<&ExtractionResult> {
        self.extraction.as_ref()
    }

    /// Returns true if extraction found a primary payload.
    pub fn has_structured_content(&self) -> bool {
        self.extraction
            .as_ref()
            .is_some_and(ExtractionResult::has_structured_content)
    }
}
