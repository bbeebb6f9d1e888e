//! Artifact Persistence Port - Saving extracted content outside the app.
//!
//! The controller hands over the content plus naming hints. Implementations
//! decide the final location (remembered directory, suggested directory,
//! interactive chooser, ...) and report where the file ended up.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Port for saving generated artifacts.
///
/// # Contract
///
/// Implementations should:
/// - prefer the last successful location over `suggested_directory`
/// - never leave a partially written file behind on failure
/// - report user cancellation as [`PersistenceError::Cancelled`]
#[async_trait]
pub trait ArtifactPersistence: Send + Sync {
    /// Saves `content` and returns the final location.
    ///
    /// # Arguments
    ///
    /// * `content` - The artifact body
    /// * `suggested_name` - File stem, without extension
    /// * `extension` - File extension, without the leading dot
    /// * `suggested_directory` - Preferred directory when none is remembered
    async fn save(
        &self,
        content: &str,
        suggested_name: &str,
        extension: &str,
        suggested_directory: Option<&Path>,
    ) -> Result<PathBuf, PersistenceError>;
}

/// Save failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    /// The user dismissed the save dialog.
    #[error("save cancelled")]
    Cancelled,

    /// The suggested name cannot be turned into a file name.
    #[error("invalid file name: {0}")]
    InvalidName(String),

    /// Content exceeds the size limit.
    #[error("artifact too large: {size} bytes exceeds {max} bytes")]
    TooLarge {
        /// Content size.
        size: u64,
        /// Maximum allowed.
        max: u64,
    },

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl PersistenceError {
    /// Creates an I/O error.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io(message.into())
    }

    /// Returns true for user cancellation, which is not a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, PersistenceError::Cancelled)
    }
}
