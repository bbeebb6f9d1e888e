//! Local Artifact Store - Filesystem implementation of ArtifactPersistence.
//!
//! Writes artifacts into a directory on disk. The directory of the last
//! successful save is remembered and preferred over any suggestion, the
//! way a native save dialog reopens where the user left it.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::ports::{ArtifactPersistence, PersistenceError};

/// Maximum artifact size allowed (5 MB).
pub const MAX_ARTIFACT_BYTES: u64 = 5 * 1024 * 1024;

/// Filesystem store for generated artifacts.
///
/// # Directory choice
///
/// 1. Directory of the last successful save
/// 2. `suggested_directory` passed by the caller
/// 3. The default directory given at construction
///
/// # Atomic Writes
///
/// Content is written to `{name}.{ext}.tmp`, synced, then renamed over
/// the final path. An existing file with the same name is replaced.
#[derive(Debug)]
pub struct LocalArtifactStore {
    default_directory: PathBuf,
    last_directory: Mutex<Option<PathBuf>>,
}

impl LocalArtifactStore {
    /// Creates a store that falls back to `default_directory`.
    pub fn new(default_directory: impl Into<PathBuf>) -> Self {
        Self {
            default_directory: default_directory.into(),
            last_directory: Mutex::new(None),
        }
    }

    /// Directory of the last successful save, if any.
    pub fn last_directory(&self) -> Option<PathBuf> {
        self.last_directory
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn choose_directory(&self, suggested: Option<&Path>) -> PathBuf {
        self.last_directory()
            .or_else(|| suggested.map(Path::to_path_buf))
            .unwrap_or_else(|| self.default_directory.clone())
    }

    fn remember(&self, directory: PathBuf) {
        *self
            .last_directory
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(directory);
    }
}

/// Builds `{stem}.{ext}` from caller hints, keeping only safe characters.
fn file_name(suggested_name: &str, extension: &str) -> Result<String, PersistenceError> {
    let stem = sanitize(suggested_name);
    if stem.is_empty() {
        return Err(PersistenceError::InvalidName(suggested_name.to_string()));
    }

    let extension = sanitize(extension.trim_start_matches('.'));
    if extension.is_empty() {
        Ok(stem)
    } else {
        Ok(format!("{}.{}", stem, extension))
    }
}

fn sanitize(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    // Leading dots would produce hidden files or `..`
    cleaned.trim_start_matches('.').to_string()
}

#[async_trait]
impl ArtifactPersistence for LocalArtifactStore {
    async fn save(
        &self,
        content: &str,
        suggested_name: &str,
        extension: &str,
        suggested_directory: Option<&Path>,
    ) -> Result<PathBuf, PersistenceError> {
        let size = content.len() as u64;
        if size > MAX_ARTIFACT_BYTES {
            return Err(PersistenceError::TooLarge {
                size,
                max: MAX_ARTIFACT_BYTES,
            });
        }

        let name = file_name(suggested_name, extension)?;
        let directory = self.choose_directory(suggested_directory);

        fs::create_dir_all(&directory).await.map_err(|e| {
            PersistenceError::io(format!(
                "Failed to create directory {}: {}",
                directory.display(),
                e
            ))
        })?;

        let final_path = directory.join(&name);
        let temp_path = directory.join(format!("{}.tmp", name));

        if let Err(err) = write_synced(&temp_path, content).await {
            // Best effort; the temp file may not exist.
            let _ = fs::remove_file(&temp_path).await;
            return Err(err);
        }

        fs::rename(&temp_path, &final_path).await.map_err(|e| {
            PersistenceError::io(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                final_path.display(),
                e
            ))
        })?;

        tracing::debug!(path = %final_path.display(), bytes = size, "artifact written");
        self.remember(directory);
        Ok(final_path)
    }
}

async fn write_synced(path: &Path, content: &str) -> Result<(), PersistenceError> {
    let mut file = fs::File::create(path).await.map_err(|e| {
        PersistenceError::io(format!("Failed to create {}: {}", path.display(), e))
    })?;

    file.write_all(content.as_bytes()).await.map_err(|e| {
        PersistenceError::io(format!("Failed to write {}: {}", path.display(), e))
    })?;

    file.sync_all()
        .await
        .map_err(|e| PersistenceError::io(format!("Failed to sync {}: {}", path.display(), e)))
}
