//! Artifact output configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ConfigValidationError;

/// Where and under which name saved artifacts go
#[derive(Debug, Clone, Deserialize)]
pub struct ArtifactsConfig {
    /// Default output directory
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Suggested file stem
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// File extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl ArtifactsConfig {
    /// Validate artifact configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.file_name.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired("ARTIFACTS__FILE_NAME"));
        }
        if self.file_name.contains('/') || self.file_name.contains('\\') {
            return Err(ConfigValidationError::InvalidFileName);
        }
        if !self.extension.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigValidationError::InvalidExtension);
        }
        Ok(())
    }
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            file_name: default_file_name(),
            extension: default_extension(),
        }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from("./artifacts")
}

fn default_file_name() -> String {
    "widget".to_string()
}

fn default_extension() -> String {
    "js".to_string()
}
