//! Storage Adapters
//!
//! Implementations of the ArtifactPersistence port.
//!
//! - **LocalArtifactStore** - Writes artifacts to a local directory

mod local_artifact_store;

pub use local_artifact_store::{LocalArtifactStore, MAX_ARTIFACT_BYTES};
