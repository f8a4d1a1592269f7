//! Media store port - abstraction over object storage backends.

use std::time::Duration;

use async_trait::async_trait;

/// Blob storage holding post and story media, addressed by storage-relative path.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Delete a blob. Deleting a blob that does not exist succeeds.
    async fn delete(&self, path: &str) -> Result<(), MediaError>;

    /// Tier transition support, if the backend has it.
    fn as_archive(&self) -> Option<&dyn ArchivalStore> {
        None
    }
}

/// Backends that can move a blob to the cold archive tier.
#[async_trait]
pub trait ArchivalStore: Send + Sync {
    /// Moves the blob in place. Content and path are unchanged.
    async fn move_to_archive(&self, path: &str) -> Result<(), MediaError>;
}

/// Media store errors.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Blob not found: {0}")]
    NotFound(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}
