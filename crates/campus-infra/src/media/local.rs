//! Local filesystem media store, used in development. It has no storage tiers.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use campus_core::ports::{MediaError, MediaStore};

#[derive(Debug, Clone)]
pub struct LocalMediaStore {
    base_path: PathBuf,
}

impl LocalMediaStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolves a blob path under the base directory, refusing anything that could escape it.
    fn full_path(&self, path: &str) -> Result<PathBuf, MediaError> {
        let relative = Path::new(path.trim_start_matches('/'));
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || relative.as_os_str().is_empty() {
            return Err(MediaError::Backend(format!("invalid media path: {path}")));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn delete(&self, path: &str) -> Result<(), MediaError> {
        let full = self.full_path(path)?;
        match fs::remove_file(&full).await {
            Ok(()) => {
                tracing::debug!(path = %full.display(), "Deleted local blob");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediaError::Backend(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("campus-media-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn test_delete_existing_and_missing() {
        let dir = temp_dir();
        fs::create_dir_all(dir.join("posts")).await.unwrap();
        fs::write(dir.join("posts/a.jpg"), b"jpeg").await.unwrap();

        let store = LocalMediaStore::new(&dir);
        store.delete("posts/a.jpg").await.unwrap();
        assert!(!dir.join("posts/a.jpg").exists());

        // Already gone is still success.
        store.delete("posts/a.jpg").await.unwrap();

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let store = LocalMediaStore::new(temp_dir());
        assert!(store.delete("../etc/passwd").await.is_err());
    }

    #[test]
    fn test_no_archive_support() {
        assert!(LocalMediaStore::new(temp_dir()).as_archive().is_none());
    }
}
