//! In-memory media store with failure injection.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use campus_core::domain::StorageClass;
use campus_core::ports::{ArchivalStore, MediaError, MediaStore};

/// Blobs are tracked by path together with their current storage tier.
pub struct InMemoryMediaStore {
    blobs: RwLock<HashMap<String, StorageClass>>,
    failing: RwLock<HashSet<String>>,
    hanging: RwLock<HashSet<String>>,
    archival: bool,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
            hanging: RwLock::new(HashSet::new()),
            archival: true,
        }
    }

    /// A store that behaves like a backend with a single tier.
    pub fn without_archival() -> Self {
        Self {
            archival: false,
            ..Self::new()
        }
    }

    pub async fn put(&self, path: impl Into<String>) {
        self.blobs
            .write()
            .await
            .insert(path.into(), StorageClass::Standard);
    }

    /// Every operation on `path` fails with a backend error.
    pub async fn fail_on(&self, path: impl Into<String>) {
        self.failing.write().await.insert(path.into());
    }

    /// Every operation on `path` never completes.
    pub async fn hang_on(&self, path: impl Into<String>) {
        self.hanging.write().await.insert(path.into());
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.blobs.read().await.contains_key(path)
    }

    pub async fn storage_class(&self, path: &str) -> Option<StorageClass> {
        self.blobs.read().await.get(path).copied()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }

    async fn check(&self, path: &str) -> Result<(), MediaError> {
        if self.hanging.read().await.contains(path) {
            std::future::pending::<()>().await;
        }
        if self.failing.read().await.contains(path) {
            return Err(MediaError::Backend(format!("injected failure for {path}")));
        }
        Ok(())
    }
}

impl Default for InMemoryMediaStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn delete(&self, path: &str) -> Result<(), MediaError> {
        self.check(path).await?;
        self.blobs.write().await.remove(path);
        Ok(())
    }

    fn as_archive(&self) -> Option<&dyn ArchivalStore> {
        self.archival.then_some(self as &dyn ArchivalStore)
    }
}

#[async_trait]
impl ArchivalStore for InMemoryMediaStore {
    async fn move_to_archive(&self, path: &str) -> Result<(), MediaError> {
        self.check(path).await?;
        match self.blobs.write().await.get_mut(path) {
            Some(class) => {
                *class = StorageClass::Archive;
                Ok(())
            }
            None => Err(MediaError::NotFound(path.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_archive_moves_tier() {
        let store = InMemoryMediaStore::new();
        store.put("posts/a.jpg").await;

        let archive = store.as_archive().unwrap();
        archive.move_to_archive("posts/a.jpg").await.unwrap();

        assert_eq!(store.storage_class("posts/a.jpg").await, Some(StorageClass::Archive));
        assert!(matches!(
            archive.move_to_archive("posts/missing.jpg").await,
            Err(MediaError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let store = InMemoryMediaStore::new();
        store.put("posts/a.jpg").await;
        store.fail_on("posts/a.jpg").await;

        assert!(store.delete("posts/a.jpg").await.is_err());
        assert!(store.contains("posts/a.jpg").await);
    }

    #[test]
    fn test_without_archival() {
        assert!(InMemoryMediaStore::without_archival().as_archive().is_none());
    }
}
