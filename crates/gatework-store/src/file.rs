//! File-backed token store.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use gatework_protocols::{StoreError, TokenStore};

/// Token store persisted as a single JSON map on disk.
///
/// The whole map is loaded at open and rewritten on every set. Writes
/// hold the write lock through the disk write, so concurrent setters
/// serialize and the file always reflects a complete map.
pub struct FileTokenStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileTokenStore {
    /// Open a store at `path`, loading existing entries if the file is
    /// already there.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let entries: HashMap<String, String> = match fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StoreError::Io(e)),
        };

        debug!(
            "FileTokenStore opened at {:?} with {} entries",
            path,
            entries.len()
        );

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Path the store persists to.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn get_string(&self, key: &str, default: &str) -> Result<String, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string()))
    }

    async fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries).await?;
        debug!("persisted '{}' to {:?}", key, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_missing_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTokenStore::open(temp_dir.path().join("tokens.json"))
            .await
            .unwrap();

        let value = store.get_string("token", "fallback").await.unwrap();
        assert_eq!(value, "fallback");
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileTokenStore::open(temp_dir.path().join("tokens.json"))
            .await
            .unwrap();

        store.set_string("token", "old_token").await.unwrap();
        let value = store.get_string("token", "fallback").await.unwrap();
        assert_eq!(value, "old_token");
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tokens.json");

        {
            let store = FileTokenStore::open(&path).await.unwrap();
            store.set_string("token", "new_token").await.unwrap();
        }

        let reopened = FileTokenStore::open(&path).await.unwrap();
        let value = reopened.get_string("token", "fallback").await.unwrap();
        assert_eq!(value, "new_token");
    }

    #[tokio::test]
    async fn test_open_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("tokens.json");

        let store = FileTokenStore::open(&path).await.unwrap();
        store.set_string("token", "value").await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_open_rejects_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tokens.json");
        tokio::fs::write(&path, "not json at all").await.unwrap();

        let result = FileTokenStore::open(&path).await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
