//! In-memory token store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use gatework_protocols::{StoreError, TokenStore};

/// In-memory token store.
///
/// The default store for tests and demos. Seed it with
/// [`with_entries`](MemoryTokenStore::with_entries) to stand in for
/// pre-existing device state.
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store seeded with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for MemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
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
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_returns_default_for_missing_key() {
        let store = MemoryTokenStore::new();
        let value = store.get_string("token", "fallback").await.unwrap();
        assert_eq!(value, "fallback");
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let store = MemoryTokenStore::new();
        store.set_string("token", "old_token").await.unwrap();
        let value = store.get_string("token", "fallback").await.unwrap();
        assert_eq!(value, "old_token");
    }

    #[tokio::test]
    async fn test_with_entries_seeds_the_map() {
        let store = MemoryTokenStore::with_entries([("token", "old_token")]);
        assert_eq!(store.len().await, 1);
        let value = store.get_string("token", "fallback").await.unwrap();
        assert_eq!(value, "old_token");
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryTokenStore::with_entries([("token", "old_token")]);
        store.set_string("token", "new_token").await.unwrap();
        let value = store.get_string("token", "fallback").await.unwrap();
        assert_eq!(value, "new_token");
    }
}
