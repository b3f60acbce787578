//! In-memory session storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use super::store::{SessionStore, StoreKey};
use crate::ClientError;

/// Session storage held in a `HashMap` behind a `RwLock`.
///
/// Clones share the same map, so a test can keep a handle to inspect what
/// the session manager wrote. Contents are lost when the process exits.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    entries: Arc<RwLock<HashMap<StoreKey, String>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with the given entries.
    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (StoreKey, &'a str)>) -> Self {
        let map = entries
            .into_iter()
            .map(|(key, value)| (key, value.to_owned()))
            .collect();
        Self {
            entries: Arc::new(RwLock::new(map)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Synchronous peek for assertions.
    pub fn snapshot(&self, key: StoreKey) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|guard| guard.get(&key).cloned())
    }
}

fn poisoned() -> ClientError {
    ClientError::Store("lock poisoned".to_owned())
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, ClientError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(&key).cloned())
    }

    async fn set(&self, key: StoreKey, value: &str) -> Result<(), ClientError> {
        self.entries
            .write()
            .map_err(|_| poisoned())?
            .insert(key, value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> Result<(), ClientError> {
        self.entries.write().map_err(|_| poisoned())?.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let store = InMemorySessionStore::new();
        assert!(store.is_empty());

        store.set(StoreKey::AccessToken, "a.b.c").await.unwrap();
        assert_eq!(store.get(StoreKey::AccessToken).await.unwrap().as_deref(), Some("a.b.c"));
        assert_eq!(store.get(StoreKey::User).await.unwrap(), None);

        store.remove(StoreKey::AccessToken).await.unwrap();
        assert!(store.is_empty());

        // absent key
        store.remove(StoreKey::RefreshToken).await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = InMemorySessionStore::new();
        let observer = store.clone();

        store.set(StoreKey::User, "{}").await.unwrap();
        assert_eq!(observer.snapshot(StoreKey::User).as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn test_clear() {
        let store = InMemorySessionStore::with_entries([
            (StoreKey::AccessToken, "a"),
            (StoreKey::RefreshToken, "r"),
            (StoreKey::User, "{}"),
        ]);
        assert_eq!(store.len(), 3);

        store.clear().await.unwrap();
        assert!(store.is_empty());
    }
}
