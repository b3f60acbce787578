//! File-backed session storage.
//!
//! The whole session lives in one JSON document, `session.json`, inside the
//! configured directory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use super::store::{SessionStore, StoreKey};
use crate::ClientError;

const FILE_NAME: &str = "session.json";

/// Persists session entries as a JSON object keyed by [`StoreKey::as_str`].
///
/// ```rust,ignore
/// use smartfarm_client::FileSessionStore;
///
/// let store = FileSessionStore::new(dirs::data_dir().unwrap().join("farm-dashboard"))?;
/// ```
pub struct FileSessionStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    /// Creates the directory if it doesn't exist.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, ClientError> {
        let dir = directory.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            ClientError::Store(format!("failed to create session directory: {e}"))
        })?;
        Ok(Self {
            path: dir.join(FILE_NAME),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<BTreeMap<String, String>, ClientError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .map_err(|e| ClientError::Store(format!("failed to read session file: {e}")))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&content)
            .map_err(|e| ClientError::Store(format!("failed to parse session file: {e}")))
    }

    fn write_document(&self, document: &BTreeMap<String, String>) -> Result<(), ClientError> {
        if document.is_empty() {
            if self.path.exists() {
                std::fs::remove_file(&self.path).map_err(|e| {
                    ClientError::Store(format!("failed to delete session file: {e}"))
                })?;
            }
            return Ok(());
        }

        let content = serde_json::to_string_pretty(document)
            .map_err(|e| ClientError::Store(format!("failed to serialize session: {e}")))?;

        // write-then-rename so a crash never leaves a half-written document
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)
            .map_err(|e| ClientError::Store(format!("failed to write session file: {e}")))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| ClientError::Store(format!("failed to replace session file: {e}")))?;

        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), ClientError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ClientError::Store("lock poisoned".to_owned()))?;
        let mut document = self.read_document()?;
        f(&mut document);
        self.write_document(&document)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, ClientError> {
        Ok(self.read_document()?.remove(key.as_str()))
    }

    async fn set(&self, key: StoreKey, value: &str) -> Result<(), ClientError> {
        self.update(|doc| {
            doc.insert(key.as_str().to_owned(), value.to_owned());
        })
    }

    async fn remove(&self, key: StoreKey) -> Result<(), ClientError> {
        self.update(|doc| {
            doc.remove(key.as_str());
        })
    }

    // Skips reading so that a corrupt document can still be discarded.
    async fn clear(&self) -> Result<(), ClientError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| ClientError::Store("lock poisoned".to_owned()))?;
        self.write_document(&BTreeMap::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_get_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let store = FileSessionStore::new(dir.path()).unwrap();
        store.set(StoreKey::AccessToken, "a.b.c").await.unwrap();
        store.set(StoreKey::User, r#"{"id":"1"}"#).await.unwrap();
        drop(store);

        let reopened = FileSessionStore::new(dir.path()).unwrap();
        assert_eq!(
            reopened.get(StoreKey::AccessToken).await.unwrap().as_deref(),
            Some("a.b.c")
        );
        assert_eq!(
            reopened.get(StoreKey::User).await.unwrap().as_deref(),
            Some(r#"{"id":"1"}"#)
        );
        assert_eq!(reopened.get(StoreKey::RefreshToken).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_document_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();
        store.set(StoreKey::RefreshToken, "r-1").await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc, serde_json::json!({ "refreshToken": "r-1" }));
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nested/dir")).unwrap();
        assert_eq!(store.get(StoreKey::User).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clear_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();
        for key in StoreKey::ALL {
            store.set(key, "x").await.unwrap();
        }
        assert!(store.path().exists());

        store.clear().await.unwrap();
        assert!(!store.path().exists());
        assert_eq!(store.get(StoreKey::AccessToken).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_unreadable_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path()).unwrap();
        std::fs::write(store.path(), "not json").unwrap();

        let err = store.get(StoreKey::User).await.unwrap_err();
        assert!(matches!(err, ClientError::Store(ref msg) if msg.contains("parse")));

        store.clear().await.unwrap();
        assert_eq!(store.get(StoreKey::User).await.unwrap(), None);
    }
}
