//! Persisted session storage.

use async_trait::async_trait;

use crate::ClientError;

/// The three entries a persisted session consists of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    AccessToken,
    RefreshToken,
    User,
}

impl StoreKey {
    pub const ALL: [StoreKey; 3] = [Self::AccessToken, Self::RefreshToken, Self::User];

    /// Name of the entry in the backing store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccessToken => "accessToken",
            Self::RefreshToken => "refreshToken",
            Self::User => "user",
        }
    }
}

/// Durable string key-value storage that survives restarts.
///
/// Only [`SessionManager`](super::SessionManager) writes to it. Implementations:
/// - [`InMemorySessionStore`](super::InMemorySessionStore): process lifetime only, for tests
/// - [`FileSessionStore`](super::FileSessionStore): a JSON document on disk
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, ClientError>;

    async fn set(&self, key: StoreKey, value: &str) -> Result<(), ClientError>;

    /// Removing an absent key is not an error.
    async fn remove(&self, key: StoreKey) -> Result<(), ClientError>;

    /// Removes all session entries. Every key is attempted even if one fails;
    /// the first error is returned.
    async fn clear(&self) -> Result<(), ClientError> {
        let mut first_error = None;
        for key in StoreKey::ALL {
            if let Err(e) = self.remove(key).await {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
