//! Who is logged in.
//!
//! [`SessionManager`] is the single owner of the session. It mirrors the
//! persisted [`SessionStore`] in memory, and everything else in the
//! application reads the current user through it.

mod file_store;
mod manager;
mod memory_store;
mod store;

pub use file_store::FileSessionStore;
pub use manager::SessionManager;
pub use memory_store::InMemorySessionStore;
pub use store::{SessionStore, StoreKey};

use serde::{Deserialize, Serialize};

use crate::SecretString;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Profile of the logged-in user, as persisted under [`StoreKey::User`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    /// Display name (the account's username).
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// The externally visible session state.
///
/// Token renewal happens inside [`SessionManager::bootstrap`] and is never
/// observable as a state of its own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn(SessionUser),
}

impl SessionState {
    pub fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::LoggedIn(user) => Some(user),
            Self::LoggedOut => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn(_))
    }
}

/// In-memory session. Exists only while logged in, so a user always comes
/// with an access token.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub user: SessionUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role) -> SessionUser {
        SessionUser {
            id: "665f1c2e9b1d".to_owned(),
            name: "nguyen".to_owned(),
            email: "nguyen@farm.example.com".to_owned(),
            role,
        }
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::from_str::<Role>("\"user\"").unwrap(), Role::User);
        assert!(serde_json::from_str::<Role>("\"owner\"").is_err());
        assert!(Role::Admin.is_admin());
        assert!(!Role::User.is_admin());
    }

    #[test]
    fn test_persisted_profile_shape() {
        let json = serde_json::to_value(user(Role::User)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "665f1c2e9b1d",
                "name": "nguyen",
                "email": "nguyen@farm.example.com",
                "role": "user"
            })
        );
    }

    #[test]
    fn test_state_accessors() {
        assert_eq!(SessionState::default(), SessionState::LoggedOut);
        assert!(SessionState::LoggedOut.user().is_none());

        let state = SessionState::LoggedIn(user(Role::Admin));
        assert!(state.is_logged_in());
        assert_eq!(state.user().unwrap().role, Role::Admin);
    }
}
