//! Session lifecycle and typed REST client for the smart-farm dashboard.
//!
//! The crate owns the one piece of client logic with real state: who is
//! logged in, and whether the access token in hand is still good. Everything
//! else is a typed view over the farm backend's REST API.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use smartfarm_client::{ApiClient, ClientConfig, FileSessionStore, HttpAuthGateway, SessionManager};
//!
//! let config = ClientConfig::from_env()?;
//! let gateway = HttpAuthGateway::new(&config)?;
//! let store = FileSessionStore::new("/var/lib/farm-dashboard")?;
//! let session = Arc::new(SessionManager::new(gateway, store, &config));
//!
//! // resolve the persisted session before showing anything that depends on it
//! session.bootstrap().await;
//!
//! let api = ApiClient::new(&config, session.clone())?;
//! let reading = api.sensors().latest().await?;
//! ```

pub mod api;
pub mod config;
pub mod events;
pub mod gateway;
pub mod jwt;
pub mod poller;
pub mod secret;
pub mod session;
pub mod validators;

pub use api::{ApiClient, TokenSource};
pub use config::ClientConfig;
pub use events::{register_event_listeners, SessionEvent};
pub use gateway::{AuthGateway, HttpAuthGateway};
#[cfg(any(test, feature = "mocks"))]
pub use gateway::MockAuthGateway;
pub use poller::{poll, PollHandle, PollSnapshot};
pub use secret::SecretString;
pub use session::{
    FileSessionStore, InMemorySessionStore, Role, SessionManager, SessionState, SessionStore,
    SessionUser, StoreKey,
};
pub use validators::ValidationError;

/// Fallback text surfaced when a login fails without a server message.
pub const LOGIN_FAILED_FALLBACK: &str = "Login failed";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error("request rejected ({status}): {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },
    #[error("not authorized")]
    Unauthorized,
    #[error("transport error: {0}")]
    Transport(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("{0}")]
    LoginFailed(String),
    #[error("no active session")]
    NotAuthenticated,
    #[error("session store error: {0}")]
    Store(String),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Returns the human-readable message sent by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            Self::LoginFailed(message) => Some(message),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message() {
        let err = ClientError::Rejected {
            status: 401,
            message: Some("invalid credentials".to_owned()),
        };
        assert_eq!(err.server_message(), Some("invalid credentials"));

        let err = ClientError::Rejected {
            status: 500,
            message: None,
        };
        assert_eq!(err.server_message(), None);
        assert_eq!(
            ClientError::LoginFailed("locked".to_owned()).server_message(),
            Some("locked")
        );
        assert_eq!(ClientError::Unauthorized.server_message(), None);
    }

    #[test]
    fn test_display() {
        let err = ClientError::Rejected {
            status: 400,
            message: Some("bad input".to_owned()),
        };
        assert_eq!(err.to_string(), "request rejected (400): bad input");

        let err = ClientError::Rejected {
            status: 502,
            message: None,
        };
        assert_eq!(err.to_string(), "request rejected (502): no message");

        assert_eq!(
            ClientError::LoginFailed(LOGIN_FAILED_FALLBACK.to_owned()).to_string(),
            "Login failed"
        );
    }

    #[test]
    fn test_validation_conversion() {
        let err: ClientError = ValidationError::EmailEmpty.into();
        assert_eq!(err, ClientError::Validation(ValidationError::EmailEmpty));
    }
}
