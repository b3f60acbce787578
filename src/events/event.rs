use chrono::{DateTime, Utc};

/// Why a persisted session was discarded without an explicit logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearReason {
    /// The stored user profile could not be parsed.
    CorruptProfile,
    /// The session store itself could not be read.
    CorruptStore,
    /// The gateway refused (or never answered) the refresh request.
    RefreshFailed,
    /// The access token expired and no refresh token was stored.
    ExpiredWithoutRefresh,
}

impl ClearReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CorruptProfile => "corrupt_profile",
            Self::CorruptStore => "corrupt_store",
            Self::RefreshFailed => "refresh_failed",
            Self::ExpiredWithoutRefresh => "expired_without_refresh",
        }
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A persisted session was found valid at startup.
    SessionRestored {
        user_id: String,
        at: DateTime<Utc>,
    },
    TokenRefreshed {
        user_id: String,
        at: DateTime<Utc>,
    },
    LoginSucceeded {
        user_id: String,
        email: String,
        at: DateTime<Utc>,
    },
    LoginFailed {
        email: String,
        reason: String,
        at: DateTime<Utc>,
    },
    LoggedOut {
        user_id: Option<String>,
        at: DateTime<Utc>,
    },
    SessionCleared {
        reason: ClearReason,
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// Returns a dot-separated event name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SessionRestored { .. } => "session.restored",
            Self::TokenRefreshed { .. } => "session.token.refreshed",
            Self::LoginSucceeded { .. } => "session.login.success",
            Self::LoginFailed { .. } => "session.login.failed",
            Self::LoggedOut { .. } => "session.logout",
            Self::SessionCleared { .. } => "session.cleared",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SessionRestored { at, .. }
            | Self::TokenRefreshed { at, .. }
            | Self::LoginSucceeded { at, .. }
            | Self::LoginFailed { at, .. }
            | Self::LoggedOut { at, .. }
            | Self::SessionCleared { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        let now = Utc::now();
        let cases = [
            (
                SessionEvent::SessionRestored {
                    user_id: "u1".to_owned(),
                    at: now,
                },
                "session.restored",
            ),
            (
                SessionEvent::TokenRefreshed {
                    user_id: "u1".to_owned(),
                    at: now,
                },
                "session.token.refreshed",
            ),
            (
                SessionEvent::LoginSucceeded {
                    user_id: "u1".to_owned(),
                    email: "a@b.com".to_owned(),
                    at: now,
                },
                "session.login.success",
            ),
            (
                SessionEvent::LoginFailed {
                    email: "a@b.com".to_owned(),
                    reason: "invalid credentials".to_owned(),
                    at: now,
                },
                "session.login.failed",
            ),
            (SessionEvent::LoggedOut { user_id: None, at: now }, "session.logout"),
            (
                SessionEvent::SessionCleared {
                    reason: ClearReason::RefreshFailed,
                    at: now,
                },
                "session.cleared",
            ),
        ];

        for (event, name) in cases {
            assert_eq!(event.name(), name);
            assert_eq!(event.timestamp(), now);
        }
    }

    #[test]
    fn test_clear_reason_labels() {
        assert_eq!(ClearReason::CorruptProfile.as_str(), "corrupt_profile");
        assert_eq!(ClearReason::CorruptStore.as_str(), "corrupt_store");
        assert_eq!(ClearReason::RefreshFailed.as_str(), "refresh_failed");
        assert_eq!(ClearReason::ExpiredWithoutRefresh.as_str(), "expired_without_refresh");
    }
}
