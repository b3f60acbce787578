use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{watch, Mutex};

use super::store::{SessionStore, StoreKey};
use super::{Session, SessionState, SessionUser};
use crate::api::TokenSource;
use crate::events::{dispatch, ClearReason, SessionEvent};
use crate::gateway::{
    Acknowledgement, AuthGateway, AuthResponse, ChangePasswordRequest, LoginRequest,
    RegisterRequest,
};
use crate::jwt::is_expired_or_near_expiry;
use crate::validators::{require, validate_email, validate_new_password, validate_password_present};
use crate::{ClientConfig, ClientError, SecretString, LOGIN_FAILED_FALLBACK};

/// Owns the authenticated-user lifecycle.
///
/// The manager is the only writer of its [`SessionStore`] and keeps an
/// in-memory mirror of it; readers go through [`current_user`](Self::current_user),
/// [`state`](Self::state) or [`subscribe`](Self::subscribe), never the store.
///
/// Mutating operations (`bootstrap`, `login`, `register`, `logout`) are
/// serialized. None of them is retried.
pub struct SessionManager<G: AuthGateway, S: SessionStore> {
    gateway: G,
    store: S,
    leeway: chrono::Duration,
    logout_timeout: Duration,
    session: RwLock<Option<Session>>,
    state: watch::Sender<SessionState>,
    op_lock: Mutex<()>,
}

impl<G: AuthGateway, S: SessionStore> SessionManager<G, S> {
    /// Starts logged out. Call [`bootstrap`](Self::bootstrap) before
    /// showing anything that depends on the session.
    pub fn new(gateway: G, store: S, config: &ClientConfig) -> Self {
        let (state, _) = watch::channel(SessionState::LoggedOut);
        Self {
            gateway,
            store,
            leeway: config.token_leeway,
            logout_timeout: config.request_timeout,
            session: RwLock::new(None),
            state,
            op_lock: Mutex::new(()),
        }
    }

    /// Resolves the persisted session once at startup.
    ///
    /// | store contents                                   | outcome                         |
    /// |--------------------------------------------------|---------------------------------|
    /// | store unreadable                                 | store cleared, `LoggedOut`      |
    /// | user or access token missing                     | `LoggedOut`, store untouched    |
    /// | user profile unparsable                          | store cleared, `LoggedOut`      |
    /// | access token valid beyond the leeway             | `LoggedIn`, no gateway call     |
    /// | token near expiry, refresh succeeds              | token replaced, `LoggedIn`      |
    /// | token near expiry, refresh fails                 | store cleared, `LoggedOut`      |
    /// | token near expiry, no refresh token              | store cleared, `LoggedOut`      |
    ///
    /// Never fails: every path ends in a well-defined state.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session.bootstrap", skip_all)
    )]
    pub async fn bootstrap(&self) -> SessionState {
        let _guard = self.op_lock.lock().await;

        let persisted = match self.load_entry(StoreKey::User).await {
            Ok(user) => match self.load_entry(StoreKey::AccessToken).await {
                Ok(access) => (user, access),
                Err(e) => return self.discard_unreadable(e).await,
            },
            Err(e) => return self.discard_unreadable(e).await,
        };
        let (Some(user_json), Some(access_token)) = persisted else {
            log::debug!(target: "smartfarm::session", "msg=\"no persisted session\"");
            return self.replace(None);
        };

        let user: SessionUser = match serde_json::from_str(&user_json) {
            Ok(user) => user,
            Err(e) => {
                log::warn!(
                    target: "smartfarm::session",
                    "msg=\"persisted profile unreadable, discarding session\" error=\"{e}\""
                );
                return self.discard(ClearReason::CorruptProfile).await;
            }
        };

        let refresh_token = self
            .read_entry(StoreKey::RefreshToken)
            .await
            .map(SecretString::from);

        if !is_expired_or_near_expiry(&access_token, Utc::now(), self.leeway) {
            log::info!(
                target: "smartfarm::session",
                "msg=\"session restored\" user_id={}",
                user.id
            );
            dispatch(SessionEvent::SessionRestored {
                user_id: user.id.clone(),
                at: Utc::now(),
            })
            .await;
            return self.replace(Some(Session {
                access_token: access_token.into(),
                refresh_token,
                user,
            }));
        }

        let Some(refresh_token) = refresh_token else {
            log::info!(
                target: "smartfarm::session",
                "msg=\"access token expired and no refresh token stored\" user_id={}",
                user.id
            );
            return self.discard(ClearReason::ExpiredWithoutRefresh).await;
        };

        let access_token = match self.gateway.refresh(refresh_token.expose_secret()).await {
            Ok(response) if !response.access_token.is_empty() => response.access_token,
            Ok(_) => {
                log::warn!(
                    target: "smartfarm::session",
                    "msg=\"refresh returned an empty access token\" user_id={}",
                    user.id
                );
                return self.discard(ClearReason::RefreshFailed).await;
            }
            Err(e) => {
                log::info!(
                    target: "smartfarm::session",
                    "msg=\"token refresh failed\" user_id={} error=\"{e}\"",
                    user.id
                );
                return self.discard(ClearReason::RefreshFailed).await;
            }
        };

        // the renewed token is already in hand; a failed write only costs
        // another refresh on the next start
        if let Err(e) = self
            .store
            .set(StoreKey::AccessToken, access_token.expose_secret())
            .await
        {
            log::warn!(
                target: "smartfarm::session",
                "msg=\"failed to persist refreshed token\" error=\"{e}\""
            );
        }

        log::info!(
            target: "smartfarm::session",
            "msg=\"access token refreshed\" user_id={}",
            user.id
        );
        dispatch(SessionEvent::TokenRefreshed {
            user_id: user.id.clone(),
            at: Utc::now(),
        })
        .await;

        self.replace(Some(Session {
            access_token,
            refresh_token: Some(refresh_token),
            user,
        }))
    }

    /// Exchanges credentials for a session.
    ///
    /// A rejection surfaces the server's message (or [`LOGIN_FAILED_FALLBACK`])
    /// as [`ClientError::LoginFailed`] and leaves the current state and the
    /// store as they were.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session.login", skip_all, err)
    )]
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionUser, ClientError> {
        let email = email.trim();
        validate_email(email)?;
        validate_password_present(password)?;

        let _guard = self.op_lock.lock().await;

        let request = LoginRequest {
            email: email.to_owned(),
            password: password.into(),
        };

        let response = match self.gateway.login(&request).await {
            Ok(response) if !response.access_token.is_empty() => response,
            Ok(response) => {
                let reason = non_empty(response.message.as_deref());
                return Err(self.login_failed(email, reason).await);
            }
            Err(e) => {
                log::debug!(target: "smartfarm::session", "msg=\"gateway rejected login\" error=\"{e}\"");
                let reason = non_empty(e.server_message());
                return Err(self.login_failed(email, reason).await);
            }
        };

        let user = self.establish(response).await?;

        log::info!(
            target: "smartfarm::session",
            "msg=\"login success\" user_id={} role={:?}",
            user.id,
            user.role
        );
        dispatch(SessionEvent::LoginSucceeded {
            user_id: user.id.clone(),
            email: user.email.clone(),
            at: Utc::now(),
        })
        .await;

        Ok(user)
    }

    /// Creates an account and logs into it.
    ///
    /// Gateway errors are returned unchanged.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session.register", skip_all, err)
    )]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<SessionUser, ClientError> {
        let username = username.trim();
        let email = email.trim();
        require("username", username)?;
        validate_email(email)?;
        validate_new_password(password, password)?;

        let _guard = self.op_lock.lock().await;

        let response = self
            .gateway
            .register(&RegisterRequest {
                username: username.to_owned(),
                email: email.to_owned(),
                password: password.into(),
            })
            .await?;
        if response.access_token.is_empty() {
            return Err(ClientError::InvalidResponse(
                "registration returned no access token".to_owned(),
            ));
        }

        let user = self.establish(response).await?;

        log::info!(
            target: "smartfarm::session",
            "msg=\"registration success\" user_id={}",
            user.id
        );
        dispatch(SessionEvent::LoginSucceeded {
            user_id: user.id.clone(),
            email: user.email.clone(),
            at: Utc::now(),
        })
        .await;

        Ok(user)
    }

    /// Ends the session locally, always.
    ///
    /// The gateway is told about it on a best-effort basis: its failure or
    /// silence (bounded by the request timeout) is logged and ignored.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session.logout", skip_all)
    )]
    pub async fn logout(&self) {
        let _guard = self.op_lock.lock().await;

        let (refresh_token, user_id) = {
            let session = self.session.read().unwrap_or_else(PoisonError::into_inner);
            match session.as_ref() {
                Some(s) => (s.refresh_token.clone(), Some(s.user.id.clone())),
                None => (None, None),
            }
        };
        let refresh_token = match refresh_token {
            Some(token) => Some(token),
            None => self
                .read_entry(StoreKey::RefreshToken)
                .await
                .map(SecretString::from),
        };

        if let Some(token) = refresh_token {
            let notify = self.gateway.logout(token.expose_secret());
            match tokio::time::timeout(self.logout_timeout, notify).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::info!(
                    target: "smartfarm::session",
                    "msg=\"logout notification failed\" error=\"{e}\""
                ),
                Err(_) => log::warn!(
                    target: "smartfarm::session",
                    "msg=\"logout notification timed out\" timeout_ms={}",
                    self.logout_timeout.as_millis()
                ),
            }
        }

        if let Err(e) = self.store.clear().await {
            log::warn!(
                target: "smartfarm::session",
                "msg=\"failed to clear session store\" error=\"{e}\""
            );
        }
        self.replace(None);

        log::info!(target: "smartfarm::session", "msg=\"logout success\"");
        dispatch(SessionEvent::LoggedOut {
            user_id,
            at: Utc::now(),
        })
        .await;
    }

    /// Changes the logged-in user's password. The session is unaffected
    /// either way.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session.change_password", skip_all, err)
    )]
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<Acknowledgement, ClientError> {
        let access_token = self.access_token().ok_or(ClientError::NotAuthenticated)?;
        validate_password_present(current_password)?;
        validate_new_password(new_password, confirm_password)?;

        let request = ChangePasswordRequest {
            current_password: current_password.into(),
            new_password: new_password.into(),
            confirm_password: confirm_password.into(),
        };
        self.gateway
            .change_password(access_token.expose_secret(), &request)
            .await
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.state.borrow().user().cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_logged_in()
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every login and logout.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn access_token(&self) -> Option<SecretString> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    /// Persists a fresh session, then publishes it. If the store cannot be
    /// written the store is cleared and the manager ends up logged out.
    async fn establish(&self, response: AuthResponse) -> Result<SessionUser, ClientError> {
        let user = SessionUser::from(response.user);
        let refresh_token = (!response.refresh_token.is_empty()).then_some(response.refresh_token);

        if let Err(e) = self
            .persist(&response.access_token, refresh_token.as_ref(), &user)
            .await
        {
            log::error!(
                target: "smartfarm::session",
                "msg=\"failed to persist session\" error=\"{e}\""
            );
            if let Err(e) = self.store.clear().await {
                log::warn!(target: "smartfarm::session", "msg=\"failed to clear session store\" error=\"{e}\"");
            }
            self.replace(None);
            return Err(e);
        }

        self.replace(Some(Session {
            access_token: response.access_token,
            refresh_token,
            user: user.clone(),
        }));
        Ok(user)
    }

    async fn persist(
        &self,
        access_token: &SecretString,
        refresh_token: Option<&SecretString>,
        user: &SessionUser,
    ) -> Result<(), ClientError> {
        let user_json = serde_json::to_string(user)
            .map_err(|e| ClientError::Store(format!("failed to serialize user: {e}")))?;

        self.store
            .set(StoreKey::AccessToken, access_token.expose_secret())
            .await?;
        match refresh_token {
            Some(token) => {
                self.store
                    .set(StoreKey::RefreshToken, token.expose_secret())
                    .await?
            }
            None => self.store.remove(StoreKey::RefreshToken).await?,
        }
        self.store.set(StoreKey::User, &user_json).await
    }

    async fn login_failed(&self, email: &str, reason: Option<&str>) -> ClientError {
        let reason = reason.unwrap_or(LOGIN_FAILED_FALLBACK).to_owned();

        log::warn!(
            target: "smartfarm::session",
            "msg=\"login failed\" email={email} reason=\"{reason}\""
        );
        dispatch(SessionEvent::LoginFailed {
            email: email.to_owned(),
            reason: reason.clone(),
            at: Utc::now(),
        })
        .await;

        ClientError::LoginFailed(reason)
    }

    /// Clears the store and drops to `LoggedOut`.
    async fn discard(&self, reason: ClearReason) -> SessionState {
        if let Err(e) = self.store.clear().await {
            log::warn!(
                target: "smartfarm::session",
                "msg=\"failed to clear session store\" error=\"{e}\""
            );
        }
        dispatch(SessionEvent::SessionCleared {
            reason,
            at: Utc::now(),
        })
        .await;
        self.replace(None)
    }

    async fn discard_unreadable(&self, error: ClientError) -> SessionState {
        log::warn!(
            target: "smartfarm::session",
            "msg=\"session store unreadable, discarding session\" error=\"{error}\""
        );
        self.discard(ClearReason::CorruptStore).await
    }

    /// Reads an entry; empty entries count as absent.
    async fn load_entry(&self, key: StoreKey) -> Result<Option<String>, ClientError> {
        Ok(self.store.get(key).await?.filter(|v| !v.is_empty()))
    }

    /// Like [`Self::load_entry`], but an unreadable entry also counts as absent.
    async fn read_entry(&self, key: StoreKey) -> Option<String> {
        match self.load_entry(key).await {
            Ok(value) => value,
            Err(e) => {
                log::warn!(
                    target: "smartfarm::session",
                    "msg=\"failed to read session store\" key={} error=\"{e}\"",
                    key.as_str()
                );
                None
            }
        }
    }

    /// Swaps the in-memory session and publishes the matching state.
    fn replace(&self, session: Option<Session>) -> SessionState {
        let state = match &session {
            Some(s) => SessionState::LoggedIn(s.user.clone()),
            None => SessionState::LoggedOut,
        };
        *self.session.write().unwrap_or_else(PoisonError::into_inner) = session;
        self.state.send_replace(state.clone());
        state
    }
}

impl<G: AuthGateway, S: SessionStore> TokenSource for SessionManager<G, S> {
    fn access_token(&self) -> Option<SecretString> {
        SessionManager::access_token(self)
    }
}

fn non_empty(message: Option<&str>) -> Option<&str> {
    message.filter(|m| !m.trim().is_empty())
}
