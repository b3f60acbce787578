#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{EncodingKey, Header};

use super::{
    Acknowledgement, AuthGateway, AuthResponse, ChangePasswordRequest, GatewayUser, LoginRequest,
    RefreshResponse, RegisterRequest,
};
use crate::session::Role;
use crate::ClientError;

const SIGNING_KEY: &[u8] = b"mock-gateway-signing-key";

/// How the mock answers a logout notification.
#[derive(Debug, Clone)]
pub enum LogoutBehavior {
    Succeed,
    Fail(ClientError),
    /// Never completes, like a gateway that stopped answering.
    Hang,
}

#[derive(Clone)]
struct Account {
    password: String,
    user: GatewayUser,
}

struct MockState {
    accounts: HashMap<String, Account>,
    access_ttl: Duration,
    refresh_result: Result<(), ClientError>,
    logout: LogoutBehavior,
    login_calls: usize,
    register_calls: usize,
    refresh_calls: usize,
    logout_calls: usize,
    change_password_calls: usize,
}

/// Scriptable in-memory [`AuthGateway`].
///
/// Clones share state, so a test can hand one clone to the session manager
/// and keep another to count calls.
#[derive(Clone)]
pub struct MockAuthGateway {
    state: Arc<Mutex<MockState>>,
}

impl Default for MockAuthGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAuthGateway {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                accounts: HashMap::new(),
                access_ttl: Duration::minutes(15),
                refresh_result: Ok(()),
                logout: LogoutBehavior::Succeed,
                login_calls: 0,
                register_calls: 0,
                refresh_calls: 0,
                logout_calls: 0,
                change_password_calls: 0,
            })),
        }
    }

    /// Adds an account that `login` will accept.
    #[must_use]
    pub fn with_account(self, email: &str, password: &str, username: &str, role: Role) -> Self {
        let user = GatewayUser {
            id: format!("user-{}", self.state.lock().unwrap().accounts.len() + 1),
            username: username.to_owned(),
            email: email.to_owned(),
            role,
        };
        self.state.lock().unwrap().accounts.insert(
            email.to_owned(),
            Account {
                password: password.to_owned(),
                user,
            },
        );
        self
    }

    /// Lifetime of access tokens issued by login, register and refresh.
    #[must_use]
    pub fn with_access_ttl(self, ttl: Duration) -> Self {
        self.state.lock().unwrap().access_ttl = ttl;
        self
    }

    /// Makes every refresh call fail with `error`.
    #[must_use]
    pub fn failing_refresh(self, error: ClientError) -> Self {
        self.state.lock().unwrap().refresh_result = Err(error);
        self
    }

    #[must_use]
    pub fn with_logout(self, behavior: LogoutBehavior) -> Self {
        self.state.lock().unwrap().logout = behavior;
        self
    }

    pub fn login_calls(&self) -> usize {
        self.state.lock().unwrap().login_calls
    }

    pub fn register_calls(&self) -> usize {
        self.state.lock().unwrap().register_calls
    }

    pub fn refresh_calls(&self) -> usize {
        self.state.lock().unwrap().refresh_calls
    }

    pub fn logout_calls(&self) -> usize {
        self.state.lock().unwrap().logout_calls
    }

    pub fn change_password_calls(&self) -> usize {
        self.state.lock().unwrap().change_password_calls
    }

    /// Mints an unverifiable-but-decodable JWT expiring at `exp`.
    pub fn issue_token(subject: &str, exp: DateTime<Utc>) -> String {
        let claims = serde_json::json!({
            "sub": subject,
            "iat": Utc::now().timestamp(),
            "exp": exp.timestamp(),
        });
        jsonwebtoken::encode(&Header::default(), &claims, &EncodingKey::from_secret(SIGNING_KEY))
            .unwrap()
    }

    fn auth_response(user: GatewayUser, ttl: Duration, message: &str) -> AuthResponse {
        let access = Self::issue_token(&user.id, Utc::now() + ttl);
        AuthResponse {
            success: true,
            message: Some(message.to_owned()),
            access_token: access.into(),
            refresh_token: format!("refresh-{}", user.id).into(),
            expires_in: Some(ttl.num_seconds()),
            user,
        }
    }
}

fn rejected(status: u16, message: &str) -> ClientError {
    ClientError::Rejected {
        status,
        message: Some(message.to_owned()),
    }
}

#[async_trait]
impl AuthGateway for MockAuthGateway {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.login_calls += 1;

        match state.accounts.get(&request.email) {
            Some(account) if account.password == request.password.expose_secret() => Ok(
                Self::auth_response(account.user.clone(), state.access_ttl, "Login successful"),
            ),
            _ => Err(rejected(401, "invalid credentials")),
        }
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.register_calls += 1;

        if state.accounts.contains_key(&request.email) {
            return Err(rejected(409, "email already registered"));
        }

        let user = GatewayUser {
            id: format!("user-{}", state.accounts.len() + 1),
            username: request.username.clone(),
            email: request.email.clone(),
            role: Role::User,
        };
        state.accounts.insert(
            request.email.clone(),
            Account {
                password: request.password.expose_secret().to_owned(),
                user: user.clone(),
            },
        );

        Ok(Self::auth_response(user, state.access_ttl, "Registered"))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.refresh_calls += 1;
        state.refresh_result.clone()?;

        let subject = refresh_token.trim_start_matches("refresh-");
        let access = Self::issue_token(subject, Utc::now() + state.access_ttl);
        Ok(RefreshResponse {
            access_token: access.into(),
        })
    }

    async fn logout(&self, _refresh_token: &str) -> Result<(), ClientError> {
        let behavior = {
            let mut state = self.state.lock().unwrap();
            state.logout_calls += 1;
            state.logout.clone()
        };

        match behavior {
            LogoutBehavior::Succeed => Ok(()),
            LogoutBehavior::Fail(error) => Err(error),
            LogoutBehavior::Hang => std::future::pending().await,
        }
    }

    async fn change_password(
        &self,
        _access_token: &str,
        request: &ChangePasswordRequest,
    ) -> Result<Acknowledgement, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.change_password_calls += 1;

        let account = state
            .accounts
            .values_mut()
            .find(|account| account.password == request.current_password.expose_secret())
            .ok_or_else(|| rejected(400, "current password is incorrect"))?;
        account.password = request.new_password.expose_secret().to_owned();

        Ok(Acknowledgement {
            success: true,
            message: Some("Password changed".to_owned()),
        })
    }
}
