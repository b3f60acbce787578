//! The remote authentication service.
//!
//! [`AuthGateway`] is the seam between the session manager and the network.
//! [`HttpAuthGateway`] talks to the farm backend; [`MockAuthGateway`]
//! (feature `mocks`) scripts its answers for tests.

mod http;
#[cfg(any(test, feature = "mocks"))]
mod mock;
mod types;

use async_trait::async_trait;

pub use http::HttpAuthGateway;
#[cfg(any(test, feature = "mocks"))]
pub use mock::{LogoutBehavior, MockAuthGateway};
pub use types::{
    Acknowledgement, AuthResponse, ChangePasswordRequest, GatewayUser, LoginRequest,
    RefreshResponse, RegisterRequest,
};

use crate::ClientError;

/// Every call is a single attempt; callers decide what a failure means.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchanges credentials for a token pair and the user's profile.
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError>;

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError>;

    /// Issues a new access token for a valid refresh token.
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError>;

    /// Invalidates the refresh token server-side. The response body is ignored.
    async fn logout(&self, refresh_token: &str) -> Result<(), ClientError>;

    async fn change_password(
        &self,
        access_token: &str,
        request: &ChangePasswordRequest,
    ) -> Result<Acknowledgement, ClientError>;
}
