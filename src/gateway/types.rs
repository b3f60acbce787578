//! Wire shapes of the `/auth` endpoints.

use serde::{Deserialize, Serialize};

use crate::session::{Role, SessionUser};
use crate::SecretString;

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: SecretString,
    pub new_password: SecretString,
    pub confirm_password: SecretString,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshTokenBody<'a> {
    pub refresh_token: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayUser {
    #[serde(alias = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl From<GatewayUser> for SessionUser {
    fn from(user: GatewayUser) -> Self {
        SessionUser {
            id: user.id,
            name: user.username,
            email: user.email,
            role: user.role,
        }
    }
}

/// Returned by login and register.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    /// Access token lifetime in seconds, informational only.
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: GatewayUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: SecretString,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}
