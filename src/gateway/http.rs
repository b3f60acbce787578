use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::types::RefreshTokenBody;
use super::{
    Acknowledgement, AuthGateway, AuthResponse, ChangePasswordRequest, LoginRequest,
    RefreshResponse, RegisterRequest,
};
use crate::api::response;
use crate::{ClientConfig, ClientError};

const LOGIN: &str = "/auth/login";
const REGISTER: &str = "/auth/register";
const REFRESH: &str = "/auth/refresh";
const LOGOUT: &str = "/auth/logout";
const CHANGE_PASSWORD: &str = "/auth/change-password";

/// [`AuthGateway`] over the backend's `/auth` endpoints.
#[derive(Clone)]
pub struct HttpAuthGateway {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpAuthGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, config))
    }

    /// Reuses an existing connection pool.
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Self {
        Self {
            client,
            config: config.clone(),
        }
    }

    async fn post<B, T>(&self, path: &str, body: &B, bearer: Option<&str>) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let mut request = self.client.post(self.config.url(path)).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        response::read_json(response).await
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ClientError> {
        self.post(LOGIN, request, None).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        self.post(REGISTER, request, None).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ClientError> {
        self.post(REFRESH, &RefreshTokenBody { refresh_token }, None).await
    }

    async fn logout(&self, refresh_token: &str) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.config.url(LOGOUT))
            .json(&RefreshTokenBody { refresh_token })
            .send()
            .await?;
        response::ensure_success(response).await?;
        Ok(())
    }

    async fn change_password(
        &self,
        access_token: &str,
        request: &ChangePasswordRequest,
    ) -> Result<Acknowledgement, ClientError> {
        self.post(CHANGE_PASSWORD, request, Some(access_token)).await
    }
}
