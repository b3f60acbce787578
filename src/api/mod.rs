//! Typed client for the farm backend's REST API.
//!
//! [`ApiClient`] owns the HTTP connection pool and reads the bearer token
//! from a [`TokenSource`] (normally the [`SessionManager`](crate::SessionManager))
//! on every request. Each resource is reached through a borrowing view:
//!
//! ```rust,ignore
//! let reading = api.sensors().latest().await?;
//! api.devices().control(&DeviceCommand::new(DeviceName::Pump, DeviceMode::On)).await?;
//! let page = api.alerts().list(&AlertQuery::active()).await?;
//! ```

mod activity_logs;
mod alerts;
mod controller;
mod devices;
mod overview;
pub(crate) mod response;
mod schedules;
mod sensors;
mod thresholds;
mod users;

pub use activity_logs::{
    ActivityActor, ActivityLog, ActivityLogPage, ActivityLogQuery, ActivityLogs, ActivityStatus,
    LogPagination,
};
pub use alerts::{Alert, AlertPage, AlertQuery, AlertStatus, Alerts, NewAlert, Severity};
pub use controller::{Controller, ControllerStatus};
pub use devices::{
    DeviceCommand, DeviceHistoryQuery, DeviceMode, DeviceName, DeviceStatusMap, Devices,
};
pub use overview::AdminOverview;
pub use schedules::{Schedule, ScheduleInput, Schedules};
pub use sensors::{HistoryPoint, SensorHistoryQuery, SensorKind, SensorReading, Sensors};
pub use thresholds::{Threshold, ThresholdInput, Thresholds};
pub use users::{User, UserPage, UserPagination, UserQuery, UserUpdate, Users};

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::gateway::Acknowledgement;
use crate::poller::{poll, PollHandle};
use crate::{ClientConfig, ClientError, SecretString};

use response::Envelope;

/// Supplies the bearer token for outgoing requests.
pub trait TokenSource: Send + Sync {
    /// The current access token, or `None` when logged out.
    fn access_token(&self) -> Option<SecretString>;
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    pub fn new(config: &ClientConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(http, config, tokens))
    }

    /// Reuses an existing connection pool.
    pub fn with_client(
        http: reqwest::Client,
        config: &ClientConfig,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            http,
            config: config.clone(),
            tokens,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn sensors(&self) -> Sensors<'_> {
        Sensors::new(self)
    }

    pub fn devices(&self) -> Devices<'_> {
        Devices::new(self)
    }

    pub fn alerts(&self) -> Alerts<'_> {
        Alerts::new(self)
    }

    pub fn thresholds(&self) -> Thresholds<'_> {
        Thresholds::new(self)
    }

    pub fn schedules(&self) -> Schedules<'_> {
        Schedules::new(self)
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn activity_logs(&self) -> ActivityLogs<'_> {
        ActivityLogs::new(self)
    }

    pub fn controller(&self) -> Controller<'_> {
        Controller::new(self)
    }

    /// Latest readings, refreshed every `sensor_poll_interval`.
    pub fn watch_sensors(&self) -> PollHandle<SensorReading> {
        let api = self.clone();
        poll("sensors.latest", self.config.sensor_poll_interval, move || {
            let api = api.clone();
            async move { api.sensors().latest().await }
        })
    }

    /// Actuator states, refreshed every `device_status_poll_interval`.
    pub fn watch_device_status(&self) -> PollHandle<DeviceStatusMap> {
        let api = self.clone();
        poll("devices.status", self.config.device_status_poll_interval, move || {
            let api = api.clone();
            async move { api.devices().status().await }
        })
    }

    /// Controller connectivity, refreshed every `device_indicator_poll_interval`.
    pub fn watch_controller(&self) -> PollHandle<ControllerStatus> {
        let api = self.clone();
        poll(
            "controller.status",
            self.config.device_indicator_poll_interval,
            move || {
                let api = api.clone();
                async move { api.controller().status().await }
            },
        )
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.config.url(path));
        match self.tokens.access_token() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = builder.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            log::debug!(
                target: "smartfarm::api",
                "msg=\"request unauthorized\" url={}",
                response.url()
            );
            return Err(ClientError::Unauthorized);
        }
        response::ensure_success(response).await
    }

    /// Decodes the whole body as `T`.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(builder).await?;
        let body = response.text().await?;
        response::decode(&body)
    }

    /// Decodes the body as an envelope and returns its `data`.
    pub(crate) async fn fetch_data<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ClientError> {
        self.fetch::<Envelope<T>>(builder).await?.into_data()
    }

    pub(crate) async fn acknowledge(
        &self,
        builder: RequestBuilder,
    ) -> Result<Acknowledgement, ClientError> {
        self.fetch(builder).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Option<&'static str>);

    impl TokenSource for Fixed {
        fn access_token(&self) -> Option<SecretString> {
            self.0.map(SecretString::from)
        }
    }

    fn client(token: Option<&'static str>) -> ApiClient {
        ApiClient::new(
            &ClientConfig::new("http://farm.test/api"),
            Arc::new(Fixed(token)),
        )
        .unwrap()
    }

    #[test]
    fn test_request_attaches_bearer() {
        let request = client(Some("abc"))
            .request(Method::GET, "/sensors/latest")
            .build()
            .unwrap();

        assert_eq!(request.url().as_str(), "http://farm.test/api/sensors/latest");
        assert_eq!(
            request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer abc"
        );
    }

    #[test]
    fn test_request_without_token() {
        let request = client(None)
            .request(Method::GET, "/sensors/latest")
            .build()
            .unwrap();
        assert!(request.headers().get(reqwest::header::AUTHORIZATION).is_none());
    }
}
