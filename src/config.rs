//! Client configuration.
//!
//! # Example
//!
//! ```rust
//! use smartfarm_client::config::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::new("https://farm.example.com/api")
//!     .with_request_timeout(Duration::from_secs(5))
//!     .with_sensor_poll_interval(Duration::from_secs(60));
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.token_leeway, chrono::Duration::seconds(30));
//! ```

use std::time::Duration;

use crate::ClientError;

pub const ENV_BASE_URL: &str = "SMARTFARM_API_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "SMARTFARM_API_TIMEOUT_SECS";
pub const ENV_LEEWAY_SECS: &str = "SMARTFARM_TOKEN_LEEWAY_SECS";
pub const ENV_SENSOR_POLL_SECS: &str = "SMARTFARM_SENSOR_POLL_SECS";

/// Largest accepted token leeway, in seconds.
pub const MAX_TOKEN_LEEWAY_SECS: i64 = 24 * 60 * 60;

/// Settings shared by the session manager, the auth gateway and the API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root of the REST API, without a trailing slash.
    pub base_url: String,

    /// Upper bound on every HTTP call, including the logout notification.
    ///
    /// Default: 10 seconds
    pub request_timeout: Duration,

    /// Margin before the access token's expiry at which it is renewed.
    ///
    /// Default: 30 seconds
    pub token_leeway: chrono::Duration,

    /// Default: 30 seconds
    pub sensor_poll_interval: Duration,

    /// Refresh period of the controller status card.
    ///
    /// Default: 15 seconds
    pub device_status_poll_interval: Duration,

    /// Refresh period of the compact online/offline indicator.
    ///
    /// Default: 10 seconds
    pub device_indicator_poll_interval: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            request_timeout: Duration::from_secs(10),
            token_leeway: chrono::Duration::seconds(30),
            sensor_poll_interval: Duration::from_secs(30),
            device_status_poll_interval: Duration::from_secs(15),
            device_indicator_poll_interval: Duration::from_secs(10),
        }
    }

    /// Configuration pointing at a backend on the local machine.
    pub fn development() -> Self {
        Self::new("http://localhost:5000/api")
    }

    /// Loads configuration from the process environment.
    ///
    /// A `.env` file in the working directory is read first if present.
    /// Only the base URL is required; everything else falls back to the defaults.
    pub fn from_env() -> Result<Self, ClientError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                log::warn!(target: "smartfarm::config", "msg=\"failed to load .env\" error=\"{e}\"");
            }
        }

        let base_url = std::env::var(ENV_BASE_URL)
            .map_err(|_| ClientError::Configuration(format!("{ENV_BASE_URL} is not set")))?;

        let mut config = Self::new(base_url);

        if let Some(secs) = read_secs(ENV_TIMEOUT_SECS)? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = read_secs(ENV_LEEWAY_SECS)? {
            let secs = i64::try_from(secs)
                .ok()
                .filter(|secs| *secs <= MAX_TOKEN_LEEWAY_SECS)
                .ok_or_else(|| {
                    ClientError::Configuration(format!(
                        "{ENV_LEEWAY_SECS} must be at most {MAX_TOKEN_LEEWAY_SECS}"
                    ))
                })?;
            config.token_leeway = chrono::Duration::seconds(secs);
        }
        if let Some(secs) = read_secs(ENV_SENSOR_POLL_SECS)? {
            config.sensor_poll_interval = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_token_leeway(mut self, leeway: chrono::Duration) -> Self {
        self.token_leeway = leeway;
        self
    }

    #[must_use]
    pub fn with_sensor_poll_interval(mut self, interval: Duration) -> Self {
        self.sensor_poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_device_status_poll_interval(mut self, interval: Duration) -> Self {
        self.device_status_poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_device_indicator_poll_interval(mut self, interval: Duration) -> Self {
        self.device_indicator_poll_interval = interval;
        self
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ClientError::Configuration(format!(
                "base_url must be an http(s) URL, got \"{}\"",
                self.base_url
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(ClientError::Configuration(
                "request_timeout must be greater than zero".to_owned(),
            ));
        }
        if self.token_leeway < chrono::Duration::zero() {
            return Err(ClientError::Configuration(
                "token_leeway must not be negative".to_owned(),
            ));
        }
        if self.token_leeway > chrono::Duration::seconds(MAX_TOKEN_LEEWAY_SECS) {
            return Err(ClientError::Configuration(format!(
                "token_leeway must be at most {MAX_TOKEN_LEEWAY_SECS} seconds"
            )));
        }
        for (name, interval) in [
            ("sensor_poll_interval", self.sensor_poll_interval),
            ("device_status_poll_interval", self.device_status_poll_interval),
            ("device_indicator_poll_interval", self.device_indicator_poll_interval),
        ] {
            if interval.is_zero() {
                return Err(ClientError::Configuration(format!(
                    "{name} must be greater than zero"
                )));
            }
        }
        Ok(())
    }

    /// Joins an endpoint path onto the base URL.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim_end_matches('/').to_owned()
}

fn read_secs(var: &str) -> Result<Option<u64>, ClientError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ClientError::Configuration(format!("{var} must be a whole number of seconds"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    fn clear_env() {
        for var in [ENV_BASE_URL, ENV_TIMEOUT_SECS, ENV_LEEWAY_SECS, ENV_SENSOR_POLL_SECS] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("https://farm.example.com/api/");

        assert_eq!(config.base_url, "https://farm.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.token_leeway, chrono::Duration::seconds(30));
        assert_eq!(config.sensor_poll_interval, Duration::from_secs(30));
        assert_eq!(config.device_status_poll_interval, Duration::from_secs(15));
        assert_eq!(config.device_indicator_poll_interval, Duration::from_secs(10));
    }

    #[test]
    fn test_url_join() {
        let config = ClientConfig::new("http://localhost:5000/api///");
        assert_eq!(config.url("/auth/login"), "http://localhost:5000/api/auth/login");
    }

    #[test]
    fn test_validate() {
        assert!(ClientConfig::development().validate().is_ok());
        assert!(ClientConfig::new("farm.local").validate().is_err());
        assert!(ClientConfig::development()
            .with_request_timeout(Duration::ZERO)
            .validate()
            .is_err());
        assert!(ClientConfig::development()
            .with_token_leeway(chrono::Duration::seconds(-1))
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_leeway_upper_bound() {
        let at_limit = ClientConfig::development()
            .with_token_leeway(chrono::Duration::seconds(MAX_TOKEN_LEEWAY_SECS));
        assert!(at_limit.validate().is_ok());

        let err = ClientConfig::development()
            .with_token_leeway(chrono::Duration::seconds(MAX_TOKEN_LEEWAY_SECS + 1))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ClientError::Configuration(ref msg) if msg.contains("token_leeway")));
    }

    #[test]
    fn test_validate_rejects_zero_poll_intervals() {
        let cases = [
            ("sensor_poll_interval", ClientConfig::development().with_sensor_poll_interval(Duration::ZERO)),
            (
                "device_status_poll_interval",
                ClientConfig::development().with_device_status_poll_interval(Duration::ZERO),
            ),
            (
                "device_indicator_poll_interval",
                ClientConfig::development().with_device_indicator_poll_interval(Duration::ZERO),
            ),
        ];
        for (field, config) in cases {
            let err = config.validate().unwrap_err();
            assert!(matches!(err, ClientError::Configuration(ref msg) if msg.contains(field)));
        }
    }

    #[test]
    #[serial]
    fn test_from_env() {
        clear_env();
        std::env::set_var(ENV_BASE_URL, "https://farm.example.com/api");
        std::env::set_var(ENV_TIMEOUT_SECS, "4");
        std::env::set_var(ENV_LEEWAY_SECS, "60");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.base_url, "https://farm.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_secs(4));
        assert_eq!(config.token_leeway, chrono::Duration::seconds(60));
        assert_eq!(config.sensor_poll_interval, Duration::from_secs(30));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_base_url() {
        clear_env();
        let err = ClientConfig::from_env().unwrap_err();
        assert!(matches!(err, ClientError::Configuration(ref msg) if msg.contains(ENV_BASE_URL)));
    }

    #[test]
    #[serial]
    fn test_from_env_bad_number() {
        clear_env();
        std::env::set_var(ENV_BASE_URL, "https://farm.example.com/api");
        std::env::set_var(ENV_TIMEOUT_SECS, "ten");

        let err = ClientConfig::from_env().unwrap_err();
        assert!(matches!(err, ClientError::Configuration(ref msg) if msg.contains(ENV_TIMEOUT_SECS)));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_huge_leeway() {
        clear_env();
        std::env::set_var(ENV_BASE_URL, "https://farm.example.com/api");
        std::env::set_var(ENV_LEEWAY_SECS, "10000000000000");

        let err = ClientConfig::from_env().unwrap_err();
        assert!(matches!(err, ClientError::Configuration(ref msg) if msg.contains(ENV_LEEWAY_SECS)));

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_zero_poll_interval() {
        clear_env();
        std::env::set_var(ENV_BASE_URL, "https://farm.example.com/api");
        std::env::set_var(ENV_SENSOR_POLL_SECS, "0");

        let err = ClientConfig::from_env().unwrap_err();
        assert!(matches!(err, ClientError::Configuration(ref msg) if msg.contains("sensor_poll_interval")));

        clear_env();
    }
}
