use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::ClientError;

/// Connectivity of the ESP32 board that drives the actuators.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerStatus {
    pub device_id: String,
    /// `online` or `offline`, as reported.
    pub status: String,
    pub is_online: bool,
    pub last_seen: DateTime<Utc>,
    pub last_seen_seconds: u64,
    #[serde(default)]
    pub ip_address: Option<String>,
    pub updated_at: DateTime<Utc>,
}

pub struct Controller<'a> {
    api: &'a ApiClient,
}

impl<'a> Controller<'a> {
    pub(super) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn status(&self) -> Result<ControllerStatus, ClientError> {
        self.api
            .fetch_data(self.api.request(Method::GET, "/esp32/status"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_shape() {
        let status: ControllerStatus = serde_json::from_str(
            r#"{
                "deviceId": "esp32-farm-01",
                "status": "offline",
                "isOnline": false,
                "lastSeen": "2024-05-01T07:58:00Z",
                "lastSeenSeconds": 120,
                "ipAddress": null,
                "updatedAt": "2024-05-01T08:00:00Z"
            }"#,
        )
        .unwrap();

        assert!(!status.is_online);
        assert_eq!(status.last_seen_seconds, 120);
        assert_eq!(status.ip_address, None);
    }
}
