use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{ApiClient, Severity};
use crate::gateway::Acknowledgement;
use crate::ClientError;

/// Raises an alert of `severity` when a sensor crosses `threshold_value`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Threshold {
    pub sensor_type: String,
    pub threshold_value: f64,
    pub severity: Severity,
    pub is_active: bool,
}

pub type ThresholdInput = Threshold;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToggleBody {
    is_active: bool,
}

pub struct Thresholds<'a> {
    api: &'a ApiClient,
}

impl<'a> Thresholds<'a> {
    pub(super) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Threshold>, ClientError> {
        self.api
            .fetch_data(self.api.request(Method::GET, "/thresholds"))
            .await
    }

    pub async fn get(&self, sensor_type: &str) -> Result<Threshold, ClientError> {
        self.api
            .fetch_data(self.api.request(Method::GET, &format!("/thresholds/{sensor_type}")))
            .await
    }

    pub async fn create(&self, input: &ThresholdInput) -> Result<Threshold, ClientError> {
        crate::validators::require("sensorType", &input.sensor_type)?;
        self.api
            .fetch_data(self.api.request(Method::POST, "/thresholds").json(input))
            .await
    }

    pub async fn update(&self, sensor_type: &str, input: &ThresholdInput) -> Result<Threshold, ClientError> {
        self.api
            .fetch_data(
                self.api
                    .request(Method::PUT, &format!("/thresholds/{sensor_type}"))
                    .json(input),
            )
            .await
    }

    pub async fn delete(&self, sensor_type: &str) -> Result<Acknowledgement, ClientError> {
        self.api
            .acknowledge(self.api.request(Method::DELETE, &format!("/thresholds/{sensor_type}")))
            .await
    }

    pub async fn toggle(&self, sensor_type: &str, is_active: bool) -> Result<Threshold, ClientError> {
        self.api
            .fetch_data(
                self.api
                    .request(Method::PATCH, &format!("/thresholds/{sensor_type}/toggle"))
                    .json(&ToggleBody { is_active }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let threshold = Threshold {
            sensor_type: "soil_moisture".to_owned(),
            threshold_value: 30.0,
            severity: Severity::Critical,
            is_active: true,
        };
        assert_eq!(
            serde_json::to_value(&threshold).unwrap(),
            serde_json::json!({
                "sensorType": "soil_moisture",
                "thresholdValue": 30.0,
                "severity": "critical",
                "isActive": true
            })
        );
    }
}
