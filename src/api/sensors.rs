use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::ApiClient;
use crate::gateway::Acknowledgement;
use crate::ClientError;

/// One snapshot of every farm sensor.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity, percent.
    pub humidity: f64,
    pub soil_moisture: f64,
    pub water_level: f64,
    /// Lux.
    pub light: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SensorKind {
    Temperature,
    Humidity,
    SoilMoisture,
    WaterLevel,
    Light,
}

impl SensorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::SoilMoisture => "soil_moisture",
            Self::WaterLevel => "water_level",
            Self::Light => "light",
        }
    }

    /// Reads this sensor's value out of a snapshot.
    pub fn value_in(&self, reading: &SensorReading) -> f64 {
        match self {
            Self::Temperature => reading.temperature,
            Self::Humidity => reading.humidity,
            Self::SoilMoisture => reading.soil_moisture,
            Self::WaterLevel => reading.water_level,
            Self::Light => reading.light,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SensorHistoryQuery {
    #[serde(rename = "type")]
    pub kind: SensorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl SensorHistoryQuery {
    pub fn new(kind: SensorKind) -> Self {
        Self {
            kind,
            hours: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn hours(mut self, hours: u32) -> Self {
        self.hours = Some(hours);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HistoryPoint {
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct PageQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

pub struct Sensors<'a> {
    api: &'a ApiClient,
}

impl<'a> Sensors<'a> {
    pub(super) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn latest(&self) -> Result<SensorReading, ClientError> {
        self.api
            .fetch_data(self.api.request(Method::GET, "/sensors/latest"))
            .await
    }

    pub async fn history(&self, query: &SensorHistoryQuery) -> Result<Vec<HistoryPoint>, ClientError> {
        self.api
            .fetch_data(self.api.request(Method::GET, "/sensors/history").query(query))
            .await
    }

    /// Raw reading records; the backend's shape here is not stable.
    pub async fn list(
        &self,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<serde_json::Value, ClientError> {
        self.api
            .fetch(
                self.api
                    .request(Method::GET, "/sensors")
                    .query(&PageQuery { page, limit }),
            )
            .await
    }

    /// Deletes readings older than `days` days. Admin only.
    pub async fn cleanup(&self, days: u32) -> Result<Acknowledgement, ClientError> {
        self.api
            .acknowledge(
                self.api
                    .request(Method::DELETE, "/sensors/cleanup")
                    .query(&[("days", days)]),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_wire_shape() {
        let reading: SensorReading = serde_json::from_str(
            r#"{"temperature":28.5,"humidity":71,"soilMoisture":40,"waterLevel":82,"light":900,"timestamp":"2024-05-01T08:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(reading.soil_moisture, 40.0);
        assert_eq!(SensorKind::WaterLevel.value_in(&reading), 82.0);
    }

    #[test]
    fn test_history_query_encoding() {
        let query = SensorHistoryQuery::new(SensorKind::SoilMoisture).hours(24);
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "soil_moisture", "hours": 24 }));
    }
}
